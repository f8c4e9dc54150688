//! Document driver.
//!
//! A [`Driver`] holds the extensions resolved from a registry and the
//! render options. Each parse gets a fresh [`Parser`] with those
//! extensions attached; the returned tree belongs to the caller.

use log::{debug, info};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use texmark_config::Config;
use texmark_core::{Node, Options, OutputFormat, Result, SyntaxExtension};
use texmark_parser::Parser;
use texmark_plugin::ExtensionRegistry;

/// Document rendered when the binary is run without input.
pub const DEMO_DOCUMENT: &str = r"# Test #

* This ~is~ `code` ... $$
* test $$block$$ or \\(inline\\) text

$$a*2$$

\\(b*2\\)";

/// Read size used when feeding a reader to the parser.
pub const CHUNK_SIZE: usize = 4096;

/// Parses and renders documents with a fixed set of extensions.
#[derive(Clone)]
pub struct Driver {
    extensions: Vec<Arc<dyn SyntaxExtension>>,
    options: Options,
}

impl Driver {
    /// Resolve `names` against `registry`.
    ///
    /// # Errors
    /// [`texmark_core::TexmarkError::UnknownExtension`] if a name is not
    /// registered.
    pub fn new<S: AsRef<str>>(registry: &ExtensionRegistry, options: Options, names: &[S]) -> Result<Self> {
        let extensions = registry.resolve(names)?;
        debug!(
            "driver extensions: [{}]",
            extensions.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { extensions, options })
    }

    /// Driver for the extensions and options a configuration selects,
    /// drawn from the built-in registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ExtensionRegistry::with_builtins();
        Self::new(&registry, config.options(), &config.extensions.enabled)
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn extensions(&self) -> &[Arc<dyn SyntaxExtension>] {
        &self.extensions
    }

    /// A fresh parser with this driver's extensions attached
    pub fn parser(&self) -> Parser {
        let mut parser = Parser::new();
        for ext in &self.extensions {
            parser.attach(Arc::clone(ext));
        }
        parser
    }

    pub fn parse_str(&self, text: &str) -> Node {
        let mut parser = self.parser();
        parser.feed(text.as_bytes());
        parser.finish()
    }

    /// Parse everything `reader` yields, fed in [`CHUNK_SIZE`] pieces.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Node> {
        let mut parser = self.parser();
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut total = 0;
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            parser.feed(&buffer[..n]);
            total += n;
        }
        debug!("fed {total} bytes");
        Ok(parser.finish())
    }

    /// Parse a file. Open and read failures name the path.
    pub fn parse_file(&self, path: &Path) -> Result<Node> {
        info!("parsing {}", path.display());
        let file = File::open(path).map_err(|e| with_path(e, path))?;
        self.parse_reader(file).map_err(|e| match e {
            texmark_core::TexmarkError::Io(io) => with_path(io, path).into(),
            other => other,
        })
    }

    pub fn render(&self, doc: &Node, format: OutputFormat) -> String {
        texmark_render::render(doc, format, self.options, &self.extensions)
    }

    /// Parse `text` and render it
    pub fn render_str(&self, text: &str, format: OutputFormat) -> String {
        self.render(&self.parse_str(text), format)
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("extensions", &self.extensions.iter().map(|e| e.name()).collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmark_core::TexmarkError;

    fn driver() -> Driver {
        Driver::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_unknown_extension() {
        let registry = ExtensionRegistry::with_builtins();
        let err = Driver::new(&registry, Options::DEFAULT, &["latex_block", "mermaid"]).unwrap_err();
        assert!(matches!(err, TexmarkError::UnknownExtension(n) if n == "mermaid"));
    }

    #[test]
    fn test_parser_has_extensions() {
        let d = driver();
        let names: Vec<_> = d.parser().extensions().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(
            names,
            [
                "autolink",
                "table",
                "strikethrough",
                "tagfilter",
                "tasklist",
                "latex_block",
                "latex_inline"
            ]
        );
    }

    #[test]
    fn test_parse_reader_matches_parse_str() {
        let d = driver();
        let text = "para $$x$$\n".repeat(1000);
        let from_reader = d.parse_reader(text.as_bytes()).unwrap();
        assert_eq!(from_reader, d.parse_str(&text));
    }

    #[test]
    fn test_parse_file_missing_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.md");
        let err = driver().parse_file(&path).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_render_str_math() {
        let d = Driver::new(&ExtensionRegistry::with_builtins(), Options::DEFAULT, &["latex_block"]).unwrap();
        assert_eq!(
            d.render_str("$$a*2$$", OutputFormat::Html),
            "<p><latex class=\"block\">a*2</latex></p>\n"
        );
    }

    #[test]
    fn test_demo_document_parses() {
        let doc = driver().parse_str(DEMO_DOCUMENT);
        assert_eq!(doc.children.len(), 4);
    }
}
