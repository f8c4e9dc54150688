//! Texmark
//!
//! CommonMark with LaTeX math. `$$...$$` becomes a `latex_block` node and
//! `\\(...\\)` a `latex_inline` node; documents render to HTML, XML,
//! CommonMark or LaTeX. The GitHub extensions (tables, task lists,
//! strikethrough, bare autolinks and the raw HTML tag filter) ship as
//! built-ins too.
//!
//! # Example
//!
//! ```
//! use texmark::{Config, Driver, OutputFormat};
//!
//! let mut config = Config::default();
//! config.render.sourcepos = false;
//! let driver = Driver::from_config(&config).unwrap();
//!
//! let html = driver.render_str(r"$$x^2$$ and \\(y\\)", OutputFormat::Html);
//! assert_eq!(
//!     html,
//!     "<p><latex class=\"block\">x^2</latex> and <latex class=\"inline\">y</latex></p>\n"
//! );
//! ```

pub mod driver;

pub use driver::{Driver, CHUNK_SIZE, DEMO_DOCUMENT};
pub use texmark_config::Config;
pub use texmark_core::{
    MathKind, Node, NodeValue, Options, OutputFormat, Result, SyntaxExtension, TableAlignment,
    TexmarkError,
};
pub use texmark_parser::{parse_document, Parser};
pub use texmark_plugin::{ExtensionFilter, ExtensionRegistry};
pub use texmark_render::render;

/// Render markdown to HTML with every built-in extension and no options.
///
/// ```
/// assert_eq!(texmark::markdown_to_html("~~gone~~"), "<p><del>gone</del></p>\n");
/// ```
pub fn markdown_to_html(text: &str) -> String {
    let registry = ExtensionRegistry::with_builtins();
    let extensions: Vec<_> = registry.filtered(&ExtensionFilter::all());
    let doc = parse_document(text, &extensions);
    render(&doc, OutputFormat::Html, Options::DEFAULT, &extensions)
}
