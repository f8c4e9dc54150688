//! Command-line interface for texmark.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use texmark_config::Config;
use texmark_core::OutputFormat;
use texmark_plugin::builtin::builtin_extension_info;

/// Texmark - CommonMark with LaTeX math.
///
/// Parses markdown with `$$block$$` and `\\(inline\\)` math and renders it
/// as HTML, XML, CommonMark or LaTeX.
#[derive(Parser, Debug)]
#[command(
    name = "texmark",
    author = "Texmark Contributors",
    version,
    about = "CommonMark with LaTeX math, rendered to HTML, XML, CommonMark or LaTeX",
    after_help = "Examples:\n  \
                  texmark notes.md\n  \
                  cat notes.md | texmark -\n  \
                  texmark --latex -e latex_block -e latex_inline paper.md\n  \
                  texmark -c '[render]\nSourcepos = false' notes.md"
)]
pub struct Cli {
    /// Input files; `-` reads stdin. With none, a demo document is rendered
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Render as XML instead of HTML
    #[arg(long = "xml", group = "format")]
    pub xml: bool,

    /// Render as CommonMark instead of HTML
    #[arg(long = "cmark", group = "format")]
    pub cmark: bool,

    /// Render as LaTeX instead of HTML
    #[arg(long = "latex", group = "format")]
    pub latex: bool,

    /// Omit source positions from the output
    #[arg(long = "no-sourcepos")]
    pub no_sourcepos: bool,

    /// Render soft breaks as hard breaks
    #[arg(long = "hardbreaks")]
    pub hardbreaks: bool,

    /// Pass raw HTML and dangerous link targets through to HTML output
    #[arg(long = "unsafe")]
    pub unsafe_html: bool,

    /// Enable an extension (repeatable; replaces the configured list)
    #[arg(short = 'e', long = "extension", value_name = "NAME")]
    pub extensions: Vec<String>,

    /// Use a custom config file or inline TOML
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "loglevel", default_value = "warn")]
    pub log_level: String,

    /// Show configuration paths and exit
    #[arg(long = "paths")]
    pub show_paths: bool,

    /// List built-in extensions and exit
    #[arg(long = "list-extensions")]
    pub list_extensions: bool,
}

impl Cli {
    /// Output format picked on the command line, if any.
    pub fn format(&self) -> Option<OutputFormat> {
        if self.xml {
            Some(OutputFormat::Xml)
        } else if self.cmark {
            Some(OutputFormat::CommonMark)
        } else if self.latex {
            Some(OutputFormat::Latex)
        } else {
            None
        }
    }

    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(format) = self.format() {
            config.render.format = format;
        }
        if self.no_sourcepos {
            config.render.sourcepos = false;
        }
        if self.hardbreaks {
            config.render.hardbreaks = true;
        }
        if self.unsafe_html {
            config.render.unsafe_html = true;
        }
        if !self.extensions.is_empty() {
            config.extensions.enabled = self.extensions.clone();
        }
    }
}

/// One-line usage string.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

/// Show paths information.
pub fn show_paths() {
    let config_path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not found)".to_string());

    println!("paths:");
    println!("  config                {}", config_path);
}

/// Print the built-in extensions.
pub fn list_extensions() {
    for info in builtin_extension_info() {
        let marker = if info.default_enabled { "*" } else { " " };
        println!("{} {:<16} {}", marker, info.name, info.description);
    }
}
