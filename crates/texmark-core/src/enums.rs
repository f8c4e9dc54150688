//! Core enums for texmark.
//!
//! Small closed sets shared by the parser, the extensions and the
//! renderers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TexmarkError;

/// Represents the type of list being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListType {
    /// Unordered list with bullets (*, -, +)
    #[default]
    Bullet,
    /// Ordered list with numbers (1., 2), etc.)
    Ordered,
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListType::Bullet => write!(f, "bullet"),
            ListType::Ordered => write!(f, "ordered"),
        }
    }
}

/// Delimiter after an ordered list number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListDelim {
    /// `1.`
    #[default]
    Period,
    /// `1)`
    Paren,
}

impl std::fmt::Display for ListDelim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListDelim::Period => write!(f, "period"),
            ListDelim::Paren => write!(f, "paren"),
        }
    }
}

/// The two math forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathKind {
    /// `$$...$$`
    Block,
    /// `\\(...\\)`
    Inline,
}

impl MathKind {
    /// Registered extension name that produces this kind.
    pub fn name(self) -> &'static str {
        match self {
            MathKind::Block => "latex_block",
            MathKind::Inline => "latex_inline",
        }
    }

    /// Value of the `class` attribute in HTML output.
    pub fn class(self) -> &'static str {
        match self {
            MathKind::Block => "block",
            MathKind::Inline => "inline",
        }
    }
}

impl std::fmt::Display for MathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Output format a document tree can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML fragment
    #[default]
    Html,
    /// CommonMark XML
    Xml,
    /// CommonMark text that re-parses to the same tree
    CommonMark,
    /// LaTeX markup
    Latex,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::CommonMark => write!(f, "commonmark"),
            OutputFormat::Latex => write!(f, "latex"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TexmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "xml" => Ok(OutputFormat::Xml),
            "commonmark" | "cmark" | "markdown" => Ok(OutputFormat::CommonMark),
            "latex" | "tex" => Ok(OutputFormat::Latex),
            _ => Err(TexmarkError::InvalidFormat(s.to_string())),
        }
    }
}
