//! Error types for texmark

use thiserror::Error;

/// Main error type for texmark operations.
///
/// A scanner that does not recognise its syntax is not an error; it
/// simply declines and the text is kept as ordinary content.
#[derive(Error, Debug)]
pub enum TexmarkError {
    /// IO error while reading input or configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An extension name that no registry entry answers to
    #[error("Unknown extension {0}")]
    UnknownExtension(String),

    /// An output format name that is not one of html, xml, commonmark, latex
    #[error("Invalid output format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for texmark operations
pub type Result<T> = std::result::Result<T, TexmarkError>;
