//! Texmark Parser
//!
//! A CommonMark parser that exposes an inline syntax extension interface.
//! Input is fed as bytes, in as many chunks as convenient; the document
//! tree is produced when the parser is finished.
//!
//! # Example
//!
//! ```
//! use texmark_core::NodeValue;
//! use texmark_parser::Parser;
//!
//! let mut parser = Parser::new();
//! parser.feed(b"# Hello\n\nSome *text*\n");
//! let doc = parser.finish();
//!
//! assert_eq!(doc.children.len(), 2);
//! assert!(matches!(doc.children[0].value, NodeValue::Heading(_)));
//! ```

mod block;
pub mod entities;
pub mod inline;
pub mod scanners;

pub use entities::{decode_entity, unescape};
pub use inline::{InlineParser, CORE_SPECIAL_CHARS};

use log::debug;
use std::sync::Arc;
use texmark_core::{Node, SyntaxExtension};

use crate::block::BlockParser;

/// Incremental document parser.
pub struct Parser {
    blocks: BlockParser,
    extensions: Vec<Arc<dyn SyntaxExtension>>,
    /// Bytes of an incomplete last line
    pending: Vec<u8>,
}

impl Parser {
    /// Create a parser with no extensions attached
    pub fn new() -> Self {
        Self {
            blocks: BlockParser::new(),
            extensions: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Attach an extension. Returns `false` if one with the same name is
    /// already attached.
    pub fn attach(&mut self, extension: Arc<dyn SyntaxExtension>) -> bool {
        if self.extensions.iter().any(|e| e.name() == extension.name()) {
            debug!("extension {} already attached", extension.name());
            return false;
        }
        debug!("attaching extension {}", extension.name());
        self.extensions.push(extension);
        true
    }

    /// Extensions in attach order
    pub fn extensions(&self) -> &[Arc<dyn SyntaxExtension>] {
        &self.extensions
    }

    /// Feed a chunk of input. Chunks may split lines, and even UTF-8
    /// sequences, anywhere.
    pub fn feed(&mut self, bytes: &[u8]) {
        // Everything already pending was scanned by an earlier call and
        // holds no newline.
        let mut scan = self.pending.len();
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(pos) = self.pending[scan..].iter().position(|&b| b == b'\n') {
            let end = scan + pos;
            let line = String::from_utf8_lossy(&self.pending[start..end]);
            self.blocks.process_line(line.trim_end_matches('\r'));
            start = end + 1;
            scan = start;
        }
        if start > 0 {
            self.pending.drain(..start);
        }
    }

    /// Flush any partial line, close every open block and return the tree
    pub fn finish(mut self) -> Node {
        if !self.pending.is_empty() {
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.blocks.process_line(line.trim_end_matches('\r'));
        }
        let doc = self.blocks.finish(&self.extensions);
        debug!("parsed document with {} top-level blocks", doc.children.len());
        doc
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete document with the given extensions attached.
pub fn parse_document(text: &str, extensions: &[Arc<dyn SyntaxExtension>]) -> Node {
    let mut parser = Parser::new();
    for ext in extensions {
        parser.attach(Arc::clone(ext));
    }
    parser.feed(text.as_bytes());
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmark_core::NodeValue;

    #[test]
    fn test_feed_in_pieces() {
        let text = "para one\nstill one\n\n> quote";
        let whole = parse_document(text, &[]);

        let mut parser = Parser::new();
        for chunk in text.as_bytes().chunks(3) {
            parser.feed(chunk);
        }
        assert_eq!(parser.finish(), whole);
    }

    #[test]
    fn test_feed_keeps_only_partial_line() {
        let mut parser = Parser::new();
        parser.feed(b"ab");
        parser.feed(b"c");
        assert_eq!(parser.pending, b"abc");
        parser.feed(b"\nde");
        assert_eq!(parser.pending, b"de");
        parser.feed(b"f\n\ng");
        assert_eq!(parser.pending, b"g");
        assert_eq!(parser.finish().children.len(), 2);
    }

    #[test]
    fn test_feed_long_line_byte_by_byte() {
        let text = format!("{}\n\nend", "word ".repeat(20_000));
        let whole = parse_document(&text, &[]);

        let mut parser = Parser::new();
        for chunk in text.as_bytes().chunks(1) {
            parser.feed(chunk);
        }
        assert_eq!(parser.finish(), whole);
    }

    #[test]
    fn test_feed_splits_utf8() {
        let text = "caf\u{e9} \u{2192} ok\n";
        let mut parser = Parser::new();
        for chunk in text.as_bytes().chunks(1) {
            parser.feed(chunk);
        }
        let doc = parser.finish();
        assert_eq!(doc.children[0].children[0].literal, "caf\u{e9} \u{2192} ok");
    }

    #[test]
    fn test_crlf_lines() {
        let doc = parse_document("a\r\nb\r\n", &[]);
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.children[0].text_content(), "a b");
    }

    #[test]
    fn test_document_span() {
        let doc = parse_document("# Hi\n\ntext", &[]);
        assert_eq!(doc.value, NodeValue::Document);
        assert_eq!(doc.span.to_string(), "1:1-3:4");
    }
}
