//! `~~strikethrough~~` as an emphasis-style extension.
//!
//! The scanner never matches on its own: runs of `~` go onto the
//! delimiter stack and are paired with the core emphasis pass. Only runs
//! of equal length, one or two tildes long, produce a node.

use texmark_core::{NodeValue, SyntaxExtension};

#[derive(Debug, Clone, Copy, Default)]
pub struct StrikethroughExtension;

impl StrikethroughExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for StrikethroughExtension {
    fn name(&self) -> &str {
        "strikethrough"
    }

    fn special_chars(&self) -> &[u8] {
        b"~"
    }

    fn emphasis(&self) -> bool {
        true
    }

    fn insert_delimited(&self, opener_len: usize, closer_len: usize) -> Option<(NodeValue, usize)> {
        (opener_len == closer_len && opener_len <= 2).then_some((NodeValue::Strikethrough, opener_len))
    }
}
