//! Inline stream cursor.
//!
//! A [`Subject`] is the inline text of one leaf block (paragraph or
//! heading content with its lines joined by `\n`) plus a read offset.
//! Extensions look ahead and behind through bounds-checked peeks that
//! return `None` past either end, so a scan can never fault.

use crate::node::{Node, NodeValue};
use crate::types::{Position, Span};

/// Where one source line begins inside the subject text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStart {
    /// Byte offset into the subject
    pub offset: usize,
    /// 1-based source line
    pub line: usize,
    /// 1-based source column of the byte at `offset`
    pub column: usize,
}

/// Cursor over the inline text of a leaf block.
#[derive(Debug, Clone)]
pub struct Subject<'a> {
    input: &'a str,
    offset: usize,
    lines: Vec<LineStart>,
}

impl<'a> Subject<'a> {
    /// Subject whose first byte sits at line 1, column 1
    pub fn new(input: &'a str) -> Self {
        Self::with_lines(
            input,
            vec![LineStart {
                offset: 0,
                line: 1,
                column: 1,
            }],
        )
    }

    /// Subject with an explicit map from subject offsets to source lines.
    ///
    /// `lines` must be sorted by offset; an empty map is treated as a
    /// single line starting at 1:1.
    pub fn with_lines(input: &'a str, mut lines: Vec<LineStart>) -> Self {
        if lines.is_empty() {
            lines.push(LineStart {
                offset: 0,
                line: 1,
                column: 1,
            });
        }
        Self {
            input,
            offset: 0,
            lines,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Current read offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the read offset; values past the end clamp to the end
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.input.len());
    }

    /// Advance the read offset by `n` bytes
    pub fn advance(&mut self, n: usize) {
        self.set_offset(self.offset.saturating_add(n));
    }

    /// Whether the offset has reached the end of the text
    pub fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Byte at an absolute offset, `None` past the end
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(offset).copied()
    }

    /// Byte at the current offset
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(self.offset)
    }

    /// Byte at a signed distance from the current offset, `None` outside the text
    pub fn peek_relative(&self, rel: isize) -> Option<u8> {
        let abs = self.offset.checked_add_signed(rel)?;
        self.peek_at(abs)
    }

    /// Whether `pat` occurs at a signed distance from the current offset.
    ///
    /// A window that starts before the beginning of the text or runs past
    /// its end never matches.
    pub fn matches_at(&self, rel: isize, pat: &[u8]) -> bool {
        let Some(start) = self.offset.checked_add_signed(rel) else {
            return false;
        };
        self.input
            .as_bytes()
            .get(start..start + pat.len())
            .is_some_and(|window| window == pat)
    }

    /// Source position of the byte at `offset`.
    ///
    /// The end of the text maps to the column just past the last byte.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.input.len());
        let idx = self
            .lines
            .partition_point(|l| l.offset <= offset)
            .saturating_sub(1);
        let line = self.lines[idx];
        Position::new(line.line, line.column + offset.saturating_sub(line.offset))
    }

    /// Source position of the current offset
    pub fn position(&self) -> Position {
        self.position_at(self.offset)
    }

    /// Build a node whose literal is the bytes in `[start, stop)`.
    ///
    /// The offset is moved to `start` and then `stop` to record the span,
    /// the bytes are copied out one peek at a time, and the offset is put
    /// back where it was. Callers set the post-match offset themselves.
    pub fn literal_node(&mut self, value: NodeValue, start: usize, stop: usize) -> Node {
        let saved = self.offset;
        let stop = stop.max(start);

        self.set_offset(start);
        let start_pos = self.position();
        self.set_offset(stop);
        let end_pos = self.position();

        let mut bytes = Vec::with_capacity(stop - start);
        let mut at = start;
        while at < stop {
            match self.peek_at(at) {
                Some(b) => bytes.push(b),
                None => break,
            }
            at += 1;
        }

        self.offset = saved;
        Node::with_literal(value, String::from_utf8_lossy(&bytes).into_owned())
            .spanned(Span::new(start_pos, end_pos))
    }
}
