//! Source location types for texmark

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based position in the source document.
///
/// `Position::default()` (`0:0`) marks a node that has no source location,
/// which is what the parser hands out for nodes created after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in bytes (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Span {
    /// Create a new span from start and end positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether the span runs forward (or is empty)
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

/// Formats as `line:col-line:col`, the form used by `data-sourcepos`.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span::new(Position::new(1, 1), Position::new(2, 7));
        assert_eq!(span.to_string(), "1:1-2:7");
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 4));
        assert!(Span::new(Position::new(1, 4), Position::new(1, 4)).is_ordered());
        assert!(!Span::new(Position::new(2, 1), Position::new(1, 4)).is_ordered());
    }
}
