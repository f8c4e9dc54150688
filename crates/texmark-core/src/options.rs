//! Parse and render option bitmask.

use std::ops::{BitOr, BitOrAssign};

/// Option flags shared by the parser and the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Options(u32);

impl Options {
    /// No options set
    pub const DEFAULT: Options = Options(0);
    /// Emit source positions (`data-sourcepos` in HTML, `sourcepos` in XML)
    pub const SOURCEPOS: Options = Options(1 << 1);
    /// Render soft line breaks as hard breaks
    pub const HARDBREAKS: Options = Options(1 << 2);
    /// Render soft line breaks as spaces
    pub const NOBREAKS: Options = Options(1 << 4);
    /// Pass raw HTML and dangerous URLs through to HTML output
    pub const UNSAFE: Options = Options(1 << 17);

    /// Raw bit value
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set
    pub fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear the flags in `other`
    pub fn set(&mut self, other: Options, enabled: bool) {
        if enabled {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        self.0 |= rhs.0;
    }
}
