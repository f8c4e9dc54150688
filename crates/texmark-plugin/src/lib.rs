//! Texmark Extensions
//!
//! This crate provides the built-in syntax extensions and the registry
//! that holds them. Extensions implement
//! [`texmark_core::SyntaxExtension`]; a parser consults them for the
//! trigger bytes they declare.
//!
//! # Registry
//!
//! The registry is an ordinary value owned by the caller. Populate it
//! once, then share it (or the `Arc`s it hands out) with as many parsers
//! as needed; lookups never mutate it.
//!
//! # Example
//!
//! ```
//! use texmark_core::{Node, Subject, SyntaxExtension};
//! use texmark_plugin::ExtensionRegistry;
//!
//! struct Arrow;
//!
//! impl SyntaxExtension for Arrow {
//!     fn name(&self) -> &str { "arrow" }
//!     fn special_chars(&self) -> &[u8] { b"-" }
//!
//!     fn match_inline(&self, subject: &mut Subject<'_>, _parent: &mut Node, _c: u8) -> Option<Node> {
//!         if !subject.matches_at(0, b"->") {
//!             return None;
//!         }
//!         let start = subject.offset();
//!         subject.set_offset(start + 2);
//!         Some(Node::text("\u{2192}"))
//!     }
//! }
//!
//! let mut registry = ExtensionRegistry::with_builtins();
//! assert!(registry.register(std::sync::Arc::new(Arrow)));
//! assert!(registry.find("arrow").is_some());
//! ```

pub mod autolink;
pub mod builtin;
pub mod latex;
pub mod strikethrough;
pub mod table;
pub mod tagfilter;
pub mod tasklist;

pub use autolink::AutolinkExtension;
pub use builtin::{ExtensionFilter, ExtensionInfo};
pub use latex::{LatexBlockExtension, LatexInlineExtension};
pub use strikethrough::StrikethroughExtension;
pub use table::TableExtension;
pub use tagfilter::TagfilterExtension;
pub use tasklist::TasklistExtension;

use log::debug;
use std::sync::Arc;
use texmark_core::{Result, SyntaxExtension, TexmarkError};

/// Named collection of syntax extensions, in registration order.
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn SyntaxExtension>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in extension.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.ensure_builtins();
        registry
    }

    /// Register any built-in extension that is not present yet. Calling
    /// this again is a no-op.
    pub fn ensure_builtins(&mut self) {
        for ext in builtin::builtin_extensions() {
            self.register(ext);
        }
    }

    /// Register an extension.
    ///
    /// Returns `false`, leaving the registry unchanged, when an extension
    /// with the same name is already registered.
    pub fn register(&mut self, extension: Arc<dyn SyntaxExtension>) -> bool {
        if self.contains(extension.name()) {
            return false;
        }
        debug!("registered extension {}", extension.name());
        self.extensions.push(extension);
        true
    }

    /// Look up an extension by name.
    pub fn find(&self, name: &str) -> Option<Arc<dyn SyntaxExtension>> {
        self.extensions.iter().find(|e| e.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e.name() == name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Look up every name in order.
    ///
    /// # Errors
    /// [`TexmarkError::UnknownExtension`] for the first name that is not
    /// registered.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn SyntaxExtension>>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.find(name)
                    .ok_or_else(|| TexmarkError::UnknownExtension(name.to_string()))
            })
            .collect()
    }

    /// Every registered extension the filter admits.
    pub fn filtered(&self, filter: &ExtensionFilter) -> Vec<Arc<dyn SyntaxExtension>> {
        self.extensions
            .iter()
            .filter(|e| filter.should_load(e.name()))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.names())
            .finish()
    }
}
