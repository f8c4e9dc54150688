//! Texmark Core
//!
//! This crate provides the document tree, the inline cursor, the
//! extension interface and the error definitions shared by the texmark
//! crates.
//!
//! # Overview
//!
//! The core crate contains:
//! - [`Node`], [`NodeValue`] - The document tree
//! - [`Subject`] - Bounds-checked cursor over the inline text of a block
//! - [`SyntaxExtension`], [`ParagraphSplit`], [`RenderContext`] - The extension interface
//! - [`Options`], [`OutputFormat`], [`MathKind`] - Shared flags and enums
//! - [`TexmarkError`] - Error types
//! - [`Position`], [`Span`] - Source location types

pub mod enums;
pub mod error;
pub mod extension;
pub mod node;
pub mod options;
pub mod subject;
pub mod types;

pub use enums::{ListDelim, ListType, MathKind, OutputFormat};
pub use error::{Result, TexmarkError};
pub use extension::{ParagraphSplit, RenderContext, SyntaxExtension};
pub use node::{Node, NodeCodeBlock, NodeHeading, NodeLink, NodeList, NodeValue, TableAlignment};
pub use options::Options;
pub use subject::{LineStart, Subject};
pub use types::{Position, Span};
