//! Texmark Render
//!
//! Output renderers for the document tree produced by `texmark-parser`:
//!
//! - [`render_html`] - cmark-style HTML
//! - [`render_xml`] - CommonMark DTD XML
//! - [`render_commonmark`] - normalized CommonMark that parses back to the
//!   same tree
//! - [`render_latex`] - a LaTeX body fragment
//!
//! Every renderer asks the attached extensions first. The first extension
//! whose `render` returns `true` owns the node; anything left over is
//! rendered by the generic code here. Math nodes that no extension claims
//! are rendered as inline code.
//!
//! # Example
//!
//! ```
//! use texmark_core::{Node, NodeValue, Options, OutputFormat};
//! use texmark_render::render;
//!
//! let mut para = Node::new(NodeValue::Paragraph);
//! para.append(Node::text("a < b"));
//! let mut doc = Node::new(NodeValue::Document);
//! doc.append(para);
//!
//! let html = render(&doc, OutputFormat::Html, Options::DEFAULT, &[]);
//! assert_eq!(html, "<p>a &lt; b</p>\n");
//! ```

pub mod commonmark;
pub mod html;
pub mod latex;
pub mod xml;

pub use commonmark::render_commonmark;
pub use html::render_html;
pub use latex::render_latex;
pub use xml::render_xml;

use log::debug;
use std::sync::Arc;
use texmark_core::{Node, Options, OutputFormat, RenderContext, SyntaxExtension};

/// Render a document in the requested format.
pub fn render(
    doc: &Node,
    format: OutputFormat,
    options: Options,
    extensions: &[Arc<dyn SyntaxExtension>],
) -> String {
    debug!(
        "rendering {} as {} with {} extensions",
        doc.type_name(),
        format,
        extensions.len()
    );
    match format {
        OutputFormat::Html => render_html(doc, options, extensions),
        OutputFormat::Xml => render_xml(doc, options, extensions),
        OutputFormat::CommonMark => render_commonmark(doc, options, extensions),
        OutputFormat::Latex => render_latex(doc, options, extensions),
    }
}

/// Type name for `node`: the first extension's specific name, else the
/// generic one.
pub fn resolve_type_name(extensions: &[Arc<dyn SyntaxExtension>], node: &Node) -> &'static str {
    extensions
        .iter()
        .find_map(|ext| ext.type_name(node))
        .unwrap_or_else(|| node.type_name())
}

/// Offer `node` to each extension in turn; `true` if one rendered it.
pub(crate) fn extension_render(
    extensions: &[Arc<dyn SyntaxExtension>],
    format: OutputFormat,
    node: &Node,
    ctx: &mut RenderContext,
) -> bool {
    extensions.iter().any(|ext| ext.render(format, node, ctx))
}

#[cfg(test)]
pub(crate) mod test_support {
    use texmark_core::{Node, NodeValue};

    pub fn doc(children: Vec<Node>) -> Node {
        let mut doc = Node::new(NodeValue::Document);
        for child in children {
            doc.append(child);
        }
        doc
    }

    pub fn node(value: NodeValue, children: Vec<Node>) -> Node {
        let mut node = Node::new(value);
        for child in children {
            node.append(child);
        }
        node
    }

    pub fn para(children: Vec<Node>) -> Node {
        node(NodeValue::Paragraph, children)
    }
}
