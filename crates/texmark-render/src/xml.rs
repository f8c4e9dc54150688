//! XML renderer, following the CommonMark DTD.
//!
//! Element names are type names, so nodes owned by an extension appear
//! under that extension's name (`latex_block`, `latex_inline`). Table
//! cells carry their column's `align`, task items a `completed` flag.

use std::sync::Arc;

use texmark_core::{
    ListDelim, ListType, Node, NodeValue, Options, OutputFormat, RenderContext, SyntaxExtension,
    TableAlignment,
};

use crate::{extension_render, resolve_type_name};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                          <!DOCTYPE document SYSTEM \"CommonMark.dtd\">\n";

const XMLNS: &str = "http://commonmark.org/xml/1.0";

/// Render a document as CommonMark XML.
pub fn render_xml(doc: &Node, options: Options, extensions: &[Arc<dyn SyntaxExtension>]) -> String {
    let mut renderer = XmlRenderer {
        ctx: RenderContext::new(options),
        extensions,
        alignments: Vec::new(),
        column: 0,
    };
    renderer.ctx.write(XML_HEADER);
    renderer.node(doc, 0);
    renderer.ctx.into_string()
}

struct XmlRenderer<'e> {
    ctx: RenderContext,
    extensions: &'e [Arc<dyn SyntaxExtension>],
    /// Column alignments of the table being written
    alignments: Vec<TableAlignment>,
    /// Next cell's column in the current row
    column: usize,
}

impl XmlRenderer<'_> {
    fn attr(&mut self, name: &str, value: &str) {
        self.ctx.write(&format!(
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        ));
    }

    fn node(&mut self, node: &Node, depth: usize) {
        self.ctx.write(&"  ".repeat(depth));
        if extension_render(self.extensions, OutputFormat::Xml, node, &mut self.ctx) {
            self.ctx.cr();
            return;
        }

        let name = resolve_type_name(self.extensions, node);
        self.ctx.write("<");
        self.ctx.write(name);
        if self.ctx.options().contains(Options::SOURCEPOS) {
            self.attr("sourcepos", &node.span.to_string());
        }
        self.attributes(node);

        if node.value.has_literal() {
            self.ctx.write(" xml:space=\"preserve\">");
            self.ctx.write(&html_escape::encode_text(&node.literal));
            self.ctx.write(&format!("</{name}>\n"));
        } else if node.children.is_empty() {
            self.ctx.write(" />\n");
        } else {
            self.ctx.write(">\n");
            for child in &node.children {
                self.node(child, depth + 1);
            }
            self.ctx.write(&"  ".repeat(depth));
            self.ctx.write(&format!("</{name}>\n"));
        }
    }

    fn attributes(&mut self, node: &Node) {
        match &node.value {
            NodeValue::Document => self.attr("xmlns", XMLNS),
            NodeValue::Heading(heading) => self.attr("level", &heading.level.to_string()),
            NodeValue::List(list) => {
                match list.list_type {
                    ListType::Bullet => self.attr("type", "bullet"),
                    ListType::Ordered => {
                        self.attr("type", "ordered");
                        self.attr("start", &list.start.to_string());
                        let delim = match list.delim {
                            ListDelim::Period => "period",
                            ListDelim::Paren => "paren",
                        };
                        self.attr("delim", delim);
                    }
                }
                self.attr("tight", if list.tight { "true" } else { "false" });
            }
            NodeValue::TaskItem { checked, .. } => {
                self.attr("completed", if *checked { "true" } else { "false" })
            }
            NodeValue::Table(alignments) => self.alignments = alignments.clone(),
            NodeValue::TableRow(_) => self.column = 0,
            NodeValue::TableCell => {
                let align = self.alignments.get(self.column).copied().unwrap_or_default();
                self.column += 1;
                if let Some(align) = align.as_str() {
                    self.attr("align", align);
                }
            }
            NodeValue::CodeBlock(code) if !code.info.is_empty() => self.attr("info", &code.info),
            NodeValue::Link(link) | NodeValue::Image(link) => {
                self.attr("destination", &link.url);
                self.attr("title", &link.title);
            }
            _ => {}
        }
    }
}
