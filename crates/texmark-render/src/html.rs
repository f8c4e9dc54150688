//! HTML renderer.
//!
//! Produces the same markup as the cmark reference renderer. Block
//! elements carry `data-sourcepos` when [`Options::SOURCEPOS`] is set.
//! Unless [`Options::UNSAFE`] is set, raw HTML is replaced by a comment
//! and link and image targets with script-capable schemes are dropped.

use std::sync::{Arc, LazyLock};

use texmark_core::{
    ListType, Node, NodeLink, NodeValue, Options, OutputFormat, RenderContext, SyntaxExtension,
    TableAlignment,
};

use crate::extension_render;

/// Bytes written to an `href` as they are; everything else is escaped.
static HREF_SAFE: LazyLock<[bool; 256]> = LazyLock::new(|| {
    let mut table = [false; 256];
    for &c in b"-_.+!*(),%#@?=;:/$~".iter() {
        table[c as usize] = true;
    }
    for c in (b'a'..=b'z').chain(b'A'..=b'Z').chain(b'0'..=b'9') {
        table[c as usize] = true;
    }
    table
});

/// Stands in for raw HTML without [`Options::UNSAFE`]
const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Render a document as HTML.
pub fn render_html(doc: &Node, options: Options, extensions: &[Arc<dyn SyntaxExtension>]) -> String {
    let mut renderer = HtmlRenderer {
        ctx: RenderContext::new(options),
        extensions,
    };
    renderer.node(doc, false);
    renderer.ctx.into_string()
}

/// Whether a URL must not be emitted: script schemes, `file:` and any
/// `data:` that is not an image.
pub fn dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("data:") {
        return !["png", "gif", "jpeg", "webp"]
            .iter()
            .any(|kind| lower[5..].starts_with(&format!("image/{kind}")));
    }
    ["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Percent-encode a URL for an attribute value.
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for &b in url.as_bytes() {
        match b {
            b if HREF_SAFE[b as usize] => out.push(b as char),
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#x27;"),
            b => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

struct HtmlRenderer<'e> {
    ctx: RenderContext,
    extensions: &'e [Arc<dyn SyntaxExtension>],
}

impl HtmlRenderer<'_> {
    fn write(&mut self, s: &str) {
        self.ctx.write(s);
    }

    fn text(&mut self, s: &str) {
        self.ctx.write(&html_escape::encode_text(s));
    }

    fn attr(&mut self, s: &str) {
        self.ctx.write(&html_escape::encode_double_quoted_attribute(s));
    }

    fn sourcepos(&mut self, node: &Node) {
        if self.ctx.options().contains(Options::SOURCEPOS) {
            self.write(&format!(" data-sourcepos=\"{}\"", node.span));
        }
    }

    fn children(&mut self, node: &Node, tight: bool) {
        for child in &node.children {
            self.node(child, tight);
        }
    }

    /// Open a block tag: newline if needed, `<tag`, sourcepos, `>`.
    fn open_block(&mut self, tag: &str, node: &Node) {
        self.ctx.cr();
        self.write("<");
        self.write(tag);
        self.sourcepos(node);
        self.write(">");
    }

    /// `tight` is set for the direct children of items in a tight list,
    /// whose paragraphs are written without `<p>`.
    fn node(&mut self, node: &Node, tight: bool) {
        if extension_render(self.extensions, OutputFormat::Html, node, &mut self.ctx) {
            return;
        }

        match &node.value {
            NodeValue::Document => self.children(node, false),
            NodeValue::BlockQuote => {
                self.open_block("blockquote", node);
                self.write("\n");
                self.children(node, false);
                self.ctx.cr();
                self.write("</blockquote>\n");
            }
            NodeValue::List(list) => {
                let tag = match list.list_type {
                    ListType::Bullet => "ul",
                    ListType::Ordered => "ol",
                };
                self.ctx.cr();
                self.write("<");
                self.write(tag);
                if tag == "ol" && list.start != 1 {
                    self.write(&format!(" start=\"{}\"", list.start));
                }
                self.sourcepos(node);
                self.write(">\n");
                self.children(node, list.tight);
                self.ctx.cr();
                self.write(&format!("</{tag}>\n"));
            }
            NodeValue::Item(_) => {
                self.open_block("li", node);
                self.children(node, tight);
                self.write("</li>\n");
            }
            NodeValue::TaskItem { checked, .. } => {
                self.open_block("li", node);
                self.write("<input type=\"checkbox\"");
                if *checked {
                    self.write(" checked=\"\"");
                }
                self.write(" disabled=\"\" /> ");
                self.children(node, tight);
                self.write("</li>\n");
            }
            NodeValue::Heading(heading) => {
                let tag = format!("h{}", heading.level);
                self.open_block(&tag, node);
                self.children(node, false);
                self.write(&format!("</{tag}>\n"));
            }
            NodeValue::CodeBlock(code) => {
                self.ctx.cr();
                self.write("<pre");
                self.sourcepos(node);
                self.write("><code");
                if let Some(lang) = code.info.split_whitespace().next() {
                    self.write(" class=\"language-");
                    self.attr(lang);
                    self.write("\"");
                }
                self.write(">");
                self.text(&node.literal);
                self.write("</code></pre>\n");
            }
            NodeValue::HtmlBlock => {
                self.ctx.cr();
                self.raw_html(&node.literal);
                self.ctx.cr();
            }
            NodeValue::ThematicBreak => {
                self.ctx.cr();
                self.write("<hr");
                self.sourcepos(node);
                self.write(" />\n");
            }
            NodeValue::Paragraph => {
                if tight {
                    self.children(node, false);
                } else {
                    self.open_block("p", node);
                    self.children(node, false);
                    self.write("</p>\n");
                }
            }
            NodeValue::Table(alignments) => self.table(node, alignments),
            NodeValue::TableRow(_) => self.table_row(node, &[]),
            NodeValue::TableCell => self.table_cell(node, false, TableAlignment::None),
            NodeValue::Text => self.text(&node.literal),
            NodeValue::SoftBreak => {
                let options = self.ctx.options();
                if options.contains(Options::HARDBREAKS) {
                    self.write("<br />\n");
                } else if options.contains(Options::NOBREAKS) {
                    self.write(" ");
                } else {
                    self.write("\n");
                }
            }
            NodeValue::LineBreak => self.write("<br />\n"),
            NodeValue::Code | NodeValue::Math(_) => {
                self.write("<code>");
                self.text(&node.literal);
                self.write("</code>");
            }
            NodeValue::HtmlInline => self.raw_html(&node.literal),
            NodeValue::Emph => self.inline_tag("em", node),
            NodeValue::Strong => self.inline_tag("strong", node),
            NodeValue::Strikethrough => self.inline_tag("del", node),
            NodeValue::Link(link) => {
                self.write("<a href=\"");
                self.url(link);
                self.write("\"");
                self.title(link);
                self.write(">");
                self.children(node, false);
                self.write("</a>");
            }
            NodeValue::Image(link) => {
                self.write("<img src=\"");
                self.url(link);
                self.write("\" alt=\"");
                self.attr(&node.text_content());
                self.write("\"");
                self.title(link);
                self.write(" />");
            }
        }
    }

    fn inline_tag(&mut self, tag: &str, node: &Node) {
        self.write(&format!("<{tag}>"));
        self.children(node, false);
        self.write(&format!("</{tag}>"));
    }

    fn raw_html(&mut self, literal: &str) {
        if self.ctx.options().contains(Options::UNSAFE) {
            self.write(literal);
        } else {
            self.write(RAW_HTML_OMITTED);
        }
    }

    /// Header row in `<thead>`, the rest in `<tbody>`.
    fn table(&mut self, node: &Node, alignments: &[TableAlignment]) {
        self.open_block("table", node);
        self.write("\n");
        let (header, body): (Vec<&Node>, Vec<&Node>) = node
            .children
            .iter()
            .partition(|row| row.value == NodeValue::TableRow(true));
        if !header.is_empty() {
            self.write("<thead>\n");
            for row in header {
                self.table_row(row, alignments);
            }
            self.write("</thead>\n");
        }
        if !body.is_empty() {
            self.write("<tbody>\n");
            for row in body {
                self.table_row(row, alignments);
            }
            self.write("</tbody>\n");
        }
        self.write("</table>\n");
    }

    fn table_row(&mut self, row: &Node, alignments: &[TableAlignment]) {
        let header = row.value == NodeValue::TableRow(true);
        self.open_block("tr", row);
        self.write("\n");
        for (i, cell) in row.children.iter().enumerate() {
            let align = alignments.get(i).copied().unwrap_or_default();
            self.table_cell(cell, header, align);
        }
        self.write("</tr>\n");
    }

    fn table_cell(&mut self, cell: &Node, header: bool, align: TableAlignment) {
        let tag = if header { "th" } else { "td" };
        self.ctx.cr();
        self.write("<");
        self.write(tag);
        if let Some(align) = align.as_str() {
            self.write(&format!(" align=\"{align}\""));
        }
        self.sourcepos(cell);
        self.write(">");
        self.children(cell, false);
        self.write(&format!("</{tag}>\n"));
    }

    fn url(&mut self, link: &NodeLink) {
        if self.ctx.options().contains(Options::UNSAFE) || !dangerous_url(&link.url) {
            self.write(&escape_href(&link.url));
        }
    }

    fn title(&mut self, link: &NodeLink) {
        if !link.title.is_empty() {
            self.write(" title=\"");
            self.attr(&link.title);
            self.write("\"");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use texmark_core::{NodeCodeBlock, NodeHeading, NodeList, Position, Span};

    fn html(doc: &Node) -> String {
        render_html(doc, Options::DEFAULT, &[])
    }

    #[test]
    fn test_paragraph_and_heading() {
        let d = doc(vec![
            node(
                NodeValue::Heading(NodeHeading { level: 2, setext: false }),
                vec![Node::text("Title")],
            ),
            para(vec![
                Node::text("a "),
                node(NodeValue::Emph, vec![Node::text("b")]),
                Node::new(NodeValue::SoftBreak),
                node(NodeValue::Strikethrough, vec![Node::text("c")]),
            ]),
        ]);
        assert_eq!(html(&d), "<h2>Title</h2>\n<p>a <em>b</em>\n<del>c</del></p>\n");
    }

    #[test]
    fn test_sourcepos() {
        let span = Span::new(Position::new(1, 1), Position::new(1, 3));
        let d = doc(vec![para(vec![Node::text("abc")]).spanned(span)]);
        let out = render_html(&d, Options::SOURCEPOS, &[]);
        assert_eq!(out, "<p data-sourcepos=\"1:1-1:3\">abc</p>\n");
    }

    #[test]
    fn test_breaks_options() {
        let d = doc(vec![para(vec![
            Node::text("a"),
            Node::new(NodeValue::SoftBreak),
            Node::text("b"),
        ])]);
        assert_eq!(render_html(&d, Options::HARDBREAKS, &[]), "<p>a<br />\nb</p>\n");
        assert_eq!(render_html(&d, Options::NOBREAKS, &[]), "<p>a b</p>\n");
    }

    #[test]
    fn test_tight_and_loose_lists() {
        let item = |t: &str| node(NodeValue::Item(NodeList::default()), vec![para(vec![Node::text(t)])]);
        let tight = NodeList {
            list_type: ListType::Bullet,
            tight: true,
            ..NodeList::default()
        };
        let d = doc(vec![node(NodeValue::List(tight), vec![item("a"), item("b")])]);
        assert_eq!(html(&d), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");

        let loose = NodeList {
            list_type: ListType::Ordered,
            start: 3,
            tight: false,
            ..NodeList::default()
        };
        let d = doc(vec![node(NodeValue::List(loose), vec![item("a")])]);
        assert_eq!(html(&d), "<ol start=\"3\">\n<li>\n<p>a</p>\n</li>\n</ol>\n");
    }

    #[test]
    fn test_code_block_language() {
        let d = doc(vec![Node::with_literal(
            NodeValue::CodeBlock(NodeCodeBlock {
                fenced: true,
                info: "rust extra".to_string(),
                ..NodeCodeBlock::default()
            }),
            "x < 1\n",
        )]);
        assert_eq!(
            html(&d),
            "<pre><code class=\"language-rust\">x &lt; 1\n</code></pre>\n"
        );
    }

    #[test]
    fn test_links_and_images() {
        let link = NodeLink {
            url: "http://x.org/a b".to_string(),
            title: "t\"q".to_string(),
        };
        let d = doc(vec![para(vec![
            node(NodeValue::Link(link.clone()), vec![Node::text("x")]),
            node(NodeValue::Image(link), vec![Node::text("alt")]),
        ])]);
        assert_eq!(
            html(&d),
            "<p><a href=\"http://x.org/a%20b\" title=\"t&quot;q\">x</a>\
             <img src=\"http://x.org/a%20b\" alt=\"alt\" title=\"t&quot;q\" /></p>\n"
        );
    }

    #[test]
    fn test_dangerous_urls() {
        assert!(dangerous_url("javascript:alert(1)"));
        assert!(dangerous_url("JavaScript:alert(1)"));
        assert!(dangerous_url("file:///etc/passwd"));
        assert!(dangerous_url("data:text/html;base64,xx"));
        assert!(!dangerous_url("data:image/png;base64,xx"));
        assert!(!dangerous_url("https://example.org"));

        let d = doc(vec![para(vec![node(
            NodeValue::Link(NodeLink {
                url: "javascript:x".to_string(),
                title: String::new(),
            }),
            vec![Node::text("bad")],
        )])]);
        assert_eq!(html(&d), "<p><a href=\"\">bad</a></p>\n");
    }

    #[test]
    fn test_raw_html() {
        let d = doc(vec![
            Node::with_literal(NodeValue::HtmlBlock, "<div>\n*x*\n</div>\n"),
            para(vec![
                Node::text("a "),
                Node::with_literal(NodeValue::HtmlInline, "<b>"),
            ]),
        ]);
        assert_eq!(
            html(&d),
            "<!-- raw HTML omitted -->\n<p>a <!-- raw HTML omitted --></p>\n"
        );
        assert_eq!(
            render_html(&d, Options::UNSAFE, &[]),
            "<div>\n*x*\n</div>\n<p>a <b></p>\n"
        );
    }

    #[test]
    fn test_unsafe_keeps_dangerous_url() {
        let d = doc(vec![para(vec![node(
            NodeValue::Link(NodeLink {
                url: "javascript:x".to_string(),
                title: String::new(),
            }),
            vec![Node::text("x")],
        )])]);
        assert_eq!(
            render_html(&d, Options::UNSAFE, &[]),
            "<p><a href=\"javascript:x\">x</a></p>\n"
        );
    }

    #[test]
    fn test_task_items() {
        let task = |checked: bool, t: &str| {
            node(
                NodeValue::TaskItem {
                    list: NodeList::default(),
                    checked,
                },
                vec![para(vec![Node::text(t)])],
            )
        };
        let tight = NodeList {
            tight: true,
            ..NodeList::default()
        };
        let d = doc(vec![node(
            NodeValue::List(tight),
            vec![task(true, "done"), task(false, "todo")],
        )]);
        assert_eq!(
            html(&d),
            "<ul>\n\
             <li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n\
             <li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_table() {
        let cell = |t: &str| node(NodeValue::TableCell, vec![Node::text(t)]);
        let d = doc(vec![node(
            NodeValue::Table(vec![TableAlignment::None, TableAlignment::Right]),
            vec![
                node(NodeValue::TableRow(true), vec![cell("a"), cell("b")]),
                node(NodeValue::TableRow(false), vec![cell("1"), cell("2")]),
            ],
        )]);
        assert_eq!(
            html(&d),
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th align=\"right\">b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>1</td>\n<td align=\"right\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_without_body() {
        let d = doc(vec![node(
            NodeValue::Table(vec![TableAlignment::Center]),
            vec![node(
                NodeValue::TableRow(true),
                vec![node(NodeValue::TableCell, vec![Node::text("h")])],
            )],
        )]);
        assert_eq!(
            html(&d),
            "<table>\n<thead>\n<tr>\n<th align=\"center\">h</th>\n</tr>\n</thead>\n</table>\n"
        );
    }

    #[test]
    fn test_blockquote() {
        let d = doc(vec![node(
            NodeValue::BlockQuote,
            vec![para(vec![Node::text("q")])],
        )]);
        assert_eq!(html(&d), "<blockquote>\n<p>q</p>\n</blockquote>\n");
    }
}
