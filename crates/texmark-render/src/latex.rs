//! LaTeX renderer.
//!
//! Emits a body fragment (no preamble). Assumes `hyperref`, `graphicx`,
//! `ulem` and `amssymb` are loaded by the surrounding document. Raw HTML
//! is dropped.

use std::sync::Arc;

use texmark_core::{
    ListType, Node, NodeLink, NodeValue, Options, OutputFormat, RenderContext, SyntaxExtension,
    TableAlignment,
};

use crate::extension_render;

/// Render a document as LaTeX.
pub fn render_latex(doc: &Node, options: Options, extensions: &[Arc<dyn SyntaxExtension>]) -> String {
    let mut renderer = LatexRenderer {
        ctx: RenderContext::new(options),
        extensions,
    };
    renderer.node(doc, false);
    renderer.ctx.cr();
    renderer.ctx.into_string()
}

/// Escape the characters LaTeX treats specially in running text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a URL for `\href` and `\url`.
fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        if matches!(c, '%' | '#' | '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct LatexRenderer<'e> {
    ctx: RenderContext,
    extensions: &'e [Arc<dyn SyntaxExtension>],
}

impl LatexRenderer<'_> {
    fn write(&mut self, s: &str) {
        self.ctx.write(s);
    }

    fn blocks(&mut self, node: &Node, tight: bool) {
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                if tight {
                    self.ctx.cr();
                } else {
                    self.ctx.blank_line();
                }
            }
            self.node(child, tight);
        }
    }

    fn inlines(&mut self, node: &Node) {
        for child in &node.children {
            self.node(child, false);
        }
    }

    fn environment(&mut self, name: &str, node: &Node, tight: bool) {
        self.ctx.cr();
        self.write(&format!("\\begin{{{name}}}\n"));
        self.blocks(node, tight);
        self.ctx.cr();
        self.write(&format!("\\end{{{name}}}"));
        self.ctx.cr();
    }

    fn node(&mut self, node: &Node, tight: bool) {
        if extension_render(self.extensions, OutputFormat::Latex, node, &mut self.ctx) {
            return;
        }

        match &node.value {
            NodeValue::Document => self.blocks(node, false),
            NodeValue::BlockQuote => self.environment("quote", node, false),
            NodeValue::List(list) => {
                let name = match list.list_type {
                    ListType::Bullet => "itemize",
                    ListType::Ordered => "enumerate",
                };
                self.ctx.cr();
                self.write(&format!("\\begin{{{name}}}\n"));
                if list.list_type == ListType::Ordered && list.start != 1 {
                    self.write(&format!("\\setcounter{{enumi}}{{{}}}\n", list.start as i64 - 1));
                }
                self.blocks(node, list.tight);
                self.ctx.cr();
                self.write(&format!("\\end{{{name}}}"));
                self.ctx.cr();
            }
            NodeValue::Item(_) => {
                self.write("\\item ");
                self.blocks(node, tight);
            }
            NodeValue::TaskItem { checked, .. } => {
                let box_symbol = if *checked { "\\boxtimes" } else { "\\square" };
                self.write(&format!("\\item[${box_symbol}$] "));
                self.blocks(node, tight);
            }
            NodeValue::HtmlBlock | NodeValue::HtmlInline => {}
            NodeValue::Heading(heading) => {
                let command = match heading.level {
                    1 => "section",
                    2 => "subsection",
                    3 => "subsubsection",
                    4 => "paragraph",
                    _ => "subparagraph",
                };
                self.write(&format!("\\{command}{{"));
                self.inlines(node);
                self.write("}");
                self.ctx.cr();
            }
            NodeValue::CodeBlock(_) => {
                self.ctx.cr();
                self.write("\\begin{verbatim}\n");
                self.write(&node.literal);
                self.ctx.cr();
                self.write("\\end{verbatim}");
                self.ctx.cr();
            }
            NodeValue::ThematicBreak => {
                self.write("\\begin{center}\\rule{3in}{0.4pt}\\end{center}");
                self.ctx.cr();
            }
            NodeValue::Paragraph => {
                self.inlines(node);
                self.ctx.cr();
            }
            NodeValue::Table(alignments) => self.table(node, alignments),
            NodeValue::TableRow(_) => self.table_row(node),
            NodeValue::TableCell => self.inlines(node),
            NodeValue::Text => self.write(&escape_latex(&node.literal)),
            NodeValue::SoftBreak => {
                let options = self.ctx.options();
                if options.contains(Options::HARDBREAKS) {
                    self.write("\\\\\n");
                } else if options.contains(Options::NOBREAKS) {
                    self.write(" ");
                } else {
                    self.write("\n");
                }
            }
            NodeValue::LineBreak => self.write("\\\\\n"),
            NodeValue::Code | NodeValue::Math(_) => {
                self.write("\\texttt{");
                self.write(&escape_latex(&node.literal));
                self.write("}");
            }
            NodeValue::Emph => self.command("emph", node),
            NodeValue::Strong => self.command("textbf", node),
            NodeValue::Strikethrough => self.command("sout", node),
            NodeValue::Link(link) => self.link(node, link),
            NodeValue::Image(link) => {
                self.write("\\protect\\includegraphics{");
                self.write(&escape_url(&link.url));
                self.write("}");
            }
        }
    }

    /// `tabular` with a rule under the header row.
    fn table(&mut self, node: &Node, alignments: &[TableAlignment]) {
        let columns: String = alignments
            .iter()
            .map(|align| match align {
                TableAlignment::Center => 'c',
                TableAlignment::Right => 'r',
                TableAlignment::None | TableAlignment::Left => 'l',
            })
            .collect();
        self.ctx.cr();
        self.write(&format!("\\begin{{tabular}}{{{columns}}}\n"));
        for row in &node.children {
            self.table_row(row);
            if row.value == NodeValue::TableRow(true) {
                self.write("\\hline\n");
            }
        }
        self.write("\\end{tabular}");
        self.ctx.cr();
    }

    fn table_row(&mut self, row: &Node) {
        for (i, cell) in row.children.iter().enumerate() {
            if i > 0 {
                self.write(" & ");
            }
            self.inlines(cell);
        }
        self.write(" \\\\\n");
    }

    fn command(&mut self, name: &str, node: &Node) {
        self.write(&format!("\\{name}{{"));
        self.inlines(node);
        self.write("}");
    }

    fn link(&mut self, node: &Node, link: &NodeLink) {
        let url = escape_url(&link.url);
        if node.text_content() == link.url {
            self.write(&format!("\\url{{{url}}}"));
            return;
        }
        self.write(&format!("\\href{{{url}}}{{"));
        self.inlines(node);
        self.write("}");
    }
}
