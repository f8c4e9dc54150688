//! CommonMark renderer.
//!
//! Writes a normalized form of the document: ATX headings, fenced code,
//! `*` emphasis, `-`-style markers kept from the source. Text is escaped
//! wherever a character could start markup on re-parse, so feeding the
//! output back through the parser (with the same extensions) yields the
//! same tree up to source positions and code block style. Tables are
//! written as pipe tables and raw HTML as it appeared.

use std::sync::Arc;

use texmark_core::{
    ListDelim, ListType, Node, NodeLink, NodeList, NodeValue, Options, OutputFormat, RenderContext,
    SyntaxExtension, TableAlignment,
};

use crate::extension_render;

/// Render a document as CommonMark.
pub fn render_commonmark(doc: &Node, options: Options, extensions: &[Arc<dyn SyntaxExtension>]) -> String {
    let mut renderer = CommonMarkRenderer {
        ctx: RenderContext::new(options),
        extensions,
        begin_line: false,
        in_table: false,
    };
    renderer.node(doc);
    renderer.ctx.cr();
    renderer.ctx.into_string()
}

struct CommonMarkRenderer<'e> {
    ctx: RenderContext,
    extensions: &'e [Arc<dyn SyntaxExtension>],
    /// Next text starts a line of block content
    begin_line: bool,
    /// Writing a table cell, where code spans escape `|`
    in_table: bool,
}

impl CommonMarkRenderer<'_> {
    fn write(&mut self, s: &str) {
        self.ctx.write(s);
        if !s.is_empty() {
            self.begin_line = false;
        }
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
            self.node(child);
        }
    }

    fn inlines(&mut self, node: &Node) {
        for child in &node.children {
            self.node(child);
        }
    }

    fn node(&mut self, node: &Node) {
        if extension_render(self.extensions, OutputFormat::CommonMark, node, &mut self.ctx) {
            self.begin_line = false;
            return;
        }

        match &node.value {
            NodeValue::Document => self.blocks(node, false),
            NodeValue::BlockQuote if node.children.is_empty() => {
                self.write(">");
                self.ctx.cr();
            }
            NodeValue::BlockQuote => {
                if !self.ctx.is_at_line_start() {
                    self.write("> ");
                }
                let saved = self.ctx.push_prefix("> ");
                self.blocks(node, false);
                self.ctx.cr();
                self.ctx.restore_prefix(saved);
            }
            NodeValue::List(list) => self.list(node, list),
            NodeValue::Item(list) | NodeValue::TaskItem { list, .. } => self.blocks(node, list.tight),
            NodeValue::Heading(heading) => {
                self.write(&"#".repeat(heading.level as usize));
                self.write(" ");
                self.inlines(node);
                self.ctx.cr();
            }
            NodeValue::CodeBlock(code) => {
                let (fence_char, run) = if code.info.contains('`') {
                    ('~', longest_run(&node.literal, '~'))
                } else {
                    ('`', longest_run(&node.literal, '`'))
                };
                let fence = fence_char.to_string().repeat((run + 1).max(3));
                self.write(&fence);
                self.write(&code.info);
                self.ctx.cr();
                self.write(&node.literal);
                self.ctx.cr();
                self.write(&fence);
                self.ctx.cr();
            }
            NodeValue::HtmlBlock => {
                self.write(node.literal.trim_end_matches('\n'));
                self.ctx.cr();
            }
            NodeValue::ThematicBreak => {
                self.write("***");
                self.ctx.cr();
            }
            NodeValue::Table(alignments) => {
                for (i, row) in node.children.iter().enumerate() {
                    self.table_row(row);
                    if i == 0 {
                        self.delimiter_row(alignments);
                    }
                }
            }
            NodeValue::TableRow(_) => self.table_row(node),
            NodeValue::TableCell => self.inlines(node),
            NodeValue::Paragraph => {
                self.begin_line = true;
                self.inlines(node);
                self.ctx.cr();
            }
            NodeValue::Text => self.text(&node.literal),
            NodeValue::SoftBreak => {
                if self.ctx.options().contains(Options::NOBREAKS) {
                    self.write(" ");
                } else {
                    self.write("\n");
                    self.begin_line = true;
                }
            }
            NodeValue::LineBreak => {
                self.write("\\\n");
                self.begin_line = true;
            }
            NodeValue::Code | NodeValue::Math(_) => self.code_span(&node.literal),
            NodeValue::HtmlInline => self.write(&node.literal),
            NodeValue::Emph => self.wrap("*", node),
            NodeValue::Strong => self.wrap("**", node),
            NodeValue::Strikethrough => self.wrap("~~", node),
            NodeValue::Link(link) => {
                if let Some(text) = autolink_text(node, link) {
                    self.write("<");
                    self.write(text);
                    self.write(">");
                } else if let Some(text) = www_text(node, link) {
                    self.write(text);
                } else {
                    self.write("[");
                    self.inlines(node);
                    self.write("](");
                    self.target(link);
                    self.write(")");
                }
            }
            NodeValue::Image(link) => {
                self.write("![");
                self.inlines(node);
                self.write("](");
                self.target(link);
                self.write(")");
            }
        }
    }

    fn list(&mut self, node: &Node, list: &NodeList) {
        let tight = list.tight;
        for (i, item) in node.children.iter().enumerate() {
            if i > 0 {
                if tight {
                    self.ctx.cr();
                } else {
                    self.ctx.blank_line();
                }
            }
            let marker = match list.list_type {
                ListType::Bullet => match list.bullet_char {
                    0 => "- ".to_string(),
                    b => format!("{} ", b as char),
                },
                ListType::Ordered => {
                    let delim = match list.delim {
                        ListDelim::Period => '.',
                        ListDelim::Paren => ')',
                    };
                    format!("{}{delim} ", list.start + i)
                }
            };
            self.write(&marker);
            if let NodeValue::TaskItem { checked, .. } = item.value {
                self.write(if checked { "[x] " } else { "[ ] " });
            }
            let saved = self.ctx.push_prefix(&" ".repeat(marker.len()));
            self.blocks(item, tight);
            self.ctx.cr();
            self.ctx.restore_prefix(saved);
        }
    }

    fn table_row(&mut self, row: &Node) {
        self.write("|");
        self.in_table = true;
        for cell in &row.children {
            self.write(" ");
            self.inlines(cell);
            self.write(" |");
        }
        self.in_table = false;
        self.ctx.cr();
    }

    fn delimiter_row(&mut self, alignments: &[TableAlignment]) {
        self.write("|");
        for align in alignments {
            self.write(match align {
                TableAlignment::None => " --- |",
                TableAlignment::Left => " :-- |",
                TableAlignment::Center => " :-: |",
                TableAlignment::Right => " --: |",
            });
        }
        self.ctx.cr();
    }

    fn wrap(&mut self, delim: &str, node: &Node) {
        self.write(delim);
        self.inlines(node);
        self.write(delim);
    }

    fn code_span(&mut self, literal: &str) {
        let literal = if self.in_table {
            literal.replace('|', "\\|")
        } else {
            literal.to_string()
        };
        let literal = literal.as_str();
        let fence = "`".repeat(longest_run(literal, '`') + 1);
        let pad = literal.starts_with('`')
            || literal.ends_with('`')
            || (literal.starts_with(' ') && literal.ends_with(' ') && !literal.trim().is_empty());
        self.write(&fence);
        if pad {
            self.write(" ");
        }
        self.write(literal);
        if pad {
            self.write(" ");
        }
        self.write(&fence);
    }

    fn target(&mut self, link: &NodeLink) {
        let needs_brackets = link.url.is_empty()
            || link.url.contains(|c: char| c.is_whitespace() || c == '<' || c == '>')
            || !balanced_parens(&link.url);
        if needs_brackets {
            self.write("<");
            self.write(&escape_with(&link.url, &['\\', '<', '>', '&']));
            self.write(">");
        } else {
            self.write(&escape_with(&link.url, &['\\', '&']));
        }
        if !link.title.is_empty() {
            self.write(" \"");
            self.write(&escape_with(&link.title, &['\\', '"', '&']));
            self.write("\"");
        }
    }

    /// Escape everything that could re-parse as markup.
    fn text(&mut self, text: &str) {
        let line_start = self.begin_line || self.ctx.is_at_line_start();
        let digits = if line_start {
            text.bytes().take_while(u8::is_ascii_digit).count()
        } else {
            0
        };

        let mut out = String::with_capacity(text.len() + 8);
        for (i, c) in text.char_indices() {
            let after_backslash = match out.chars().next_back() {
                Some(prev) => prev == '\\',
                None => self.ctx.last_char() == Some('\\'),
            };
            let escape = match c {
                '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '&' | '$' | '~' | '#' | '!' | '|' => true,
                '(' => after_backslash,
                '-' | '+' | '=' => line_start && i == 0,
                '.' | ')' => digits > 0 && i == digits,
                _ => false,
            };
            if escape {
                out.push('\\');
            }
            out.push(c);
        }
        self.write(&out);
    }
}

/// `<url>` form: the only child is text spelling the destination.
fn autolink_text<'n>(node: &'n Node, link: &NodeLink) -> Option<&'n str> {
    let [child] = node.children.as_slice() else {
        return None;
    };
    if child.value != NodeValue::Text || !link.url.contains(':') {
        return None;
    }
    let text = child.literal.as_str();
    let same = link.url == text || link.url.strip_prefix("mailto:") == Some(text);
    let plain = !text.contains(|c: char| c.is_whitespace() || c == '<' || c == '>');
    (same && plain).then_some(text)
}

/// Bare `www.` link, written back as it appeared.
fn www_text<'n>(node: &'n Node, link: &NodeLink) -> Option<&'n str> {
    let [child] = node.children.as_slice() else {
        return None;
    };
    let text = child.literal.as_str();
    let bare = child.value == NodeValue::Text
        && text.starts_with("www.")
        && link.url.strip_prefix("http://") == Some(text);
    bare.then_some(text)
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn balanced_parens(url: &str) -> bool {
    let mut depth = 0usize;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

fn escape_with(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use texmark_core::{MathKind, NodeCodeBlock, NodeHeading};

    fn cm(doc: &Node) -> String {
        render_commonmark(doc, Options::DEFAULT, &[])
    }

    #[test]
    fn test_blocks_separated_by_blank_lines() {
        let d = doc(vec![
            node(
                NodeValue::Heading(NodeHeading { level: 2, setext: true }),
                vec![Node::text("T")],
            ),
            para(vec![Node::text("a")]),
            Node::new(NodeValue::ThematicBreak),
        ]);
        assert_eq!(cm(&d), "## T\n\na\n\n***\n");
    }

    #[test]
    fn test_escapes_markup() {
        let d = doc(vec![para(vec![Node::text("1. a*b $$c$$ [d] \\(e")])]);
        assert_eq!(cm(&d), "1\\. a\\*b \\$\\$c\\$\\$ \\[d\\] \\\\\\(e\n");
    }

    #[test]
    fn test_line_start_escapes_after_soft_break() {
        let d = doc(vec![para(vec![
            Node::text("a"),
            Node::new(NodeValue::SoftBreak),
            Node::text("- b"),
        ])]);
        assert_eq!(cm(&d), "a\n\\- b\n");
    }

    #[test]
    fn test_blockquote_prefix() {
        let d = doc(vec![node(
            NodeValue::BlockQuote,
            vec![para(vec![Node::text("a")]), para(vec![Node::text("b")])],
        )]);
        assert_eq!(cm(&d), "> a\n>\n> b\n");
    }

    #[test]
    fn test_empty_blockquote() {
        let d = doc(vec![
            para(vec![Node::text("a")]),
            Node::new(NodeValue::BlockQuote),
            node(NodeValue::BlockQuote, vec![Node::new(NodeValue::BlockQuote)]),
        ]);
        assert_eq!(cm(&d), "a\n\n>\n\n> >\n");
    }

    #[test]
    fn test_lists() {
        let tight = NodeList {
            list_type: ListType::Ordered,
            delim: ListDelim::Paren,
            start: 4,
            tight: true,
            ..NodeList::default()
        };
        let item = |t: &str| node(NodeValue::Item(tight), vec![para(vec![Node::text(t)])]);
        let d = doc(vec![node(NodeValue::List(tight), vec![item("a"), item("b")])]);
        assert_eq!(cm(&d), "4) a\n5) b\n");

        let loose = NodeList {
            bullet_char: b'*',
            tight: false,
            ..NodeList::default()
        };
        let item = |t: &str| {
            node(
                NodeValue::Item(loose),
                vec![para(vec![Node::text(t)]), para(vec![Node::text("more")])],
            )
        };
        let d = doc(vec![node(NodeValue::List(loose), vec![item("a")])]);
        assert_eq!(cm(&d), "* a\n\n  more\n");
    }

    #[test]
    fn test_code_block_fence_grows() {
        let d = doc(vec![Node::with_literal(
            NodeValue::CodeBlock(NodeCodeBlock {
                info: "md".to_string(),
                ..NodeCodeBlock::default()
            }),
            "````\n",
        )]);
        assert_eq!(cm(&d), "`````md\n````\n`````\n");
    }

    #[test]
    fn test_code_span_padding() {
        let d = doc(vec![para(vec![Node::with_literal(NodeValue::Code, "`x")])]);
        assert_eq!(cm(&d), "`` `x ``\n");
    }

    #[test]
    fn test_math_falls_back_to_code_span() {
        let d = doc(vec![para(vec![Node::with_literal(
            NodeValue::Math(MathKind::Block),
            "a*2",
        )])]);
        assert_eq!(cm(&d), "`a*2`\n");
    }

    #[test]
    fn test_task_items() {
        let list = NodeList {
            tight: true,
            ..NodeList::default()
        };
        let task = |checked: bool, t: &str| {
            node(
                NodeValue::TaskItem { list, checked },
                vec![para(vec![Node::text(t)])],
            )
        };
        let d = doc(vec![node(
            NodeValue::List(list),
            vec![task(true, "done"), task(false, "[ ] todo")],
        )]);
        assert_eq!(cm(&d), "- [x] done\n- [ ] \\[ \\] todo\n");
    }

    #[test]
    fn test_table() {
        let cell = |inlines: Vec<Node>| node(NodeValue::TableCell, inlines);
        let d = doc(vec![node(
            NodeValue::Table(vec![TableAlignment::Left, TableAlignment::Right]),
            vec![
                node(
                    NodeValue::TableRow(true),
                    vec![cell(vec![Node::text("a|b")]), cell(vec![])],
                ),
                node(
                    NodeValue::TableRow(false),
                    vec![
                        cell(vec![Node::with_literal(NodeValue::Code, "x|y")]),
                        cell(vec![node(NodeValue::Emph, vec![Node::text("-")])]),
                    ],
                ),
            ],
        )]);
        assert_eq!(
            cm(&d),
            "| a\\|b |  |\n| :-- | --: |\n| `x\\|y` | *-* |\n"
        );
    }

    #[test]
    fn test_raw_html() {
        let d = doc(vec![
            Node::with_literal(NodeValue::HtmlBlock, "<div>\n\n</div>\n"),
            para(vec![
                Node::text("a "),
                Node::with_literal(NodeValue::HtmlInline, "<b>"),
                Node::text("<"),
            ]),
        ]);
        assert_eq!(cm(&d), "<div>\n\n</div>\n\na <b>\\<\n");
    }

    #[test]
    fn test_links() {
        let link = |url: &str, title: &str| {
            NodeValue::Link(NodeLink {
                url: url.to_string(),
                title: title.to_string(),
            })
        };
        let d = doc(vec![para(vec![
            node(link("http://a.org", ""), vec![Node::text("http://a.org")]),
            Node::text(" "),
            node(link("/x y", "t\""), vec![Node::text("z")]),
            Node::text(" "),
            node(link("http://www.b.org", ""), vec![Node::text("www.b.org")]),
        ])]);
        assert_eq!(cm(&d), "<http://a.org> [z](</x y> \"t\\\"\") www.b.org\n");
    }
}
