//! Block structure.
//!
//! Lines are consumed one at a time against a stack of open blocks, in the
//! usual CommonMark manner: first every open container is asked whether
//! the line continues it, then new container and leaf blocks are opened
//! from what remains, and finally the rest of the line is added as text to
//! the deepest open block (or to a paragraph lazily continued from an
//! earlier line).
//!
//! When the tree is built, extensions may claim part of a paragraph as
//! another block (tables), and rewrite the finished document (task
//! list items).

use log::trace;
use std::sync::Arc;
use texmark_core::{
    LineStart, ListDelim, ListType, Node, NodeCodeBlock, NodeHeading, NodeList, NodeValue, ParagraphSplit,
    Position, Span, Subject, SyntaxExtension,
};

use crate::inline::InlineParser;
use crate::scanners::{self, ListMarker};

/// Columns a tab advances to
const TAB_STOP: usize = 4;

/// Indentation that turns a line into indented code
const CODE_INDENT: usize = 4;

const ROOT: usize = 0;

/// An open or closed block in the arena.
#[derive(Debug)]
struct Block {
    value: NodeValue,
    parent: usize,
    children: Vec<usize>,
    open: bool,
    start: Position,
    end: Position,
    /// Accumulated text for paragraphs, headings and code
    content: String,
    /// Where each content line came from
    lines: Vec<LineStart>,
    /// HTML block kind, 1 to 7
    html_kind: u8,
}

impl Block {
    fn new(value: NodeValue, parent: usize, start: Position) -> Self {
        Self {
            value,
            parent,
            children: Vec::new(),
            open: true,
            start,
            end: start,
            content: String::new(),
            lines: Vec::new(),
            html_kind: 0,
        }
    }

    fn can_contain(&self, child: &NodeValue) -> bool {
        match self.value {
            NodeValue::Document | NodeValue::BlockQuote | NodeValue::Item(_) => {
                !matches!(child, NodeValue::Item(_))
            }
            NodeValue::List(_) => matches!(child, NodeValue::Item(_)),
            _ => false,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(
            self.value,
            NodeValue::CodeBlock(_) | NodeValue::HtmlBlock | NodeValue::Heading(_) | NodeValue::ThematicBreak
        )
    }
}

/// One input line with tabs expanded, and the scan state over it.
#[derive(Debug)]
struct Line {
    text: String,
    number: usize,
    offset: usize,
    first_nonspace: usize,
    indent: usize,
    blank: bool,
}

impl Line {
    fn new(raw: &str, number: usize) -> Self {
        let mut line = Self {
            text: expand_tabs(raw),
            number,
            offset: 0,
            first_nonspace: 0,
            indent: 0,
            blank: false,
        };
        line.find_first_nonspace();
        line
    }

    fn find_first_nonspace(&mut self) {
        let bytes = self.text.as_bytes();
        let mut i = self.offset;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        self.first_nonspace = i;
        self.indent = i - self.offset;
        self.blank = i >= bytes.len();
    }

    fn advance(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.text.len());
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.text.as_bytes().get(i).copied()
    }

    fn rest(&self) -> &str {
        &self.text[self.first_nonspace..]
    }

    /// Position of the last non-space character
    fn end_position(&self) -> Position {
        Position::new(self.number, self.text.trim_end().len())
    }
}

fn expand_tabs(raw: &str) -> String {
    if !raw.contains('\t') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + TAB_STOP);
    let mut column = 0;
    for c in raw.chars() {
        if c == '\t' {
            let width = TAB_STOP - column % TAB_STOP;
            out.extend(std::iter::repeat(' ').take(width));
            column += width;
        } else {
            out.push(c);
            column += c.len_utf8();
        }
    }
    out
}

fn list_matches(existing: &NodeList, new: &NodeList) -> bool {
    existing.list_type == new.list_type
        && match new.list_type {
            ListType::Bullet => existing.bullet_char == new.bullet_char,
            ListType::Ordered => existing.delim == new.delim,
        }
}

/// How an open block decides whether a line continues it.
#[derive(Debug, Clone, Copy)]
enum Continuation {
    Quote,
    Item(usize),
    Fence { fence_char: u8, length: usize, offset: usize },
    Indented,
    Html(u8),
    Paragraph,
    Always,
    Never,
}

/// Line-by-line block parser.
#[derive(Debug)]
pub(crate) struct BlockParser {
    blocks: Vec<Block>,
    tip: usize,
    last_matched: usize,
    line_number: usize,
    last_line_length: usize,
}

impl BlockParser {
    pub(crate) fn new() -> Self {
        Self {
            blocks: vec![Block::new(NodeValue::Document, ROOT, Position::new(1, 1))],
            tip: ROOT,
            last_matched: ROOT,
            line_number: 0,
            last_line_length: 0,
        }
    }

    /// Consume one line, without its line terminator.
    pub(crate) fn process_line(&mut self, raw: &str) {
        self.line_number += 1;
        let mut line = Line::new(raw, self.line_number);
        self.last_line_length = line.text.len();

        let Some(last_matched) = self.match_continuations(&mut line) else {
            return;
        };
        self.last_matched = last_matched;

        let maybe_lazy = self.blocks[self.tip].value == NodeValue::Paragraph;
        let mut container = last_matched;

        while !self.blocks[container].is_leaf() {
            line.find_first_nonspace();
            let indented = line.indent >= CODE_INDENT;
            let fns = line.first_nonspace;
            let container_is_para = self.blocks[container].value == NodeValue::Paragraph;
            let container_is_list = matches!(self.blocks[container].value, NodeValue::List(_));

            if indented {
                if container_is_list {
                    if let Some(item) = self.parse_list_marker(&line, false) {
                        container = self.open_item(container, item, &mut line);
                        continue;
                    }
                }
                if !maybe_lazy && !line.blank {
                    line.advance(CODE_INDENT);
                    let start = line.offset;
                    let code = NodeValue::CodeBlock(NodeCodeBlock::default());
                    container = self.add_child(container, code, &line, start);
                }
                break;
            }

            if line.byte_at(fns) == Some(b'>') {
                line.offset = fns + 1;
                if line.byte_at(line.offset) == Some(b' ') {
                    line.advance(1);
                }
                container = self.add_child(container, NodeValue::BlockQuote, &line, fns);
                continue;
            }

            if let Some((level, len)) = scanners::atx_heading(line.rest()) {
                let heading = NodeValue::Heading(NodeHeading { level, setext: false });
                let idx = self.add_child(container, heading, &line, fns);
                let content_start = fns + len;
                let content = scanners::strip_atx_closing(&line.text[content_start..]).to_string();
                let block = &mut self.blocks[idx];
                block.lines.push(LineStart {
                    offset: 0,
                    line: line.number,
                    column: content_start + 1,
                });
                block.content = content;
                block.end = line.end_position();
                self.close(idx);
                return;
            }

            if let Some(fence) = scanners::fence_open(line.rest()) {
                let code = NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: true,
                    fence_char: fence.fence_char,
                    fence_length: fence.length,
                    fence_offset: line.indent,
                    info: fence.info,
                });
                let idx = self.add_child(container, code, &line, fns);
                self.blocks[idx].end = line.end_position();
                return;
            }

            if let Some(kind) = scanners::html_block_start(line.rest(), container_is_para) {
                container = self.add_child(container, NodeValue::HtmlBlock, &line, fns);
                self.blocks[container].html_kind = kind;
                break;
            }

            if container_is_para {
                if let Some(level) = scanners::setext_underline(line.rest()) {
                    let block = &mut self.blocks[container];
                    block.value = NodeValue::Heading(NodeHeading { level, setext: true });
                    block.end = line.end_position();
                    self.close(container);
                    return;
                }
            }

            if scanners::thematic_break(line.rest()) {
                let idx = self.add_child(container, NodeValue::ThematicBreak, &line, fns);
                self.blocks[idx].end = line.end_position();
                self.close(idx);
                return;
            }

            match self.parse_list_marker(&line, container_is_para) {
                Some(item) => container = self.open_item(container, item, &mut line),
                None => break,
            }
        }

        line.find_first_nonspace();
        let tip_is_para = self.blocks[self.tip].open && self.blocks[self.tip].value == NodeValue::Paragraph;
        if self.tip != last_matched && container == last_matched && !line.blank && tip_is_para {
            trace!("line {}: lazy continuation", line.number);
            let fns = line.first_nonspace;
            self.add_line(self.tip, &line, fns);
            return;
        }

        self.close_unmatched();
        match self.blocks[container].value {
            NodeValue::CodeBlock(_) => {
                let from = line.offset;
                self.add_line(container, &line, from);
            }
            NodeValue::HtmlBlock => {
                let from = line.offset;
                self.add_line(container, &line, from);
                let kind = self.blocks[container].html_kind;
                if scanners::html_block_end(&line.text[from.min(line.text.len())..], kind) {
                    self.close(container);
                }
            }
            NodeValue::Paragraph => {
                let fns = line.first_nonspace;
                self.add_line(container, &line, fns);
            }
            _ if !line.blank => {
                let fns = line.first_nonspace;
                let para = self.add_child(container, NodeValue::Paragraph, &line, fns);
                self.add_line(para, &line, fns);
            }
            _ => {}
        }
    }

    /// Open a list item (and its list, unless `container` already is a
    /// matching list) for the marker at the first non-space character.
    fn open_item(&mut self, container: usize, item: NodeList, line: &mut Line) -> usize {
        let fns = line.first_nonspace;
        line.offset = fns;
        line.advance(item.padding);

        let reuse = match &self.blocks[container].value {
            NodeValue::List(existing) => list_matches(existing, &item),
            _ => false,
        };
        let list = if reuse {
            container
        } else {
            self.add_child(container, NodeValue::List(item), line, fns)
        };
        self.add_child(list, NodeValue::Item(item), line, fns)
    }

    /// Walk the open blocks from the root and return the deepest one this
    /// line continues, or `None` when the line closed a fenced code block.
    fn match_continuations(&mut self, line: &mut Line) -> Option<usize> {
        let mut container = ROOT;

        while let Some(&last) = self.blocks[container].children.last() {
            if !self.blocks[last].open {
                break;
            }
            line.find_first_nonspace();

            let continuation = match &self.blocks[last].value {
                NodeValue::BlockQuote => Continuation::Quote,
                NodeValue::Item(item) => Continuation::Item(item.marker_offset + item.padding),
                NodeValue::CodeBlock(code) if code.fenced => Continuation::Fence {
                    fence_char: code.fence_char,
                    length: code.fence_length,
                    offset: code.fence_offset,
                },
                NodeValue::CodeBlock(_) => Continuation::Indented,
                NodeValue::HtmlBlock => Continuation::Html(self.blocks[last].html_kind),
                NodeValue::Paragraph => Continuation::Paragraph,
                NodeValue::List(_) => Continuation::Always,
                _ => Continuation::Never,
            };

            let matched = match continuation {
                Continuation::Quote => {
                    if line.indent < CODE_INDENT && line.byte_at(line.first_nonspace) == Some(b'>') {
                        line.offset = line.first_nonspace + 1;
                        if line.byte_at(line.offset) == Some(b' ') {
                            line.advance(1);
                        }
                        true
                    } else {
                        false
                    }
                }
                Continuation::Item(width) => {
                    if line.indent >= width {
                        line.advance(width);
                        true
                    } else if line.blank && !self.blocks[last].children.is_empty() {
                        line.offset = line.first_nonspace;
                        true
                    } else {
                        false
                    }
                }
                Continuation::Fence {
                    fence_char,
                    length,
                    offset,
                } => {
                    if line.indent < CODE_INDENT && scanners::closes_fence(line.rest(), fence_char, length) {
                        self.blocks[last].end = line.end_position();
                        self.close(last);
                        return None;
                    }
                    line.advance(line.indent.min(offset));
                    true
                }
                Continuation::Indented => {
                    if line.indent >= CODE_INDENT {
                        line.advance(CODE_INDENT);
                        true
                    } else if line.blank {
                        line.offset = line.first_nonspace;
                        true
                    } else {
                        false
                    }
                }
                Continuation::Html(kind) => kind <= 5 || !line.blank,
                Continuation::Paragraph => !line.blank,
                Continuation::Always => true,
                Continuation::Never => false,
            };

            if !matched {
                break;
            }
            container = last;
        }

        Some(container)
    }

    /// A list item marker at the first non-space character of `line`
    fn parse_list_marker(&self, line: &Line, interrupts_paragraph: bool) -> Option<NodeList> {
        let rest = line.rest();
        let (marker, width) = scanners::list_marker(rest)?;
        let after = &rest[width..];
        let spaces = after.bytes().take_while(|&b| b == b' ').count();
        let blank_after = spaces == after.len();

        if interrupts_paragraph {
            if blank_after {
                return None;
            }
            if matches!(marker, ListMarker::Ordered { start, .. } if start != 1) {
                return None;
            }
        }

        let padding = if blank_after || spaces > CODE_INDENT {
            width + 1
        } else {
            width + spaces
        };

        let mut list = NodeList {
            tight: true,
            marker_offset: line.indent,
            padding,
            ..NodeList::default()
        };
        match marker {
            ListMarker::Bullet(c) => {
                list.list_type = ListType::Bullet;
                list.bullet_char = c;
            }
            ListMarker::Ordered { start, delim } => {
                list.list_type = ListType::Ordered;
                list.start = start;
                list.delim = if delim == b')' {
                    ListDelim::Paren
                } else {
                    ListDelim::Period
                };
            }
        }
        Some(list)
    }

    /// Open a new block under `parent`, closing blocks that cannot hold it.
    fn add_child(&mut self, parent: usize, value: NodeValue, line: &Line, column: usize) -> usize {
        self.close_unmatched();

        let mut parent = parent;
        while !self.blocks[parent].can_contain(&value) {
            parent = self.close(parent);
        }

        trace!("line {}: open {} at column {}", line.number, value.type_name(), column + 1);
        let idx = self.blocks.len();
        self.blocks
            .push(Block::new(value, parent, Position::new(line.number, column + 1)));
        self.blocks[parent].children.push(idx);
        self.tip = idx;
        self.last_matched = idx;
        idx
    }

    fn add_line(&mut self, idx: usize, line: &Line, from: usize) {
        let text = &line.text[from.min(line.text.len())..];
        let block = &mut self.blocks[idx];
        block.lines.push(LineStart {
            offset: block.content.len(),
            line: line.number,
            column: from + 1,
        });
        block.content.push_str(text);
        block.content.push('\n');
        if !text.trim().is_empty() {
            block.end = line.end_position();
        }
    }

    /// Close every open block below the last matched container
    fn close_unmatched(&mut self) {
        while self.tip != self.last_matched && self.tip != ROOT {
            self.tip = self.close(self.tip);
        }
    }

    /// Close a block and return its parent; the parent becomes the tip.
    fn close(&mut self, idx: usize) -> usize {
        let parent = self.blocks[idx].parent;
        self.blocks[idx].open = false;

        let indented_code = matches!(&self.blocks[idx].value, NodeValue::CodeBlock(code) if !code.fenced);
        let block = &mut self.blocks[idx];
        match block.value {
            NodeValue::Paragraph | NodeValue::Heading(_) => {
                let len = block.content.trim_end().len();
                block.content.truncate(len);
            }
            NodeValue::CodeBlock(_) if indented_code => {
                while let Some(last) = block.content.strip_suffix('\n') {
                    let line_start = last.rfind('\n').map_or(0, |i| i + 1);
                    if !last[line_start..].trim().is_empty() {
                        break;
                    }
                    block.content.truncate(line_start);
                    block.lines.pop();
                }
            }
            _ => {}
        }
        if matches!(self.blocks[idx].value, NodeValue::List(_)) {
            self.finalize_list(idx);
        }

        if let Some(&last) = self.blocks[idx].children.last() {
            let child_end = self.blocks[last].end;
            if child_end > self.blocks[idx].end {
                self.blocks[idx].end = child_end;
            }
        }

        if self.tip == idx {
            self.tip = parent;
        }
        if self.last_matched == idx {
            self.last_matched = parent;
        }
        parent
    }

    /// A list is loose when a blank line separates two items or two
    /// blocks inside one item.
    fn finalize_list(&mut self, idx: usize) {
        let gap = |a: usize, b: usize, blocks: &[Block]| blocks[b].start.line > blocks[a].end.line + 1;

        let items = &self.blocks[idx].children;
        let mut tight = true;
        for (k, &item) in items.iter().enumerate() {
            if let Some(&next) = items.get(k + 1) {
                tight &= !gap(item, next, &self.blocks);
            }
            for pair in self.blocks[item].children.windows(2) {
                tight &= !gap(pair[0], pair[1], &self.blocks);
            }
        }

        let items = self.blocks[idx].children.clone();
        if let NodeValue::List(list) = &mut self.blocks[idx].value {
            list.tight = tight;
        }
        for item in items {
            if let NodeValue::Item(data) = &mut self.blocks[item].value {
                data.tight = tight;
            }
        }
    }

    /// Close all open blocks and build the document tree, parsing the
    /// inline content of every paragraph and heading.
    pub(crate) fn finish(mut self, extensions: &[Arc<dyn SyntaxExtension>]) -> Node {
        self.last_matched = ROOT;
        self.close_unmatched();
        self.close(ROOT);
        self.blocks[ROOT].end = Position::new(self.line_number.max(1), self.last_line_length);
        let mut doc = self.build(ROOT, extensions);
        for ext in extensions {
            ext.postprocess(&mut doc);
        }
        doc
    }

    fn build(&self, idx: usize, extensions: &[Arc<dyn SyntaxExtension>]) -> Node {
        let block = &self.blocks[idx];
        let mut node = Node::new(block.value.clone()).spanned(Span::new(block.start, block.end));

        match block.value {
            NodeValue::Paragraph | NodeValue::Heading(_) => {
                parse_inlines(&mut node, &block.content, block.lines.clone(), extensions);
            }
            NodeValue::CodeBlock(_) | NodeValue::HtmlBlock => node.literal = block.content.clone(),
            _ => {
                for &child in &block.children {
                    let split = match self.blocks[child].value {
                        NodeValue::Paragraph => self.split_paragraph(child, extensions),
                        _ => None,
                    };
                    match split {
                        Some(nodes) => node.children.extend(nodes),
                        None => node.append(self.build(child, extensions)),
                    }
                }
            }
        }
        node
    }

    /// Offer a paragraph to the extensions; the first that finds block
    /// structure in it decides what replaces it.
    fn split_paragraph(&self, idx: usize, extensions: &[Arc<dyn SyntaxExtension>]) -> Option<Vec<Node>> {
        let block = &self.blocks[idx];
        let ParagraphSplit { keep, block: mut split } = extensions
            .iter()
            .find_map(|ext| ext.split_paragraph(&block.content, &block.lines))?;
        trace!("paragraph at {}: {} kept lines, then {}", block.start, keep, split.type_name());

        let mut nodes = Vec::with_capacity(2);
        let keep = keep.min(block.lines.len());
        if keep > 0 {
            let cut = block.lines.get(keep).map_or(block.content.len(), |l| l.offset);
            let content = block.content[..cut].trim_end();
            let last = block.lines[keep - 1];
            let last_len = content.get(last.offset..).map_or(0, |t| t.trim_end().len());
            let end = Position::new(last.line, (last.column + last_len).saturating_sub(1));

            let mut para = Node::new(NodeValue::Paragraph).spanned(Span::new(block.start, end));
            parse_inlines(&mut para, content, block.lines[..keep].to_vec(), extensions);
            nodes.push(para);
        }

        split.walk_mut(&mut |n| {
            if n.value.holds_inlines() && !n.literal.is_empty() {
                let text = std::mem::take(&mut n.literal);
                let start = LineStart {
                    offset: 0,
                    line: n.span.start.line,
                    column: n.span.start.column,
                };
                parse_inlines(n, &text, vec![start], extensions);
            }
        });
        nodes.push(split);
        Some(nodes)
    }
}

fn parse_inlines(node: &mut Node, content: &str, lines: Vec<LineStart>, extensions: &[Arc<dyn SyntaxExtension>]) {
    InlineParser::new(Subject::with_lines(content, lines), extensions).parse(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Node {
        let mut parser = BlockParser::new();
        for line in text.lines() {
            parser.process_line(line);
        }
        parser.finish(&[])
    }

    fn kinds(node: &Node) -> Vec<&'static str> {
        node.children.iter().map(|c| c.type_name()).collect()
    }

    #[test]
    fn test_paragraphs() {
        let doc = parse("one\ntwo\n\nthree");
        assert_eq!(kinds(&doc), ["paragraph", "paragraph"]);
        assert_eq!(kinds(&doc.children[0]), ["text", "softbreak", "text"]);
        assert_eq!(doc.children[1].span.to_string(), "4:1-4:5");
    }

    #[test]
    fn test_headings() {
        let doc = parse("# Test #\nSub\n---");
        assert_eq!(kinds(&doc), ["heading", "heading"]);
        assert_eq!(doc.children[0].value, NodeValue::Heading(NodeHeading { level: 1, setext: false }));
        assert_eq!(doc.children[0].children[0].literal, "Test");
        assert_eq!(doc.children[1].value, NodeValue::Heading(NodeHeading { level: 2, setext: true }));
    }

    #[test]
    fn test_fenced_code() {
        let doc = parse("```rust\nfn main() {}\n\n```\nafter");
        assert_eq!(kinds(&doc), ["code_block", "paragraph"]);
        assert_eq!(doc.children[0].literal, "fn main() {}\n\n");
        match &doc.children[0].value {
            NodeValue::CodeBlock(code) => assert_eq!(code.info, "rust"),
            other => panic!("expected code block, got {other:?}"),
        }
        assert_eq!(doc.children[0].span.to_string(), "1:1-4:3");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let doc = parse("~~~\n$$x");
        assert_eq!(kinds(&doc), ["code_block"]);
        assert_eq!(doc.children[0].literal, "$$x\n");
    }

    #[test]
    fn test_indented_code() {
        let doc = parse("    a\n\n    b\n\n\npara");
        assert_eq!(kinds(&doc), ["code_block", "paragraph"]);
        assert_eq!(doc.children[0].literal, "a\n\nb\n");
    }

    #[test]
    fn test_block_quote_with_lazy_line() {
        let doc = parse("> a\nb\n\nc");
        assert_eq!(kinds(&doc), ["block_quote", "paragraph"]);
        let quote = &doc.children[0];
        assert_eq!(kinds(quote), ["paragraph"]);
        assert_eq!(kinds(&quote.children[0]), ["text", "softbreak", "text"]);
    }

    #[test]
    fn test_tight_and_loose_lists() {
        let doc = parse("* a\n* b\n\n1. x\n\n2. y");
        assert_eq!(kinds(&doc), ["list", "list"]);
        match (&doc.children[0].value, &doc.children[1].value) {
            (NodeValue::List(bullets), NodeValue::List(ordered)) => {
                assert!(bullets.tight);
                assert_eq!(bullets.bullet_char, b'*');
                assert!(!ordered.tight);
                assert_eq!(ordered.list_type, ListType::Ordered);
                assert_eq!(ordered.start, 1);
            }
            other => panic!("expected two lists, got {other:?}"),
        }
        assert_eq!(doc.children[0].children.len(), 2);
    }

    #[test]
    fn test_nested_list() {
        let doc = parse("- a\n  - b\n- c");
        let outer = &doc.children[0];
        assert_eq!(kinds(outer), ["item", "item"]);
        assert_eq!(kinds(&outer.children[0]), ["paragraph", "list"]);
    }

    #[test]
    fn test_changing_bullet_starts_new_list() {
        let doc = parse("- a\n+ b");
        assert_eq!(kinds(&doc), ["list", "list"]);
    }

    #[test]
    fn test_ordered_list_cannot_interrupt_paragraph_unless_one() {
        let doc = parse("text\n2. no\n1. yes");
        assert_eq!(kinds(&doc), ["paragraph", "list"]);
    }

    #[test]
    fn test_thematic_break() {
        let doc = parse("a\n\n***\n- - -");
        assert_eq!(kinds(&doc), ["paragraph", "thematic_break", "thematic_break"]);
    }

    #[test]
    fn test_tabs_expand() {
        assert_eq!(expand_tabs("\tx"), "    x");
        assert_eq!(expand_tabs("ab\tc"), "ab  c");
        let doc = parse("\tcode");
        assert_eq!(kinds(&doc), ["code_block"]);
        assert_eq!(doc.children[0].literal, "code\n");
    }

    #[test]
    fn test_html_blocks() {
        let doc = parse("<div>\n*a*\n\npara\n<!-- one\n\ntwo -->\nafter");
        assert_eq!(kinds(&doc), ["html_block", "paragraph", "html_block", "paragraph"]);
        assert_eq!(doc.children[0].literal, "<div>\n*a*\n");
        assert_eq!(doc.children[2].literal, "<!-- one\n\ntwo -->\n");
        assert_eq!(doc.children[3].text_content(), "after");
    }

    #[test]
    fn test_html_block_kind_seven_cannot_interrupt_paragraph() {
        let doc = parse("text\n<span>\n\n<span>\nx");
        assert_eq!(kinds(&doc), ["paragraph", "html_block"]);
        assert_eq!(doc.children[1].literal, "<span>\nx\n");
    }

    #[test]
    fn test_html_block_in_quote() {
        let doc = parse("> <pre>\n> a\n> </pre>\nb");
        assert_eq!(kinds(&doc), ["block_quote", "paragraph"]);
        assert_eq!(doc.children[0].children[0].literal, "<pre>\na\n</pre>\n");
    }

    struct Split;

    impl SyntaxExtension for Split {
        fn name(&self) -> &str {
            "split"
        }

        fn special_chars(&self) -> &[u8] {
            b""
        }

        fn split_paragraph(&self, content: &str, lines: &[LineStart]) -> Option<ParagraphSplit> {
            let keep = content.lines().position(|l| l == "%%")?;
            let mut cell = Node::with_literal(NodeValue::TableCell, "*x*");
            cell.span.start = Position::new(lines[keep].line, 1);
            let mut block = Node::new(NodeValue::BlockQuote);
            block.append(cell);
            Some(ParagraphSplit { keep, block })
        }

        fn postprocess(&self, doc: &mut Node) {
            doc.append(Node::new(NodeValue::ThematicBreak));
        }
    }

    #[test]
    fn test_split_paragraph_and_postprocess() {
        let mut parser = BlockParser::new();
        for line in ["a", "b  ", "%%", "c"] {
            parser.process_line(line);
        }
        let exts: Vec<Arc<dyn SyntaxExtension>> = vec![Arc::new(Split)];
        let doc = parser.finish(&exts);
        assert_eq!(kinds(&doc), ["paragraph", "block_quote", "thematic_break"]);

        let para = &doc.children[0];
        assert_eq!(para.text_content(), "a b");
        assert_eq!(para.span.to_string(), "1:1-2:1");

        let cell = &doc.children[1].children[0];
        assert!(cell.literal.is_empty());
        assert_eq!(kinds(cell), ["emph"]);
        assert_eq!(cell.children[0].span.start, Position::new(3, 1));
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("");
        assert!(doc.children.is_empty());
        assert_eq!(doc.value, NodeValue::Document);
    }
}
