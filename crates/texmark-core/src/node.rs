//! The document tree.
//!
//! Every node owns its literal text and its children. Node kinds form a
//! closed enum so renderers and extensions dispatch with `match` rather
//! than by comparing type-name strings.

use crate::enums::{ListDelim, ListType, MathKind};
use crate::types::Span;

/// List and list item attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeList {
    /// Bullet or ordered
    pub list_type: ListType,
    /// `.` or `)` for ordered lists
    pub delim: ListDelim,
    /// First number of an ordered list
    pub start: usize,
    /// Bullet character for bullet lists
    pub bullet_char: u8,
    /// Whether items are separated without blank lines
    pub tight: bool,
    /// Column of the marker relative to the container
    pub marker_offset: usize,
    /// Marker width plus the spaces after it
    pub padding: usize,
}

/// Code block attributes; the code itself lives in [`Node::literal`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeCodeBlock {
    /// Fenced or indented
    pub fenced: bool,
    /// `` ` `` or `~`
    pub fence_char: u8,
    /// Length of the opening fence
    pub fence_length: usize,
    /// Indentation of the opening fence
    pub fence_offset: usize,
    /// Info string after the opening fence
    pub info: String,
}

/// Heading attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeHeading {
    /// 1 to 6
    pub level: u8,
    /// Underlined with `=` or `-`
    pub setext: bool,
}

/// Link or image target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeLink {
    pub url: String,
    pub title: String,
}

/// Column alignment from a table's delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl TableAlignment {
    /// Attribute value, `None` for unaligned columns
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            TableAlignment::None => None,
            TableAlignment::Left => Some("left"),
            TableAlignment::Center => Some("center"),
            TableAlignment::Right => Some("right"),
        }
    }
}

/// Kind of a node, with the attributes that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Document,
    BlockQuote,
    List(NodeList),
    Item(NodeList),
    /// List item opened with `[ ]` or `[x]`, from the `tasklist` extension
    TaskItem { list: NodeList, checked: bool },
    CodeBlock(NodeCodeBlock),
    /// Raw HTML block; the markup is in the literal
    HtmlBlock,
    Heading(NodeHeading),
    ThematicBreak,
    Paragraph,
    /// Table from the `table` extension, one alignment per column
    Table(Vec<TableAlignment>),
    /// `true` for the header row
    TableRow(bool),
    TableCell,
    Text,
    SoftBreak,
    LineBreak,
    Code,
    HtmlInline,
    Emph,
    Strong,
    Strikethrough,
    Link(NodeLink),
    Image(NodeLink),
    /// Math produced by the `latex_block` / `latex_inline` extensions
    Math(MathKind),
}

impl NodeValue {
    /// Generic type name, as used for XML element names.
    ///
    /// Math nodes are code-like literals; extensions that own them report
    /// a more specific name through their type-name resolver.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeValue::Document => "document",
            NodeValue::BlockQuote => "block_quote",
            NodeValue::List(_) => "list",
            NodeValue::Item(_) => "item",
            NodeValue::TaskItem { .. } => "tasklist",
            NodeValue::CodeBlock(_) => "code_block",
            NodeValue::HtmlBlock => "html_block",
            NodeValue::Heading(_) => "heading",
            NodeValue::ThematicBreak => "thematic_break",
            NodeValue::Paragraph => "paragraph",
            NodeValue::Table(_) => "table",
            NodeValue::TableRow(true) => "table_header",
            NodeValue::TableRow(false) => "table_row",
            NodeValue::TableCell => "table_cell",
            NodeValue::Text => "text",
            NodeValue::SoftBreak => "softbreak",
            NodeValue::LineBreak => "linebreak",
            NodeValue::Code | NodeValue::Math(_) => "code",
            NodeValue::HtmlInline => "html_inline",
            NodeValue::Emph => "emph",
            NodeValue::Strong => "strong",
            NodeValue::Strikethrough => "strikethrough",
            NodeValue::Link(_) => "link",
            NodeValue::Image(_) => "image",
        }
    }

    /// Whether this is a block-level kind
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeValue::Document
                | NodeValue::BlockQuote
                | NodeValue::List(_)
                | NodeValue::Item(_)
                | NodeValue::TaskItem { .. }
                | NodeValue::CodeBlock(_)
                | NodeValue::HtmlBlock
                | NodeValue::Heading(_)
                | NodeValue::ThematicBreak
                | NodeValue::Paragraph
                | NodeValue::Table(_)
                | NodeValue::TableRow(_)
                | NodeValue::TableCell
        )
    }

    /// Whether nodes of this kind carry their content in `literal`
    pub fn has_literal(&self) -> bool {
        matches!(
            self,
            NodeValue::Text
                | NodeValue::Code
                | NodeValue::CodeBlock(_)
                | NodeValue::HtmlBlock
                | NodeValue::HtmlInline
                | NodeValue::Math(_)
        )
    }

    /// Whether the children of this kind are inline content
    pub fn holds_inlines(&self) -> bool {
        matches!(
            self,
            NodeValue::Paragraph | NodeValue::Heading(_) | NodeValue::TableCell
        )
    }

    /// List attributes of a plain or task list item
    pub fn item_list(&self) -> Option<&NodeList> {
        match self {
            NodeValue::Item(list) | NodeValue::TaskItem { list, .. } => Some(list),
            _ => None,
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub value: NodeValue,
    /// Owned text payload; empty for container kinds
    pub literal: String,
    pub span: Span,
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node of the given kind
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            literal: String::new(),
            span: Span::default(),
            children: Vec::new(),
        }
    }

    /// Create a node carrying a literal
    pub fn with_literal(value: NodeValue, literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            ..Self::new(value)
        }
    }

    /// Create a text node
    pub fn text(literal: impl Into<String>) -> Self {
        Self::with_literal(NodeValue::Text, literal)
    }

    /// Builder-style span setter
    pub fn spanned(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Generic type name of this node
    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    /// Append a child at the end
    pub fn append(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    pub fn last_child_mut(&mut self) -> Option<&mut Node> {
        self.children.last_mut()
    }

    /// Detach and return the last child
    pub fn pop_child(&mut self) -> Option<Node> {
        self.children.pop()
    }

    /// Whether the last child is a text node whose literal ends with `suffix`.
    pub fn ends_with_text(&self, suffix: &str) -> bool {
        match self.last_child() {
            Some(child) if child.value == NodeValue::Text => child.literal.ends_with(suffix),
            _ => false,
        }
    }

    /// Reclaim the last `n` bytes of text emitted into this node.
    ///
    /// Walks the trailing text children from the end, shortening each in
    /// turn until `n` bytes are gone or a non-text child is reached. Every
    /// child left with an empty literal is removed. A survivor that was
    /// only shortened stays in place with its end column moved back.
    ///
    /// Cuts never split a UTF-8 sequence: if the boundary falls inside a
    /// character, the whole character goes. Returns the number of bytes
    /// actually removed.
    pub fn unput(&mut self, n: usize) -> usize {
        let mut remaining = n;
        let mut removed = 0;

        while remaining > 0 {
            let Some(last) = self.children.last_mut() else {
                break;
            };
            if last.value != NodeValue::Text {
                break;
            }

            let len = last.literal.len();
            if len <= remaining {
                remaining -= len;
                removed += len;
                self.children.pop();
                continue;
            }

            let mut keep = len - remaining;
            while !last.literal.is_char_boundary(keep) {
                keep -= 1;
            }
            let cut = len - keep;
            last.literal.truncate(keep);
            last.span.end.column = last.span.end.column.saturating_sub(cut);
            removed += cut;
            remaining = 0;
        }

        // A text child emptied earlier (e.g. by an escape) is dropped too.
        while matches!(self.children.last(), Some(c) if c.value == NodeValue::Text && c.literal.is_empty())
        {
            self.children.pop();
        }

        removed
    }

    /// Concatenated text of all descendant literals, with breaks as spaces.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.value {
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ if self.value.has_literal() => out.push_str(&self.literal),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Merge adjacent text siblings throughout the subtree.
    pub fn consolidate_text(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.children.len());
        for mut child in self.children.drain(..) {
            child.consolidate_text();
            match merged.last_mut() {
                Some(prev) if prev.value == NodeValue::Text && child.value == NodeValue::Text => {
                    prev.literal.push_str(&child.literal);
                    if child.span.end.line != 0 {
                        prev.span.end = child.span.end;
                    }
                }
                _ if child.value == NodeValue::Text && child.literal.is_empty() => {}
                _ => merged.push(child),
            }
        }
        self.children = merged;
    }

    /// Depth-first iterator over this node and its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Call `f` on this node and every descendant, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

/// Pre-order traversal returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn paragraph(children: Vec<Node>) -> Node {
        let mut p = Node::new(NodeValue::Paragraph);
        p.children = children;
        p
    }

    #[test]
    fn test_unput_shortens_last_text() {
        let mut p = paragraph(vec![Node::text("x\\").spanned(Span::new(
            Position::new(1, 1),
            Position::new(1, 2),
        ))]);
        assert_eq!(p.unput(1), 1);
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].literal, "x");
        assert_eq!(p.children[0].span.end.column, 1);
    }

    #[test]
    fn test_unput_removes_emptied_child() {
        let mut p = paragraph(vec![Node::text("x"), Node::text("\\")]);
        assert_eq!(p.unput(1), 1);
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].literal, "x");
    }

    #[test]
    fn test_unput_spans_several_children() {
        let mut p = paragraph(vec![Node::text("ab"), Node::text("ht"), Node::text("tp")]);
        assert_eq!(p.unput(4), 4);
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].literal, "ab");
    }

    #[test]
    fn test_unput_stops_at_non_text() {
        let mut p = paragraph(vec![Node::new(NodeValue::Emph), Node::text("a")]);
        assert_eq!(p.unput(3), 1);
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].value, NodeValue::Emph);
    }

    #[test]
    fn test_unput_on_empty_parent() {
        let mut p = paragraph(Vec::new());
        assert_eq!(p.unput(1), 0);
        assert!(p.children.is_empty());
    }

    #[test]
    fn test_unput_keeps_utf8_intact() {
        let mut p = paragraph(vec![Node::text("é")]);
        assert_eq!(p.unput(1), 2);
        assert!(p.children.is_empty());
    }

    #[test]
    fn test_ends_with_text() {
        let p = paragraph(vec![Node::text("a\\")]);
        assert!(p.ends_with_text("\\"));
        assert!(!p.ends_with_text("b"));
        let q = paragraph(vec![Node::text("a\\"), Node::new(NodeValue::SoftBreak)]);
        assert!(!q.ends_with_text("\\"));
    }

    #[test]
    fn test_consolidate_text() {
        let mut emph = Node::new(NodeValue::Emph);
        emph.children = vec![Node::text("c"), Node::text("d")];
        let mut p = paragraph(vec![Node::text("a"), Node::text(""), Node::text("b"), emph]);
        p.consolidate_text();
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0].literal, "ab");
        assert_eq!(p.children[1].children[0].literal, "cd");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Node::new(NodeValue::Math(MathKind::Block)).type_name(), "code");
        assert_eq!(Node::new(NodeValue::BlockQuote).type_name(), "block_quote");
        assert!(NodeValue::Paragraph.is_block());
        assert!(!NodeValue::Math(MathKind::Inline).is_block());
    }

    #[test]
    fn test_table_and_task_names() {
        assert_eq!(NodeValue::TableRow(true).type_name(), "table_header");
        assert_eq!(NodeValue::TableRow(false).type_name(), "table_row");
        let task = NodeValue::TaskItem {
            list: NodeList::default(),
            checked: true,
        };
        assert_eq!(task.type_name(), "tasklist");
        assert!(task.is_block());
        assert!(task.item_list().is_some());
        assert!(NodeValue::TableCell.holds_inlines());
        assert!(NodeValue::HtmlInline.has_literal());
        assert_eq!(TableAlignment::Center.as_str(), Some("center"));
        assert_eq!(TableAlignment::None.as_str(), None);
    }

    #[test]
    fn test_walk_mut_visits_every_node() {
        let mut emph = Node::new(NodeValue::Emph);
        emph.append(Node::text("b"));
        let mut p = paragraph(vec![Node::text("a"), emph]);
        p.walk_mut(&mut |n| {
            if n.value == NodeValue::Text {
                n.literal.make_ascii_uppercase();
            }
        });
        assert_eq!(p.text_content(), "AB");
    }

    #[test]
    fn test_descendants_preorder() {
        let mut emph = Node::new(NodeValue::Emph);
        emph.append(Node::text("b"));
        let p = paragraph(vec![Node::text("a"), emph, Node::text("c")]);
        let kinds: Vec<_> = p.descendants().map(|n| n.type_name()).collect();
        assert_eq!(kinds, ["paragraph", "text", "emph", "text", "text"]);
        assert_eq!(p.text_content(), "abc");
    }
}
