//! `[ ]` and `[x]` task markers on list items.
//!
//! Runs after the document is built. A list item whose first paragraph
//! opens with a marker followed by whitespace becomes a task item, and
//! the marker is removed from the text. The marker is read from parsed
//! text, so escaped brackets (`\[x\]`) mark a task too.

use log::trace;
use texmark_core::{Node, NodeValue, SyntaxExtension};

#[derive(Debug, Clone, Copy, Default)]
pub struct TasklistExtension;

impl TasklistExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for TasklistExtension {
    fn name(&self) -> &str {
        "tasklist"
    }

    fn special_chars(&self) -> &[u8] {
        b""
    }

    fn postprocess(&self, doc: &mut Node) {
        doc.walk_mut(&mut |node| {
            if let NodeValue::Item(list) = node.value {
                if let Some(checked) = take_marker(node) {
                    trace!("task item at {} (checked: {checked})", node.span);
                    node.value = NodeValue::TaskItem { list, checked };
                }
            }
        });
    }
}

/// Marker state, if `text` starts with one.
fn marker(text: &str) -> Option<bool> {
    match text.get(..3)? {
        "[ ]" => Some(false),
        "[x]" | "[X]" => Some(true),
        _ => None,
    }
}

/// Strip the marker from the start of the item's first paragraph.
fn take_marker(item: &mut Node) -> Option<bool> {
    let para = item
        .children
        .first_mut()
        .filter(|child| child.value == NodeValue::Paragraph)?;
    let first = para.children.first().filter(|child| child.value == NodeValue::Text)?;
    let checked = marker(&first.literal)?;

    let rest = &first.literal[3..];
    if rest.is_empty() {
        // Marker alone on the first line
        let next = para.children.get(1)?;
        if !matches!(next.value, NodeValue::SoftBreak | NodeValue::LineBreak) {
            return None;
        }
        para.children.drain(..2);
        return Some(checked);
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }

    let kept = rest.trim_start_matches([' ', '\t']).to_string();
    let removed = first.literal.len() - kept.len();
    let text = &mut para.children[0];
    if kept.is_empty() {
        para.children.remove(0);
    } else {
        text.literal = kept;
        text.span.start.column += removed;
    }
    Some(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmark_core::NodeList;

    fn item(inlines: Vec<Node>) -> Node {
        let mut para = Node::new(NodeValue::Paragraph);
        for inline in inlines {
            para.append(inline);
        }
        let mut item = Node::new(NodeValue::Item(NodeList::default()));
        item.append(para);
        item
    }

    fn run(node: Node) -> Node {
        let mut doc = Node::new(NodeValue::Document);
        doc.append(node);
        TasklistExtension.postprocess(&mut doc);
        doc.children.remove(0)
    }

    #[test]
    fn test_marker() {
        assert_eq!(marker("[ ] a"), Some(false));
        assert_eq!(marker("[x]"), Some(true));
        assert_eq!(marker("[X] b"), Some(true));
        assert_eq!(marker("[y] b"), None);
        assert_eq!(marker("[]"), None);
    }

    #[test]
    fn test_checked_item() {
        let node = run(item(vec![Node::text("[x] done")]));
        assert!(matches!(node.value, NodeValue::TaskItem { checked: true, .. }));
        assert_eq!(node.children[0].children[0].literal, "done");
    }

    #[test]
    fn test_marker_span_moves() {
        let mut text = Node::text("[ ]  todo");
        text.span.start.column = 3;
        let node = run(item(vec![text]));
        assert!(matches!(node.value, NodeValue::TaskItem { checked: false, .. }));
        assert_eq!(node.children[0].children[0].span.start.column, 8);
    }

    #[test]
    fn test_marker_before_emphasis() {
        let mut emph = Node::new(NodeValue::Emph);
        emph.append(Node::text("x"));
        let node = run(item(vec![Node::text("[ ] "), emph]));
        assert!(matches!(node.value, NodeValue::TaskItem { .. }));
        let para = &node.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].value, NodeValue::Emph);
    }

    #[test]
    fn test_marker_then_line_break() {
        let node = run(item(vec![
            Node::text("[x]"),
            Node::new(NodeValue::SoftBreak),
            Node::text("next"),
        ]));
        assert!(matches!(node.value, NodeValue::TaskItem { checked: true, .. }));
        assert_eq!(node.children[0].text_content(), "next");
    }

    #[test]
    fn test_not_a_task() {
        for text in ["[x]done", "[x]", "x [ ] y", "[-] no"] {
            let node = run(item(vec![Node::text(text)]));
            assert!(matches!(node.value, NodeValue::Item(_)), "{text}");
            assert_eq!(node.children[0].children[0].literal, text);
        }
    }

    #[test]
    fn test_nested_items() {
        let mut list = Node::new(NodeValue::List(NodeList::default()));
        list.append(item(vec![Node::text("[x] inner")]));
        let mut outer = item(vec![Node::text("outer")]);
        outer.append(list);

        let node = run(outer);
        assert!(matches!(node.value, NodeValue::Item(_)));
        assert!(matches!(
            node.children[1].children[0].value,
            NodeValue::TaskItem { checked: true, .. }
        ));
    }
}
