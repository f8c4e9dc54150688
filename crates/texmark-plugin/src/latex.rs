//! LaTeX math extensions.
//!
//! Two inline scanners share this module:
//!
//! - `latex_block` matches `$$...$$` and is triggered by `$`.
//! - `latex_inline` matches `\\(...\\)` and is triggered by `(`. By the
//!   time the `(` is seen, the inline parser has already turned the
//!   escaped backslash pair in front of it into a one-character text node,
//!   so the scanner reclaims that character from the parent before adding
//!   its own node.
//!
//! Payloads are taken byte-for-byte and never escaped on output. There is
//! no nesting: the first closing delimiter ends the match.

use log::debug;
use texmark_core::{MathKind, Node, NodeValue, OutputFormat, RenderContext, Subject, SyntaxExtension};

/// Block math delimiter, both sides
const DOUBLE_DOLLAR: &[u8] = b"$$";

/// Escaped backslash pair that must precede the inline opener `(`
const INLINE_LEAD: &[u8] = b"\\\\";

/// Inline math closer
const INLINE_CLOSE: &[u8] = b"\\\\)";

/// `$$...$$` math.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexBlockExtension;

impl LatexBlockExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for LatexBlockExtension {
    fn name(&self) -> &str {
        MathKind::Block.name()
    }

    fn special_chars(&self) -> &[u8] {
        b"$"
    }

    fn match_inline(&self, subject: &mut Subject<'_>, _parent: &mut Node, c: u8) -> Option<Node> {
        if c != b'$' || !subject.matches_at(0, DOUBLE_DOLLAR) {
            return None;
        }

        let base = subject.offset();
        let mut k = 2;
        loop {
            subject.peek_at(base + k)?;
            if subject.matches_at(k as isize, DOUBLE_DOLLAR) {
                break;
            }
            k += 1;
        }

        let node = subject.literal_node(NodeValue::Math(MathKind::Block), base + 2, base + k);
        subject.set_offset(base + k + DOUBLE_DOLLAR.len());
        debug!("latex_block: {} payload bytes at {}", node.literal.len(), node.span);
        Some(node)
    }

    fn type_name(&self, node: &Node) -> Option<&'static str> {
        owned_kind(node, MathKind::Block).map(MathKind::name)
    }

    fn render(&self, format: OutputFormat, node: &Node, ctx: &mut RenderContext) -> bool {
        owned_kind(node, MathKind::Block).is_some_and(|kind| render_math(kind, format, node, ctx))
    }
}

/// `\\(...\\)` math.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexInlineExtension;

impl LatexInlineExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for LatexInlineExtension {
    fn name(&self) -> &str {
        MathKind::Inline.name()
    }

    fn special_chars(&self) -> &[u8] {
        b"("
    }

    fn match_inline(&self, subject: &mut Subject<'_>, parent: &mut Node, c: u8) -> Option<Node> {
        if c != b'(' || !subject.matches_at(-(INLINE_LEAD.len() as isize), INLINE_LEAD) {
            return None;
        }

        let base = subject.offset();
        let mut k = 1;
        loop {
            subject.peek_at(base + k)?;
            if subject.matches_at(k as isize, INLINE_CLOSE) {
                break;
            }
            k += 1;
        }

        // The escaped pair was emitted as a single `\` text node.
        if !parent.ends_with_text("\\") {
            debug!("latex_inline: no trailing backslash to reclaim at offset {base}");
            return None;
        }
        parent.unput(1);

        let node = subject.literal_node(NodeValue::Math(MathKind::Inline), base + 1, base + k);
        subject.set_offset(base + k + INLINE_CLOSE.len());
        debug!("latex_inline: {} payload bytes at {}", node.literal.len(), node.span);
        Some(node)
    }

    fn type_name(&self, node: &Node) -> Option<&'static str> {
        owned_kind(node, MathKind::Inline).map(MathKind::name)
    }

    fn render(&self, format: OutputFormat, node: &Node, ctx: &mut RenderContext) -> bool {
        owned_kind(node, MathKind::Inline).is_some_and(|kind| render_math(kind, format, node, ctx))
    }
}

fn owned_kind(node: &Node, kind: MathKind) -> Option<MathKind> {
    match node.value {
        NodeValue::Math(k) if k == kind => Some(k),
        _ => None,
    }
}

/// Write the delimiters for `format` around the literal. XML is left to
/// the generic renderer, which names the element after the type name.
fn render_math(kind: MathKind, format: OutputFormat, node: &Node, ctx: &mut RenderContext) -> bool {
    let (open, close) = match (format, kind) {
        (OutputFormat::Html, _) => {
            ctx.write(&format!("<latex class=\"{}\">", kind.class()));
            ctx.write(&node.literal);
            ctx.write("</latex>");
            return true;
        }
        (OutputFormat::Latex, MathKind::Block) => ("\\[", "\\]"),
        (OutputFormat::Latex, MathKind::Inline) => ("\\(", "\\)"),
        (OutputFormat::CommonMark, MathKind::Block) => ("$$", "$$"),
        (OutputFormat::CommonMark, MathKind::Inline) => ("\\\\(", "\\\\)"),
        (OutputFormat::Xml, _) => return false,
    };
    ctx.write(open);
    ctx.write(&node.literal);
    ctx.write(close);
    true
}
