//! Neutralises a fixed set of HTML tags in raw HTML output.
//!
//! Raw HTML only reaches HTML output when [`Options::UNSAFE`] is set;
//! without it the renderer already replaces it with a placeholder. With
//! it, this extension renders the raw markup itself and turns the `<` of
//! each filtered tag into `&lt;`.

use regex::Regex;
use std::sync::LazyLock;
use texmark_core::{Node, NodeValue, Options, OutputFormat, RenderContext, SyntaxExtension};

static FILTERED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<(/?(?:title|textarea|style|xmp|iframe|noembed|noframes|script|plaintext)(?:[\t\n\x0c\r >]|/>))",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct TagfilterExtension;

impl TagfilterExtension {
    pub fn new() -> Self {
        Self
    }
}

/// Escape the opening `<` of every filtered tag in `html`.
pub fn filter_tags(html: &str) -> std::borrow::Cow<'_, str> {
    FILTERED_TAG.replace_all(html, "&lt;$1")
}

impl SyntaxExtension for TagfilterExtension {
    fn name(&self) -> &str {
        "tagfilter"
    }

    fn special_chars(&self) -> &[u8] {
        b""
    }

    fn render(&self, format: OutputFormat, node: &Node, ctx: &mut RenderContext) -> bool {
        if format != OutputFormat::Html || !ctx.options().contains(Options::UNSAFE) {
            return false;
        }
        match node.value {
            NodeValue::HtmlBlock => {
                ctx.cr();
                ctx.write(&filter_tags(&node.literal));
                ctx.cr();
                true
            }
            NodeValue::HtmlInline => {
                ctx.write(&filter_tags(&node.literal));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_tags() {
        assert_eq!(filter_tags("<script>x</script>"), "&lt;script>x&lt;/script>");
        assert_eq!(filter_tags("<TITLE >"), "&lt;TITLE >");
        assert_eq!(filter_tags("<xmp/>"), "&lt;xmp/>");
        assert_eq!(filter_tags("<em><strong>"), "<em><strong>");
        assert_eq!(filter_tags("<scripts>"), "<scripts>");
    }

    #[test]
    fn test_renders_only_unsafe_html() {
        let ext = TagfilterExtension::new();
        let block = Node::with_literal(NodeValue::HtmlBlock, "<style>p{}</style>\n");

        let mut ctx = RenderContext::new(Options::DEFAULT);
        assert!(!ext.render(OutputFormat::Html, &block, &mut ctx));

        let mut ctx = RenderContext::new(Options::UNSAFE);
        assert!(!ext.render(OutputFormat::Xml, &block, &mut ctx));
        assert!(ext.render(OutputFormat::Html, &block, &mut ctx));
        assert_eq!(ctx.as_str(), "&lt;style>p{}&lt;/style>\n");
    }

    #[test]
    fn test_inline_html() {
        let ext = TagfilterExtension::new();
        let inline = Node::with_literal(NodeValue::HtmlInline, "<iframe src=\"x\">");
        let mut ctx = RenderContext::new(Options::UNSAFE);
        assert!(ext.render(OutputFormat::Html, &inline, &mut ctx));
        assert_eq!(ctx.as_str(), "&lt;iframe src=\"x\">");
    }
}
