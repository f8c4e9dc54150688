//! Bare URL autolinks.
//!
//! Recognizes `www.` hosts and `http://`, `https://` and `ftp://` URLs in
//! running text. The scheme of a URL has already been emitted as text by
//! the time its `:` is seen, so the scanner takes it back with
//! [`Node::unput`] before adding the link.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;
use texmark_core::{Node, NodeLink, NodeValue, Position, Span, Subject, SyntaxExtension};

/// Host names; the `www.` form requires at least one dot.
static DOMAIN_DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+").unwrap());

/// Host names after an explicit scheme, where `localhost` is fine.
static DOMAIN_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*").unwrap());

const SCHEMES: [&str; 3] = ["http", "https", "ftp"];

#[derive(Debug, Clone, Copy, Default)]
pub struct AutolinkExtension;

impl AutolinkExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for AutolinkExtension {
    fn name(&self) -> &str {
        "autolink"
    }

    fn special_chars(&self) -> &[u8] {
        b":w"
    }

    fn match_inline(&self, subject: &mut Subject<'_>, parent: &mut Node, c: u8) -> Option<Node> {
        match c {
            b':' => match_scheme(subject, parent),
            b'w' => match_www(subject),
            _ => None,
        }
    }
}

fn match_www(subject: &mut Subject<'_>) -> Option<Node> {
    if !subject.matches_at(0, b"www.") {
        return None;
    }
    let at_word_start = match subject.peek_relative(-1) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || matches!(b, b'*' | b'_' | b'~' | b'('),
    };
    if !at_word_start {
        return None;
    }

    let base = subject.offset();
    let rest = &subject.input()[base..];
    let domain = DOMAIN_DOTTED.find(rest)?.end();
    let end = link_end(rest, domain)?;
    let text = &rest[..end];

    let node = link_node(subject, format!("http://{text}"), text, base, base + end);
    subject.set_offset(base + end);
    debug!("autolink: {text}");
    Some(node)
}

fn match_scheme(subject: &mut Subject<'_>, parent: &mut Node) -> Option<Node> {
    if !subject.matches_at(0, b"://") {
        return None;
    }

    let base = subject.offset();
    let input = subject.input();
    let before = &input[..base];
    let scheme_len = before
        .bytes()
        .rev()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let scheme = &before[base - scheme_len..];
    if !SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }

    let rest = &input[base + 3..];
    let domain = DOMAIN_SHORT.find(rest)?.end();
    if domain == 0 {
        return None;
    }
    let end = link_end(rest, domain)?;

    if !parent.ends_with_text(scheme) {
        debug!("autolink: scheme {scheme} is not trailing text");
        return None;
    }
    parent.unput(scheme.len());

    let url = format!("{scheme}://{}", &rest[..end]);
    let stop = base + 3 + end;
    let node = link_node(subject, url.clone(), &url, base - scheme_len, stop);
    subject.set_offset(stop);
    debug!("autolink: {url}");
    Some(node)
}

/// Length of the link in `rest`, given that the host ends at `domain`.
///
/// The link runs to the next space, `<` or backslash escape, then loses
/// trailing punctuation, unbalanced closing parentheses and a trailing
/// entity-looking `&name;`.
fn link_end(rest: &str, domain: usize) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut end = rest[domain..]
        .char_indices()
        .find(|&(i, c)| {
            let escape = c == '\\'
                && bytes
                    .get(domain + i + 1)
                    .is_some_and(|b| b.is_ascii_punctuation());
            c.is_whitespace() || c == '<' || escape
        })
        .map_or(rest.len(), |(i, _)| domain + i);

    loop {
        let link = &rest[..end];
        match link.as_bytes().last() {
            Some(b'?' | b'!' | b'.' | b',' | b':' | b'*' | b'_' | b'~' | b'\'' | b'"') => end -= 1,
            Some(b')') => {
                let opens = link.matches('(').count();
                let closes = link.matches(')').count();
                if closes <= opens {
                    break;
                }
                end -= 1;
            }
            Some(b';') => {
                let Some(amp) = link.rfind('&') else { break };
                let name = &link[amp + 1..end - 1];
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    break;
                }
                end = amp;
            }
            _ => break,
        }
    }

    (end > 0).then_some(end)
}

fn link_node(subject: &Subject<'_>, url: String, text: &str, start: usize, stop: usize) -> Node {
    let span = Span::new(subject.position_at(start), inclusive_end(subject, start, stop));
    let mut link = Node::new(NodeValue::Link(NodeLink {
        url,
        title: String::new(),
    }))
    .spanned(span);
    link.append(Node::text(text).spanned(span));
    link
}

fn inclusive_end(subject: &Subject<'_>, start: usize, stop: usize) -> Position {
    subject.position_at(stop.saturating_sub(1).max(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_of(node: &Node) -> &str {
        match &node.value {
            NodeValue::Link(link) => &link.url,
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn test_www_link() {
        let mut subject = Subject::new("www.example.com/path. More");
        let node = AutolinkExtension
            .match_inline(&mut subject, &mut Node::new(NodeValue::Paragraph), b'w')
            .unwrap();
        assert_eq!(url_of(&node), "http://www.example.com/path");
        assert_eq!(node.text_content(), "www.example.com/path");
        assert_eq!(subject.offset(), 20);
    }

    #[test]
    fn test_www_needs_word_start() {
        let mut subject = Subject::new("awww.example.com");
        subject.set_offset(1);
        assert!(AutolinkExtension
            .match_inline(&mut subject, &mut Node::new(NodeValue::Paragraph), b'w')
            .is_none());
    }

    #[test]
    fn test_www_needs_a_dot_after_prefix() {
        let mut subject = Subject::new("www. nothing");
        assert!(AutolinkExtension
            .match_inline(&mut subject, &mut Node::new(NodeValue::Paragraph), b'w')
            .is_none());
    }

    #[test]
    fn test_scheme_link_reclaims_scheme() {
        let input = "see https://example.org/a_(b)) now";
        let mut subject = Subject::new(input);
        subject.set_offset(9);
        let mut parent = Node::new(NodeValue::Paragraph);
        parent.append(Node::text("see https"));

        let node = AutolinkExtension
            .match_inline(&mut subject, &mut parent, b':')
            .unwrap();
        assert_eq!(url_of(&node), "https://example.org/a_(b)");
        assert_eq!(parent.children[0].literal, "see ");
        assert_eq!(&input[subject.offset()..], ") now");
        assert_eq!(node.span.start, Position::new(1, 5));
    }

    #[test]
    fn test_unknown_scheme() {
        let mut subject = Subject::new("gopher://x.org");
        subject.set_offset(6);
        let mut parent = Node::new(NodeValue::Paragraph);
        parent.append(Node::text("gopher"));
        assert!(AutolinkExtension
            .match_inline(&mut subject, &mut parent, b':')
            .is_none());
        assert_eq!(parent.children[0].literal, "gopher");
    }

    #[test]
    fn test_scheme_must_be_text() {
        let mut subject = Subject::new("http://x.org");
        subject.set_offset(4);
        let mut parent = Node::new(NodeValue::Paragraph);
        parent.append(Node::new(NodeValue::Code));
        assert!(AutolinkExtension
            .match_inline(&mut subject, &mut parent, b':')
            .is_none());
        assert_eq!(subject.offset(), 4);
    }

    #[test]
    fn test_link_end_trimming() {
        assert_eq!(link_end("x.org/a.", 5), Some(7));
        assert_eq!(link_end("x.org/q?a=1&amp;", 5), Some(11));
        assert_eq!(link_end("x.org/(a)", 5), Some(9));
        assert_eq!(link_end("x.org<b>", 5), Some(5));
    }

    #[test]
    fn test_link_stops_at_escape() {
        assert_eq!(link_end("x.org\\<", 5), Some(5));
        assert_eq!(link_end("x.org/a\\!b", 5), Some(7));
        assert_eq!(link_end("x.org/a\\b", 5), Some(9));

        let mut subject = Subject::new("www.a.b\\< tail");
        let node = AutolinkExtension
            .match_inline(&mut subject, &mut Node::new(NodeValue::Paragraph), b'w')
            .unwrap();
        assert_eq!(node.text_content(), "www.a.b");
        assert_eq!(subject.offset(), 7);
    }
}
