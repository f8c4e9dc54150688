//! Line and inline scanners.
//!
//! Block-level scanners run on the text of a line starting at its first
//! non-space character. They return the length of what they matched, or
//! `None`.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// Block patterns
// =============================================================================

/// ATX heading opener: 1-6 `#` followed by a space or the end of the line
static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(?:[ \t]+|$)").unwrap());

/// Closing sequence of an ATX heading, including the spaces before it
static ATX_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[ \t]+)#+[ \t]*$").unwrap());

/// Backtick fence: the info string may not contain backticks
static BACKTICK_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,})([^`]*)$").unwrap());

/// Tilde fence
static TILDE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(~{3,})(.*)$").unwrap());

/// Closing fence
static CLOSING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,}|~{3,})[ \t]*$").unwrap());

/// Thematic break: three or more of the same `*`, `-` or `_`, spaces allowed
static THEMATIC_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// Setext underline
static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(=+|-+)[ \t]*$").unwrap());

/// Bullet list marker
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([*+-])(?:[ \t]|$)").unwrap());

/// Ordered list marker: at most nine digits
static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,9})([.)])(?:[ \t]|$)").unwrap());

/// HTML block openers, by kind. Kinds 1 to 5 end at a closing marker,
/// 6 and 7 at a blank line.
static HTML_BLOCK_START_RE: LazyLock<[Regex; 7]> = LazyLock::new(|| {
    [
        Regex::new(r"^<(?i:script|pre|style|textarea)(?:[ \t>]|$)").unwrap(),
        Regex::new(r"^<!--").unwrap(),
        Regex::new(r"^<\?").unwrap(),
        Regex::new(r"^<![A-Za-z]").unwrap(),
        Regex::new(r"^<!\[CDATA\[").unwrap(),
        Regex::new(&format!(r"^</?(?i:{BLOCK_TAGS})(?:[ \t]|/?>|$)")).unwrap(),
        Regex::new(&format!(r"^(?:{OPEN_TAG}|{CLOSING_TAG})[ \t]*$")).unwrap(),
    ]
});

/// Closing markers for HTML block kinds 1 to 5
static HTML_BLOCK_END_RE: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)</(?:script|pre|style|textarea)>").unwrap(),
        Regex::new(r"-->").unwrap(),
        Regex::new(r"\?>").unwrap(),
        Regex::new(r">").unwrap(),
        Regex::new(r"\]\]>").unwrap(),
    ]
});

const BLOCK_TAGS: &str = "address|article|aside|base|basefont|blockquote|body|caption|center|col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame|frameset|h1|h2|h3|h4|h5|h6|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody|td|tfoot|th|thead|title|tr|track|ul";

const OPEN_TAG: &str = r#"<[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*"))?)*\s*/?>"#;

const CLOSING_TAG: &str = r"</[A-Za-z][A-Za-z0-9-]*\s*>";

// =============================================================================
// Inline patterns
// =============================================================================

/// Raw inline HTML: a tag, comment, processing instruction, declaration
/// or CDATA section
static HTML_INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{OPEN_TAG}|{CLOSING_TAG}|<!---?>|<!--(?s:.)*?-->|<\?(?s:.)*?\?>|<![A-Za-z][^>]*>|<!\[CDATA\[(?s:.)*?\]\]>)"
    ))
    .unwrap()
});

/// URI autolink `<scheme:...>`
static URI_AUTOLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*)>").unwrap());

/// Email autolink `<user@host>`
static EMAIL_AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^<([a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*)>",
    )
    .unwrap()
});

/// Entity or numeric character reference
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

// =============================================================================
// Block scanners
// =============================================================================

/// A fence opener: the fence character, its run length and the info string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    pub fence_char: u8,
    pub length: usize,
    pub info: String,
}

/// Ordered or bullet list marker found at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet(u8),
    Ordered { start: usize, delim: u8 },
}

/// Heading level and the byte length of the opener (hashes plus spaces)
pub fn atx_heading(text: &str) -> Option<(u8, usize)> {
    let caps = ATX_HEADING_RE.captures(text)?;
    let level = caps.get(1)?.as_str().len() as u8;
    Some((level, caps.get(0)?.end()))
}

/// Heading text with the optional closing `#` sequence removed
pub fn strip_atx_closing(content: &str) -> &str {
    let trimmed = content.trim_end();
    match ATX_CLOSING_RE.find(trimmed) {
        Some(m) => trimmed[..m.start()].trim_end(),
        None => trimmed,
    }
}

pub fn fence_open(text: &str) -> Option<FenceOpen> {
    let caps = BACKTICK_FENCE_RE
        .captures(text)
        .or_else(|| TILDE_FENCE_RE.captures(text))?;
    let fence = caps.get(1)?.as_str();
    Some(FenceOpen {
        fence_char: fence.as_bytes()[0],
        length: fence.len(),
        info: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
    })
}

/// Whether `text` closes a fence opened with `fence_char` repeated `length` times
pub fn closes_fence(text: &str, fence_char: u8, length: usize) -> bool {
    match CLOSING_FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().as_bytes()[0] == fence_char && m.as_str().len() >= length,
        None => false,
    }
}

pub fn thematic_break(text: &str) -> bool {
    THEMATIC_BREAK_RE.is_match(text)
}

/// Setext heading level for an underline, 1 for `=`, 2 for `-`
pub fn setext_underline(text: &str) -> Option<u8> {
    let caps = SETEXT_RE.captures(text)?;
    match caps.get(1)?.as_str().as_bytes()[0] {
        b'=' => Some(1),
        _ => Some(2),
    }
}

/// A list marker and its byte width (without the following space)
pub fn list_marker(text: &str) -> Option<(ListMarker, usize)> {
    if let Some(caps) = BULLET_RE.captures(text) {
        let marker = caps.get(1)?.as_str().as_bytes()[0];
        return Some((ListMarker::Bullet(marker), 1));
    }
    let caps = ORDERED_RE.captures(text)?;
    let digits = caps.get(1)?.as_str();
    let delim = caps.get(2)?.as_str().as_bytes()[0];
    let start = digits.parse().ok()?;
    Some((ListMarker::Ordered { start, delim }, digits.len() + 1))
}

/// Kind (1 to 7) of an HTML block starting at the beginning of `text`.
/// Kind 7 cannot interrupt a paragraph.
pub fn html_block_start(text: &str, in_paragraph: bool) -> Option<u8> {
    let kinds = if in_paragraph { 6 } else { 7 };
    HTML_BLOCK_START_RE[..kinds]
        .iter()
        .position(|re| re.is_match(text))
        .map(|i| i as u8 + 1)
}

/// Whether `text` holds the closing marker of an HTML block of `kind`
pub fn html_block_end(text: &str, kind: u8) -> bool {
    match kind {
        1..=5 => HTML_BLOCK_END_RE[kind as usize - 1].is_match(text),
        _ => false,
    }
}

// =============================================================================
// Inline scanners
// =============================================================================

/// Autolink at the start of `text`: the target, whether it is an email
/// address, and the matched length including the angle brackets
pub fn autolink(text: &str) -> Option<(&str, bool, usize)> {
    if let Some(caps) = URI_AUTOLINK_RE.captures(text) {
        return Some((caps.get(1)?.as_str(), false, caps.get(0)?.end()));
    }
    let caps = EMAIL_AUTOLINK_RE.captures(text)?;
    Some((caps.get(1)?.as_str(), true, caps.get(0)?.end()))
}

/// Length of an entity reference at the start of `text`
pub fn entity(text: &str) -> Option<usize> {
    ENTITY_RE.find(text).map(|m| m.end())
}

/// Length of raw inline HTML at the start of `text`
pub fn html_tag(text: &str) -> Option<usize> {
    HTML_INLINE_RE.find(text).map(|m| m.end())
}
