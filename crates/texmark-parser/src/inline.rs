//! Inline parsing.
//!
//! The [`InlineParser`] walks the [`Subject`] of one leaf block and
//! appends inline nodes to it as a flat child list. Emphasis and link
//! openers are remembered on two stacks that point into that list; they
//! are resolved when a closing bracket is seen or at the end of input,
//! wrapping the nodes between opener and closer.
//!
//! Bytes the core grammar does not handle but an attached extension
//! claims are offered to that extension, together with the parent node so
//! it can repair text already emitted.

use log::{debug, warn};
use std::sync::Arc;
use texmark_core::{Node, NodeLink, NodeValue, Span, Subject, SyntaxExtension};

use crate::entities;
use crate::scanners;

/// Bytes the core inline grammar handles itself.
pub const CORE_SPECIAL_CHARS: &[u8] = b"\n\\`*_&<[]!";

/// An emphasis-style delimiter run awaiting a partner.
#[derive(Debug, Clone, Copy)]
struct Delimiter {
    /// Index of the run's text node in the parent
    index: usize,
    ch: u8,
    /// Delimiter bytes not yet consumed
    length: usize,
    original_length: usize,
    can_open: bool,
    can_close: bool,
    /// Owning extension for extension delimiters
    extension: Option<usize>,
}

/// An open `[` or `![`.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    index: usize,
    image: bool,
    active: bool,
    /// Delimiter stack height when the bracket was pushed
    delimiter_bottom: usize,
}

/// Parser for the inline content of one paragraph or heading.
pub struct InlineParser<'a, 'e> {
    subject: Subject<'a>,
    extensions: &'e [Arc<dyn SyntaxExtension>],
    special: [bool; 256],
    delimiters: Vec<Delimiter>,
    brackets: Vec<Bracket>,
}

impl<'a, 'e> InlineParser<'a, 'e> {
    pub fn new(subject: Subject<'a>, extensions: &'e [Arc<dyn SyntaxExtension>]) -> Self {
        let mut special = [false; 256];
        for &b in CORE_SPECIAL_CHARS {
            special[b as usize] = true;
        }
        for ext in extensions {
            for &b in ext.special_chars() {
                if b.is_ascii() {
                    special[b as usize] = true;
                }
            }
        }
        Self {
            subject,
            extensions,
            special,
            delimiters: Vec::new(),
            brackets: Vec::new(),
        }
    }

    /// Parse the whole subject, appending the result to `parent`.
    pub fn parse(mut self, parent: &mut Node) {
        while let Some(c) = self.subject.peek() {
            match c {
                b'\n' => self.handle_newline(parent),
                b'\\' => self.handle_backslash(parent),
                b'`' => self.handle_backticks(parent),
                b'*' | b'_' => self.handle_delimiter_run(parent, c, None),
                b'&' => self.handle_entity(parent),
                b'<' => self.handle_pointy(parent),
                b'[' => self.handle_open_bracket(parent, false),
                b'!' => self.handle_bang(parent),
                b']' => self.handle_close_bracket(parent),
                _ if self.special[c as usize] => self.handle_extension(parent, c),
                _ => self.handle_text(parent),
            }
        }

        self.process_emphasis(parent, 0);
        parent.consolidate_text();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(
            self.subject.position_at(start),
            self.subject.position_at(end.saturating_sub(1).max(start)),
        )
    }

    fn push_text(&mut self, parent: &mut Node, start: usize, end: usize) {
        let literal = &self.subject.input()[start..end];
        parent.append(Node::text(literal).spanned(self.span(start, end)));
    }

    fn skip_spaces(&mut self) {
        while self.subject.peek() == Some(b' ') {
            self.subject.advance(1);
        }
    }

    /// Drop stack entries that point past the end of the child list
    fn prune_stacks(&mut self, parent: &Node) {
        let len = parent.children.len();
        self.delimiters.retain(|d| d.index < len);
        self.brackets.retain(|b| b.index < len);
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    fn handle_text(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        let mut end = start;
        while let Some(b) = self.subject.peek_at(end) {
            if self.special[b as usize] {
                break;
            }
            end += 1;
        }
        self.subject.set_offset(end);
        self.push_text(parent, start, end);
    }

    fn handle_newline(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        self.subject.advance(1);

        let mut trailing = 0;
        if let Some(last) = parent.last_child_mut() {
            if last.value == NodeValue::Text {
                let trimmed = last.literal.trim_end_matches(' ').len();
                trailing = last.literal.len() - trimmed;
                last.literal.truncate(trimmed);
                last.span.end.column = last.span.end.column.saturating_sub(trailing);
                if last.literal.is_empty() {
                    parent.pop_child();
                    self.prune_stacks(parent);
                }
            }
        }

        let value = if trailing >= 2 {
            NodeValue::LineBreak
        } else {
            NodeValue::SoftBreak
        };
        parent.append(Node::new(value).spanned(self.span(start, start + 1)));
        self.skip_spaces();
    }

    fn handle_backslash(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        self.subject.advance(1);
        match self.subject.peek() {
            Some(b'\n') => {
                self.subject.advance(1);
                parent.append(Node::new(NodeValue::LineBreak).spanned(self.span(start, start + 2)));
                self.skip_spaces();
            }
            Some(c) if c.is_ascii_punctuation() => {
                self.subject.advance(1);
                parent.append(Node::text((c as char).to_string()).spanned(self.span(start, start + 2)));
            }
            _ => self.push_text(parent, start, start + 1),
        }
    }

    fn handle_backticks(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        let mut after = start;
        while self.subject.peek_at(after) == Some(b'`') {
            after += 1;
        }
        let n = after - start;

        let mut pos = after;
        let mut close = None;
        while pos < self.subject.len() {
            if self.subject.peek_at(pos) != Some(b'`') {
                pos += 1;
                continue;
            }
            let run_start = pos;
            while self.subject.peek_at(pos) == Some(b'`') {
                pos += 1;
            }
            if pos - run_start == n {
                close = Some(run_start);
                break;
            }
        }

        let Some(close) = close else {
            self.subject.set_offset(after);
            self.push_text(parent, start, after);
            return;
        };

        let mut content = self.subject.input()[after..close].replace('\n', " ");
        if content.len() >= 2
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.bytes().all(|b| b == b' ')
        {
            content = content[1..content.len() - 1].to_string();
        }
        self.subject.set_offset(close + n);
        parent.append(Node::with_literal(NodeValue::Code, content).spanned(self.span(start, close + n)));
    }

    /// Scan a run of `c` and push it as text, remembering it as a
    /// delimiter when it can open or close.
    fn handle_delimiter_run(&mut self, parent: &mut Node, c: u8, extension: Option<usize>) {
        let start = self.subject.offset();
        let mut end = start;
        while self.subject.peek_at(end) == Some(c) {
            end += 1;
        }
        self.subject.set_offset(end);

        let input = self.subject.input();
        let before = input[..start].chars().next_back().unwrap_or('\n');
        let after = input[end..].chars().next().unwrap_or('\n');

        let left_flanking = !after.is_whitespace()
            && (!is_punctuation(after) || before.is_whitespace() || is_punctuation(before));
        let right_flanking = !before.is_whitespace()
            && (!is_punctuation(before) || after.is_whitespace() || is_punctuation(after));

        let (can_open, can_close) = if c == b'_' {
            (
                left_flanking && (!right_flanking || is_punctuation(before)),
                right_flanking && (!left_flanking || is_punctuation(after)),
            )
        } else {
            (left_flanking, right_flanking)
        };

        self.push_text(parent, start, end);
        if can_open || can_close {
            self.delimiters.push(Delimiter {
                index: parent.children.len() - 1,
                ch: c,
                length: end - start,
                original_length: end - start,
                can_open,
                can_close,
                extension,
            });
        }
    }

    fn handle_entity(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        let rest = &self.subject.input()[start..];
        let decoded = scanners::entity(rest)
            .and_then(|len| entities::decode_entity(&rest[..len]).map(|text| (text, len)));

        match decoded {
            Some((text, len)) => {
                self.subject.advance(len);
                parent.append(Node::text(text).spanned(self.span(start, start + len)));
            }
            None => {
                self.subject.advance(1);
                self.push_text(parent, start, start + 1);
            }
        }
    }

    /// `<` opens an autolink, raw HTML, or nothing.
    fn handle_pointy(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        let rest = &self.subject.input()[start..];
        let Some((target, email, len)) = scanners::autolink(rest) else {
            let len = scanners::html_tag(rest).unwrap_or(0);
            if len == 0 {
                self.subject.advance(1);
                self.push_text(parent, start, start + 1);
            } else {
                self.subject.advance(len);
                let html = Node::with_literal(NodeValue::HtmlInline, &rest[..len]);
                parent.append(html.spanned(self.span(start, start + len)));
            }
            return;
        };

        let url = if email {
            format!("mailto:{target}")
        } else {
            target.to_string()
        };
        let mut link = Node::new(NodeValue::Link(NodeLink {
            url,
            title: String::new(),
        }))
        .spanned(self.span(start, start + len));
        link.append(Node::text(target).spanned(self.span(start + 1, start + len - 1)));
        self.subject.advance(len);
        parent.append(link);
    }

    fn handle_open_bracket(&mut self, parent: &mut Node, image: bool) {
        let start = self.subject.offset();
        let len = if image { 2 } else { 1 };
        self.subject.advance(len);
        self.push_text(parent, start, start + len);
        self.brackets.push(Bracket {
            index: parent.children.len() - 1,
            image,
            active: true,
            delimiter_bottom: self.delimiters.len(),
        });
    }

    fn handle_bang(&mut self, parent: &mut Node) {
        if self.subject.peek_relative(1) == Some(b'[') {
            self.handle_open_bracket(parent, true);
        } else {
            let start = self.subject.offset();
            self.subject.advance(1);
            self.push_text(parent, start, start + 1);
        }
    }

    fn handle_close_bracket(&mut self, parent: &mut Node) {
        let start = self.subject.offset();
        self.subject.advance(1);

        let Some(opener) = self.brackets.last().copied() else {
            self.push_text(parent, start, start + 1);
            return;
        };
        if !opener.active {
            self.brackets.pop();
            self.push_text(parent, start, start + 1);
            return;
        }

        let Some((url, title)) = self.parse_link_target() else {
            self.brackets.pop();
            self.push_text(parent, start, start + 1);
            return;
        };

        self.process_emphasis(parent, opener.delimiter_bottom);

        let target = NodeLink { url, title };
        let value = if opener.image {
            NodeValue::Image(target)
        } else {
            NodeValue::Link(target)
        };
        let mut node = Node::new(value);
        node.children = parent.children.drain(opener.index + 1..).collect();
        if let Some(bracket_text) = parent.pop_child() {
            node.span = Span::new(
                bracket_text.span.start,
                self.subject.position_at(self.subject.offset().saturating_sub(1)),
            );
        }
        parent.append(node);
        self.brackets.pop();

        // Links may not contain other links.
        if !opener.image {
            for bracket in self.brackets.iter_mut().filter(|b| !b.image) {
                bracket.active = false;
            }
        }
    }

    /// Parse `(destination "title")` after a closing bracket.
    ///
    /// Leaves the offset after the `)` on success and unchanged on failure.
    fn parse_link_target(&mut self) -> Option<(String, String)> {
        let saved = self.subject.offset();
        let result = self.scan_link_target();
        if result.is_none() {
            self.subject.set_offset(saved);
        }
        result
    }

    fn scan_link_target(&mut self) -> Option<(String, String)> {
        if self.subject.peek()? != b'(' {
            return None;
        }
        self.subject.advance(1);
        self.skip_link_whitespace();

        let input = self.subject.input();
        let dest_start = self.subject.offset();
        let dest = if self.subject.peek() == Some(b'<') {
            let mut pos = dest_start + 1;
            loop {
                match self.subject.peek_at(pos)? {
                    b'>' => break,
                    b'\n' | b'<' => return None,
                    b'\\' => pos += 2,
                    _ => pos += 1,
                }
            }
            self.subject.set_offset(pos + 1);
            input.get(dest_start + 1..pos)?
        } else {
            let mut pos = dest_start;
            let mut depth = 0usize;
            while let Some(b) = self.subject.peek_at(pos) {
                match b {
                    b'\\' if self.subject.peek_at(pos + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                        pos += 2;
                        continue;
                    }
                    b'(' => depth += 1,
                    b')' if depth == 0 => break,
                    b')' => depth -= 1,
                    b if b <= b' ' => break,
                    _ => {}
                }
                pos += 1;
            }
            if depth != 0 {
                return None;
            }
            self.subject.set_offset(pos);
            input.get(dest_start..pos)?
        };

        let before_title = self.subject.offset();
        self.skip_link_whitespace();
        let mut title = "";
        if self.subject.offset() > before_title {
            if let Some(open) = self.subject.peek() {
                let close = match open {
                    b'"' => Some(b'"'),
                    b'\'' => Some(b'\''),
                    b'(' => Some(b')'),
                    _ => None,
                };
                if let Some(close) = close {
                    let title_start = self.subject.offset() + 1;
                    let mut pos = title_start;
                    loop {
                        match self.subject.peek_at(pos)? {
                            b'\\' => pos += 2,
                            b if b == close => break,
                            _ => pos += 1,
                        }
                    }
                    title = input.get(title_start..pos)?;
                    self.subject.set_offset(pos + 1);
                    self.skip_link_whitespace();
                }
            }
        }

        if self.subject.peek()? != b')' {
            return None;
        }
        self.subject.advance(1);
        Some((entities::unescape(dest), entities::unescape(title)))
    }

    fn skip_link_whitespace(&mut self) {
        while matches!(self.subject.peek(), Some(b' ' | b'\t' | b'\n')) {
            self.subject.advance(1);
        }
    }

    fn handle_extension(&mut self, parent: &mut Node, c: u8) {
        let start = self.subject.offset();
        let extensions = self.extensions;

        for ext in extensions.iter().filter(|e| e.special_chars().contains(&c)) {
            if let Some(node) = ext.match_inline(&mut self.subject, parent, c) {
                if self.subject.offset() <= start {
                    warn!("extension {} matched without consuming input", ext.name());
                    self.subject.set_offset(start + 1);
                }
                debug!(
                    "{} matched {}..{} ({} bytes)",
                    ext.name(),
                    start,
                    self.subject.offset(),
                    node.literal.len()
                );
                self.prune_stacks(parent);
                parent.append(node);
                return;
            }
            self.subject.set_offset(start);
        }

        match extensions
            .iter()
            .position(|e| e.emphasis() && e.special_chars().contains(&c))
        {
            Some(idx) => self.handle_delimiter_run(parent, c, Some(idx)),
            None => {
                let len = self.subject.input()[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.subject.advance(len);
                self.push_text(parent, start, start + len);
            }
        }
    }

    // =========================================================================
    // Emphasis
    // =========================================================================

    /// Pair delimiters above `bottom` and wrap what lies between them.
    fn process_emphasis(&mut self, parent: &mut Node, bottom: usize) {
        let mut i = bottom;
        while i < self.delimiters.len() {
            let closer = self.delimiters[i];
            if !closer.can_close {
                i += 1;
                continue;
            }

            let opener = (bottom..i).rev().find(|&j| {
                let o = &self.delimiters[j];
                if o.ch != closer.ch || !o.can_open || o.extension != closer.extension {
                    return false;
                }
                // Rule of three for `*` and `_`.
                let odd_match = closer.extension.is_none()
                    && (o.can_close || closer.can_open)
                    && (o.original_length + closer.original_length) % 3 == 0
                    && !(o.original_length % 3 == 0 && closer.original_length % 3 == 0);
                !odd_match
            });

            let insert = opener.and_then(|j| {
                let o = self.delimiters[j];
                let found = match closer.extension {
                    Some(e) => self.extensions[e].insert_delimited(o.length, closer.length),
                    None => {
                        let used = if o.length >= 2 && closer.length >= 2 { 2 } else { 1 };
                        let value = if used == 2 {
                            NodeValue::Strong
                        } else {
                            NodeValue::Emph
                        };
                        Some((value, used))
                    }
                };
                found
                    .filter(|(_, used)| *used > 0 && *used <= o.length && *used <= closer.length)
                    .map(|(value, used)| (j, value, used))
            });

            match insert {
                Some((j, value, used)) => i = self.wrap_delimited(parent, j, i, value, used),
                None if !closer.can_open => {
                    self.delimiters.remove(i);
                }
                None => i += 1,
            }
        }
        self.delimiters.truncate(bottom);
    }

    /// Wrap the children between delimiters `j` and `i` in a new node,
    /// consuming `used` bytes from each run. Returns the stack index at
    /// which pairing should resume.
    fn wrap_delimited(&mut self, parent: &mut Node, j: usize, i: usize, value: NodeValue, used: usize) -> usize {
        let o_idx = self.delimiters[j].index;
        let c_idx = self.delimiters[i].index;

        let opener_node = &mut parent.children[o_idx];
        let keep = opener_node.literal.len().saturating_sub(used);
        opener_node.literal.truncate(keep);
        let start = {
            let mut p = opener_node.span.start;
            p.column += keep;
            p
        };
        opener_node.span.end.column = opener_node.span.end.column.saturating_sub(used);

        let closer_node = &mut parent.children[c_idx];
        let cut = used.min(closer_node.literal.len());
        closer_node.literal.drain(..cut);
        let end = {
            let mut p = closer_node.span.start;
            p.column += used - 1;
            p
        };
        closer_node.span.start.column += used;

        let mut node = Node::new(value).spanned(Span::new(start, end));
        node.children = parent.children.drain(o_idx + 1..c_idx).collect();
        parent.children.insert(o_idx + 1, node);

        self.delimiters.drain(j + 1..i);
        let ci = j + 1;
        self.delimiters[j].length -= used;
        self.delimiters[ci].length -= used;
        let opener_empty = self.delimiters[j].length == 0;
        let closer_empty = self.delimiters[ci].length == 0;

        let mut new_closer_idx = o_idx + 2;
        if opener_empty {
            parent.children.remove(o_idx);
            new_closer_idx -= 1;
        }
        if closer_empty {
            parent.children.remove(new_closer_idx);
        }

        for d in &mut self.delimiters[ci + 1..] {
            d.index = d.index - c_idx + new_closer_idx - usize::from(closer_empty);
        }
        self.delimiters[ci].index = new_closer_idx;

        let mut next = ci;
        if closer_empty {
            self.delimiters.remove(ci);
        }
        if opener_empty {
            self.delimiters.remove(j);
            next -= 1;
        }
        next
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace())
}
