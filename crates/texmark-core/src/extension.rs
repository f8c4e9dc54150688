//! Syntax extension interface.
//!
//! An extension claims a set of trigger bytes. When the inline parser
//! reaches one of them (and the core grammar has no rule for it), the
//! extension is handed the cursor and the parent node and may return a
//! node of its own. Extensions also answer for the nodes they produce at
//! render time.
//!
//! Two coarser hooks serve block-level extensions: a closed paragraph can
//! be split into other blocks before its inlines are parsed, and the
//! finished tree can be rewritten once at the end.

use crate::enums::OutputFormat;
use crate::node::{Node, NodeValue};
use crate::options::Options;
use crate::subject::{LineStart, Subject};

/// Block structure an extension found inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSplit {
    /// Leading content lines that stay a paragraph
    pub keep: usize,
    /// Block replacing the remaining lines. Descendants that hold inlines
    /// carry their raw text in `literal`, with `span.start` at its first
    /// byte; the parser replaces it with parsed inline children.
    pub block: Node,
}

/// A registered inline syntax extension.
///
/// Implementations are shared between parsers as `Arc<dyn SyntaxExtension>`
/// and must not hold per-parse state.
pub trait SyntaxExtension: Send + Sync {
    /// Unique registration name, e.g. `"latex_block"`
    fn name(&self) -> &str;

    /// Bytes that cause the inline parser to consult this extension
    fn special_chars(&self) -> &[u8];

    /// Whether declined runs of the special chars become delimiter runs,
    /// paired later through [`SyntaxExtension::insert_delimited`].
    fn emphasis(&self) -> bool {
        false
    }

    /// Try to match at the current offset, where byte `c` sits.
    ///
    /// On success the extension returns the new node and leaves the
    /// subject offset just past the consumed text; `parent` is the node
    /// that will receive it and may be repaired first. On failure it
    /// returns `None` and must leave both the offset and `parent` as it
    /// found them.
    fn match_inline(&self, _subject: &mut Subject<'_>, _parent: &mut Node, _c: u8) -> Option<Node> {
        None
    }

    /// For extensions with the emphasis flag: given matched opener and
    /// closer run lengths, the node kind to wrap the content in and the
    /// number of delimiter bytes to consume from each side.
    fn insert_delimited(&self, _opener_len: usize, _closer_len: usize) -> Option<(NodeValue, usize)> {
        None
    }

    /// Look for block structure in the content of a closed paragraph.
    ///
    /// `content` holds the paragraph lines joined by `\n`; `lines` maps
    /// each line's offset in it to its source position.
    fn split_paragraph(&self, _content: &str, _lines: &[LineStart]) -> Option<ParagraphSplit> {
        None
    }

    /// Rewrite the finished document, after every inline is parsed
    fn postprocess(&self, _doc: &mut Node) {}

    /// Specific type name for a node this extension produced
    fn type_name(&self, _node: &Node) -> Option<&'static str> {
        None
    }

    /// Render a node this extension owns. Returns `false` to leave the
    /// node to the generic renderer.
    fn render(&self, _format: OutputFormat, _node: &Node, _ctx: &mut RenderContext) -> bool {
        false
    }
}

/// Output accumulator for one render pass.
///
/// Text written through [`RenderContext::write`] is appended verbatim,
/// except that each new line starts with the active line prefix (the
/// `> ` and list indentation of the CommonMark renderer; empty for the
/// other formats).
#[derive(Debug, Clone)]
pub struct RenderContext {
    out: String,
    options: Options,
    prefix: String,
    at_line_start: bool,
    last_blank: bool,
}

impl RenderContext {
    pub fn new(options: Options) -> Self {
        Self {
            out: String::new(),
            options,
            prefix: String::new(),
            at_line_start: true,
            last_blank: false,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Append text, inserting the line prefix after each newline
    pub fn write(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.last_blank = self.at_line_start;
                if self.at_line_start {
                    self.out.push_str(self.prefix.trim_end());
                }
                self.out.push('\n');
                self.at_line_start = true;
            }
            if !line.is_empty() {
                if self.at_line_start {
                    self.out.push_str(&self.prefix);
                    self.at_line_start = false;
                }
                self.out.push_str(line);
                self.last_blank = false;
            }
        }
    }

    /// Append a single character
    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write(c.encode_utf8(&mut buf));
    }

    /// End the current line unless already at the start of one
    pub fn cr(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    /// Ensure one empty line separates what follows from what came before
    pub fn blank_line(&mut self) {
        self.cr();
        if !self.out.is_empty() && !self.last_blank {
            self.write("\n");
        }
    }

    /// Push onto the line prefix; returns the previous prefix length
    pub fn push_prefix(&mut self, prefix: &str) -> usize {
        let len = self.prefix.len();
        self.prefix.push_str(prefix);
        len
    }

    /// Restore the prefix to a length returned by [`RenderContext::push_prefix`]
    pub fn restore_prefix(&mut self, len: usize) {
        self.prefix.truncate(len);
    }

    /// The last character written, if any
    pub fn last_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    pub fn is_at_line_start(&self) -> bool {
        self.at_line_start
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Options::DEFAULT)
    }
}
