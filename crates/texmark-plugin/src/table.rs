//! GitHub-style pipe tables.
//!
//! A table lives inside what the block parser saw as a paragraph: a header
//! row, a delimiter row of `---` cells with optional `:` alignment
//! markers, then body rows up to the end of the paragraph. Lines before
//! the header stay a paragraph. Cells are split on unescaped `|`, and
//! `\|` inside a cell stands for a literal pipe.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;
use texmark_core::{
    LineStart, Node, NodeValue, ParagraphSplit, Position, Span, SyntaxExtension, TableAlignment,
};

/// One cell of a delimiter row, already trimmed
static DELIMITER_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-+:?$").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtension;

impl TableExtension {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxExtension for TableExtension {
    fn name(&self) -> &str {
        "table"
    }

    fn special_chars(&self) -> &[u8] {
        b""
    }

    fn split_paragraph(&self, content: &str, lines: &[LineStart]) -> Option<ParagraphSplit> {
        let rows: Vec<&str> = (0..lines.len())
            .map(|i| line_text(content, lines, i))
            .collect();

        for i in 1..rows.len() {
            let Some(alignments) = delimiter_row(rows[i]) else {
                continue;
            };
            let header = split_row(rows[i - 1]);
            if header.len() != alignments.len() || !(rows[i].contains('|') || rows[i - 1].contains('|')) {
                continue;
            }

            let columns = alignments.len();
            let mut table = Node::new(NodeValue::Table(alignments));
            table.append(row_node(header, true, columns, rows[i - 1], lines[i - 1]));
            for k in i + 1..rows.len() {
                table.append(row_node(split_row(rows[k]), false, columns, rows[k], lines[k]));
            }

            let last = rows.len() - 1;
            table.span = Span::new(row_start(rows[i - 1], lines[i - 1]), row_end(rows[last], lines[last]));
            debug!("table: {} columns, {} rows at {}", columns, table.children.len(), table.span);
            return Some(ParagraphSplit {
                keep: i - 1,
                block: table,
            });
        }
        None
    }
}

/// Text of content line `i`, without its newline.
fn line_text<'c>(content: &'c str, lines: &[LineStart], i: usize) -> &'c str {
    let start = lines[i].offset.min(content.len());
    let end = lines
        .get(i + 1)
        .map_or(content.len(), |next| next.offset.saturating_sub(1))
        .max(start);
    content.get(start..end).unwrap_or("")
}

/// A cell's text with `\|` unescaped, where its trimmed source starts in
/// the row, and that source's length.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    text: String,
    offset: usize,
    len: usize,
}

/// Split a row on unescaped pipes, dropping one leading and one trailing pipe.
fn split_row(row: &str) -> Vec<Cell> {
    let bytes = row.as_bytes();
    let mut start = row.len() - row.trim_start().len();
    let mut end = row.trim_end().len();
    if bytes.get(start) == Some(&b'|') {
        start += 1;
    }
    if end > start && bytes[end - 1] == b'|' && !(end >= 2 && bytes[end - 2] == b'\\') {
        end -= 1;
    }

    let mut cells = Vec::new();
    let mut cell_start = start;
    let mut i = start;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                cells.push(cell(row, cell_start, i));
                cell_start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    cells.push(cell(row, cell_start, end.max(cell_start)));
    cells
}

fn cell(row: &str, from: usize, to: usize) -> Cell {
    let raw = &row[from..to];
    let trimmed = raw.trim();
    Cell {
        text: trimmed.replace("\\|", "|"),
        offset: from + (raw.len() - raw.trim_start().len()),
        len: trimmed.len(),
    }
}

/// Column alignments, if `row` is a delimiter row.
fn delimiter_row(row: &str) -> Option<Vec<TableAlignment>> {
    split_row(row)
        .iter()
        .map(|cell| {
            if !DELIMITER_CELL.is_match(&cell.text) {
                return None;
            }
            let left = cell.text.starts_with(':');
            let right = cell.text.ends_with(':');
            Some(match (left, right) {
                (true, true) => TableAlignment::Center,
                (true, false) => TableAlignment::Left,
                (false, true) => TableAlignment::Right,
                (false, false) => TableAlignment::None,
            })
        })
        .collect()
}

/// A row with exactly `columns` cells: extras are dropped, missing cells
/// are added empty at the end of the row.
fn row_node(cells: Vec<Cell>, header: bool, columns: usize, row: &str, line: LineStart) -> Node {
    let end = row_end(row, line);
    let mut node = Node::new(NodeValue::TableRow(header)).spanned(Span::new(row_start(row, line), end));
    for cell in cells.into_iter().take(columns) {
        let start = Position::new(line.line, line.column + cell.offset);
        let stop = Position::new(line.line, (start.column + cell.len).saturating_sub(1).max(start.column));
        node.append(Node::with_literal(NodeValue::TableCell, cell.text).spanned(Span::new(start, stop)));
    }
    while node.children.len() < columns {
        node.append(Node::new(NodeValue::TableCell).spanned(Span::new(end, end)));
    }
    node
}

fn row_start(row: &str, line: LineStart) -> Position {
    Position::new(line.line, line.column + (row.len() - row.trim_start().len()))
}

fn row_end(row: &str, line: LineStart) -> Position {
    Position::new(line.line, (line.column + row.trim_end().len()).saturating_sub(1))
}
