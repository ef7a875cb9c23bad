//! Operators and the text-span helpers they are built on.
//!
//! Character-wise spans are half-open: `start` is included, `end` is not.
//! Every helper goes through [`Document::replace`], so the changes land in
//! the document journal and become part of the current undo entry.

use crate::document::{char_len, char_to_byte, Document, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            'd' => Some(Operator::Delete),
            'c' => Some(Operator::Change),
            'y' => Some(Operator::Yank),
            _ => None,
        }
    }

    /// True for operators that modify the document.
    pub fn modifies(&self) -> bool {
        !matches!(self, Operator::Yank)
    }
}

fn clamp(doc: &Document, pos: Position) -> Position {
    let line = pos.line.min(doc.line_count().saturating_sub(1));
    Position::new(line, pos.col.min(doc.line_len(line)))
}

/// Text between `start` and `end`, one entry per touched line.
pub fn extract_chars(doc: &Document, start: Position, end: Position) -> Vec<String> {
    let (start, end) = (clamp(doc, start), clamp(doc, end));
    if start.line == end.line {
        let line = doc.line(start.line);
        let from = char_to_byte(line, start.col);
        let to = char_to_byte(line, end.col.max(start.col));
        return vec![line[from..to].to_string()];
    }
    let first = doc.line(start.line);
    let last = doc.line(end.line);
    let mut out = vec![first[char_to_byte(first, start.col)..].to_string()];
    out.extend(doc.read(start.line + 1..end.line));
    out.push(last[..char_to_byte(last, end.col)].to_string());
    out
}

/// Removes the text between `start` and `end`, joining the outer lines.
pub fn delete_chars(doc: &mut Document, start: Position, end: Position) {
    let (start, end) = (clamp(doc, start), clamp(doc, end));
    if end <= start {
        return;
    }
    let first = doc.line(start.line);
    let last = doc.line(end.line);
    let joined = format!(
        "{}{}",
        &first[..char_to_byte(first, start.col)],
        &last[char_to_byte(last, end.col)..]
    );
    doc.replace(start.line..end.line + 1, vec![joined]);
}

/// Lines `first..=last`.
pub fn extract_lines(doc: &Document, first: usize, last: usize) -> Vec<String> {
    doc.read(first..last + 1)
}

/// Removes lines `first..=last`. An emptied document keeps one blank line.
pub fn delete_lines(doc: &mut Document, first: usize, last: usize) {
    doc.replace(first..last + 1, Vec::new());
}

/// Inserts character-wise `text` at `at`. Returns the position of the last
/// inserted character.
pub fn insert_chars(doc: &mut Document, at: Position, text: &[String]) -> Position {
    let at = clamp(doc, at);
    let Some((last_piece, middle)) = text.split_last() else {
        return at;
    };
    let line = doc.line(at.line).to_string();
    let split = char_to_byte(&line, at.col);
    let (prefix, suffix) = line.split_at(split);

    if middle.is_empty() {
        doc.set_line(at.line, format!("{}{}{}", prefix, last_piece, suffix));
        let end_col = (at.col + char_len(last_piece)).saturating_sub(1);
        return Position::new(at.line, end_col);
    }

    let mut lines = Vec::with_capacity(text.len());
    lines.push(format!("{}{}", prefix, middle[0]));
    lines.extend(middle[1..].iter().cloned());
    lines.push(format!("{}{}", last_piece, suffix));
    doc.replace(at.line..at.line + 1, lines);
    Position::new(
        at.line + text.len() - 1,
        char_len(last_piece).saturating_sub(1),
    )
}

/// Inserts whole lines before line `at`.
pub fn insert_lines(doc: &mut Document, at: usize, lines: Vec<String>) {
    let at = at.min(doc.line_count());
    doc.replace(at..at, lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    fn doc(text: &str) -> Document {
        Document::from_text(text, DocumentFormat::Json)
    }

    #[test]
    fn test_extract_and_delete_single_line() {
        let mut d = doc("hello world");
        let (s, e) = (Position::new(0, 0), Position::new(0, 6));
        assert_eq!(extract_chars(&d, s, e), vec!["hello "]);
        delete_chars(&mut d, s, e);
        assert_eq!(d.text(), "world");
    }

    #[test]
    fn test_extract_and_delete_across_lines() {
        let mut d = doc("ab\ncd\nef");
        let (s, e) = (Position::new(0, 1), Position::new(2, 1));
        assert_eq!(extract_chars(&d, s, e), vec!["b", "cd", "e"]);
        delete_chars(&mut d, s, e);
        assert_eq!(d.text(), "af");
    }

    #[test]
    fn test_insert_chars_multi_line() {
        let mut d = doc("af");
        let text = vec!["b".to_string(), "cd".to_string(), "e".to_string()];
        let end = insert_chars(&mut d, Position::new(0, 1), &text);
        assert_eq!(d.text(), "ab\ncd\nef");
        assert_eq!(end, Position::new(2, 0));
    }

    #[test]
    fn test_delete_all_lines_leaves_blank_line() {
        let mut d = doc("a\nb");
        delete_lines(&mut d, 0, 1);
        assert_eq!(d.lines(), &[String::new()]);
    }

    #[test]
    fn test_multibyte_columns() {
        let mut d = doc("héllo");
        delete_chars(&mut d, Position::new(0, 1), Position::new(0, 2));
        assert_eq!(d.text(), "hllo");
    }
}
