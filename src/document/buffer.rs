//! Line buffer with a version counter and a change journal.
//!
//! All mutation goes through [`Document::replace`]. Each call bumps the
//! version and appends a [`Change`] to the journal; the owning session drains
//! the journal with [`Document::take_changes`] to build undo entries.
//!
//! # Example
//!
//! ```
//! use jsonvim::document::{Document, DocumentFormat};
//!
//! let mut doc = Document::from_text("{\n  \"a\": 1\n}", DocumentFormat::Json);
//! assert_eq!(doc.line_count(), 3);
//!
//! let before = doc.version();
//! doc.replace(1..2, vec!["  \"a\": 2".to_string()]);
//! assert!(doc.version() > before);
//! assert_eq!(doc.take_changes().len(), 1);
//! ```

use super::format;
use std::ops::Range;
use tracing::trace;

/// Monotonic document version.
pub type Version = u64;

/// A (line, column) location. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Content format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// A single JSON value.
    Json,
    /// JSON Lines: one value per record, records separated by blank lines
    /// while being edited.
    Jsonl,
}

impl Default for DocumentFormat {
    fn default() -> Self {
        DocumentFormat::Json
    }
}

/// One journaled line replacement.
///
/// Applying `inverse()` after the change restores the previous text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub start: usize,
    pub removed: Vec<String>,
    pub inserted: Vec<String>,
}

impl Change {
    /// Returns the change that undoes this one.
    pub fn inverse(&self) -> Change {
        Change {
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }
}

/// A JSONL record: an inclusive range of non-blank lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub start: usize,
    pub end: usize,
}

impl Record {
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }
}

/// The text being edited, as lines. Never empty: an empty document is `[""]`.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    version: Version,
    format: DocumentFormat,
    records: Vec<Record>,
    journal: Vec<Change>,
}

impl Document {
    /// Creates an empty document.
    pub fn new(format: DocumentFormat) -> Self {
        Self::from_lines(vec![String::new()], format)
    }

    /// Creates a document from text, stripping a single trailing newline.
    pub fn from_text(text: &str, format: DocumentFormat) -> Self {
        let text = text.strip_suffix('\n').unwrap_or(text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self::from_lines(lines, format)
    }

    pub fn from_lines(mut lines: Vec<String>, format: DocumentFormat) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        let mut doc = Self {
            lines,
            version: 0,
            format,
            records: Vec::new(),
            journal: Vec::new(),
        };
        doc.recompute_records();
        doc
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns line `index`, or an empty string past the end.
    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }

    /// Length of line `index` in characters.
    pub fn line_len(&self, index: usize) -> usize {
        char_len(self.line(index))
    }

    /// Returns a copy of the lines in `range`, clamped to the document.
    pub fn read(&self, range: Range<usize>) -> Vec<String> {
        let start = range.start.min(self.lines.len());
        let end = range.end.clamp(start, self.lines.len());
        self.lines[start..end].to_vec()
    }

    /// Joins all lines with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replaces the lines in `range` with `new_lines` and returns the new
    /// version.
    ///
    /// The range is clamped to the document. Removing every line without
    /// inserting any leaves a single empty line. A replacement that changes
    /// nothing is not journaled and does not bump the version.
    pub fn replace(&mut self, range: Range<usize>, new_lines: Vec<String>) -> Version {
        let start = range.start.min(self.lines.len());
        let end = range.end.clamp(start, self.lines.len());

        let mut inserted = new_lines;
        if inserted.is_empty() && start == 0 && end == self.lines.len() {
            inserted.push(String::new());
        }
        if self.lines[start..end] == inserted[..] {
            return self.version;
        }

        let removed: Vec<String> = self
            .lines
            .splice(start..end, inserted.iter().cloned())
            .collect();
        self.version += 1;
        trace!(
            start,
            removed = removed.len(),
            inserted = inserted.len(),
            version = self.version,
            "document replace"
        );
        self.journal.push(Change {
            start,
            removed,
            inserted,
        });
        self.recompute_records();
        self.version
    }

    /// Applies a journaled change (or its inverse) to the document.
    pub fn apply(&mut self, change: &Change) -> Version {
        let end = change.start + change.removed.len();
        self.replace(change.start..end, change.inserted.clone())
    }

    /// Replaces a single line.
    pub fn set_line(&mut self, index: usize, text: String) -> Version {
        self.replace(index..index + 1, vec![text])
    }

    /// Drains the change journal.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.journal)
    }

    /// JSONL records in document order. Empty for JSON documents.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Index of the record containing `line`. Blank separator lines belong to
    /// no record.
    pub fn record_at(&self, line: usize) -> Option<usize> {
        self.records.iter().position(|r| r.contains(line))
    }

    /// Pretty-prints record `index` in place.
    ///
    /// Returns `None` if the record does not exist or does not parse.
    pub fn expand_record(&mut self, index: usize, indent: usize) -> Option<Version> {
        let record = *self.records.get(index)?;
        let text = self.read(record.start..record.end + 1).join("\n");
        let pretty = format::pretty_text(&text, indent).ok()?;
        let lines = pretty.lines().map(str::to_string).collect();
        Some(self.replace(record.start..record.end + 1, lines))
    }

    /// Collapses record `index` to its minified single line.
    pub fn collapse_record(&mut self, index: usize) -> Option<Version> {
        let record = *self.records.get(index)?;
        let text = self.read(record.start..record.end + 1).join("\n");
        let line = format::minify(&text).ok()?;
        Some(self.replace(record.start..record.end + 1, vec![line]))
    }

    fn recompute_records(&mut self) {
        self.records.clear();
        if self.format != DocumentFormat::Jsonl {
            return;
        }
        let mut start = None;
        for (i, line) in self.lines.iter().enumerate() {
            match (line.trim().is_empty(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    self.records.push(Record { start: s, end: i - 1 });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            self.records.push(Record {
                start: s,
                end: self.lines.len() - 1,
            });
        }
    }
}

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of character column `col` in `s`, clamped to the end.
pub fn char_to_byte(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_text_strips_one_trailing_newline() {
        let doc = Document::from_text("a\nb\n", DocumentFormat::Json);
        assert_eq!(doc.lines(), &lines(&["a", "b"])[..]);

        let doc = Document::from_text("a\n\n", DocumentFormat::Json);
        assert_eq!(doc.lines(), &lines(&["a", ""])[..]);
    }

    #[test]
    fn test_empty_document_has_one_line() {
        let doc = Document::from_text("", DocumentFormat::Json);
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line(0), "");
    }

    #[test]
    fn test_replace_bumps_version_and_journals() {
        let mut doc = Document::from_text("a\nb\nc", DocumentFormat::Json);
        let v = doc.replace(1..2, lines(&["x", "y"]));
        assert_eq!(v, 1);
        assert_eq!(doc.text(), "a\nx\ny\nc");

        let changes = doc.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].removed, lines(&["b"]));
        assert_eq!(changes[0].inserted, lines(&["x", "y"]));
        assert!(doc.take_changes().is_empty());
    }

    #[test]
    fn test_noop_replace_is_not_journaled() {
        let mut doc = Document::from_text("a\nb", DocumentFormat::Json);
        doc.replace(0..1, lines(&["a"]));
        assert_eq!(doc.version(), 0);
        assert!(doc.take_changes().is_empty());
    }

    #[test]
    fn test_removing_everything_leaves_empty_line() {
        let mut doc = Document::from_text("a\nb", DocumentFormat::Json);
        doc.replace(0..2, vec![]);
        assert_eq!(doc.lines(), &lines(&[""])[..]);

        let change = doc.take_changes().remove(0);
        doc.apply(&change.inverse());
        assert_eq!(doc.text(), "a\nb");
    }

    #[test]
    fn test_inverse_restores_text() {
        let mut doc = Document::from_text("one\ntwo\nthree", DocumentFormat::Json);
        doc.replace(0..2, lines(&["1"]));
        let change = doc.take_changes().remove(0);
        doc.apply(&change.inverse());
        assert_eq!(doc.text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_records_are_blank_separated_blocks() {
        let doc = Document::from_text("{\n  \"a\": 1\n}\n\n{\"b\": 2}", DocumentFormat::Jsonl);
        assert_eq!(
            doc.records(),
            &[Record { start: 0, end: 2 }, Record { start: 4, end: 4 }]
        );
        assert_eq!(doc.record_at(1), Some(0));
        assert_eq!(doc.record_at(3), None);
        assert_eq!(doc.record_at(4), Some(1));
    }

    #[test]
    fn test_json_documents_have_no_records() {
        let doc = Document::from_text("{}\n\n{}", DocumentFormat::Json);
        assert!(doc.records().is_empty());
        assert_eq!(doc.record_at(0), None);
    }

    #[test]
    fn test_expand_and_collapse_record() {
        let mut doc = Document::from_text("{\"a\":1,\"b\":[true]}", DocumentFormat::Jsonl);
        doc.expand_record(0, 2).unwrap();
        assert_eq!(doc.line(0), "{");
        assert_eq!(doc.line(1), "  \"a\": 1,");
        assert_eq!(doc.records().len(), 1);

        doc.collapse_record(0).unwrap();
        assert_eq!(doc.text(), "{\"a\":1,\"b\":[true]}");
        assert!(doc.collapse_record(5).is_none());
    }

    #[test]
    fn test_char_helpers() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(char_to_byte("héllo", 2), 3);
        assert_eq!(char_to_byte("abc", 10), 3);
    }
}
