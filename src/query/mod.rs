//! Search over the document: structural path queries and plain text.
//!
//! A pattern is structural when it is `$`, starts with `$.` or `$[`, or ends
//! with `\j` (the suffix is removed). Everything else is a regular
//! expression over the raw lines.
//!
//! # Supported path syntax
//!
//! - `$` - Root node (each record root in JSONL)
//! - `.property` or `['property']` - Named member
//! - `[index]` - Array index (negative counts from the end)
//! - `[*]` or `.*` - All children
//! - `..property`, `..*`, `..[0]` - Recursive descent
//! - `[start:end]` - Array slicing
//! - `['prop1','prop2']` - Multiple members
//!
//! A path may be followed by a comparison: `= != > < >= <= ~`.
//!
//! ```
//! // $.users[*].age > 30   - ages over thirty
//! // $..name ~ ^A          - names starting with A
//! // $.tags = ["a","b"]    - containers compare as JSON values
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod parser;
pub mod text;

pub use ast::{CompareOp, Filter, JsonPath, PathSegment, Query};
pub use error::QueryError;
pub use evaluator::Evaluator;
pub use parser::Parser;

use crate::document::{Document, Position};
use crate::error::{EditorError, EditorResult};
use crate::structure::{Analysis, NodePath};
use tracing::debug;

/// One search hit. `col_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub line: usize,
    pub col_start: usize,
    pub col_end: usize,
    /// Path of the matched node for structural searches.
    pub path: Option<NodePath>,
}

impl Match {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.col_start)
    }
}

/// Search results in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchList {
    matches: Vec<Match>,
}

impl MatchList {
    pub fn new(mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| (m.line, m.col_start));
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    /// Index of the nearest match strictly after (or before) `pos`, wrapping
    /// around the document. The flag reports whether it wrapped.
    pub fn next_from(&self, pos: Position, forward: bool) -> Option<(usize, bool)> {
        if self.matches.is_empty() {
            return None;
        }
        if forward {
            match self.matches.iter().position(|m| m.position() > pos) {
                Some(index) => Some((index, false)),
                None => Some((0, true)),
            }
        } else {
            match self.matches.iter().rposition(|m| m.position() < pos) {
                Some(index) => Some((index, false)),
                None => Some((self.matches.len() - 1, true)),
            }
        }
    }
}

/// How a search pattern is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    Structural(String),
    Text(String),
}

impl SearchPattern {
    pub fn classify(pattern: &str) -> Self {
        if let Some(body) = pattern.strip_suffix("\\j") {
            return SearchPattern::Structural(body.trim().to_string());
        }
        let trimmed = pattern.trim_start();
        if trimmed == "$" || trimmed.starts_with("$.") || trimmed.starts_with("$[") {
            SearchPattern::Structural(trimmed.to_string())
        } else {
            SearchPattern::Text(pattern.to_string())
        }
    }
}

/// Runs a search against one analysed document version.
pub fn run(
    pattern: &str,
    analysis: &Analysis,
    doc: &Document,
    smart_case: bool,
) -> EditorResult<MatchList> {
    let matches = match SearchPattern::classify(pattern) {
        SearchPattern::Structural(query_text) => {
            let tree = analysis.require_tree()?;
            let query = filter::parse_query(&query_text)
                .map_err(|e| EditorError::InvalidPattern(e.to_string()))?;
            Evaluator::new(tree)
                .evaluate(&query.path.segments)
                .into_iter()
                .filter(|&id| {
                    query
                        .filter
                        .as_ref()
                        .map_or(true, |f| filter::matches(tree, id, f))
                })
                .map(|id| {
                    let span = tree.node(id).span;
                    let col_end = if span.is_multiline() {
                        span.start.col + 1
                    } else {
                        span.end.col + 1
                    };
                    Match {
                        line: span.start.line,
                        col_start: span.start.col,
                        col_end,
                        path: Some(tree.path_of(id)),
                    }
                })
                .collect()
        }
        SearchPattern::Text(text_pattern) => {
            let regex = text::compile(&text_pattern, smart_case)
                .map_err(|e| EditorError::InvalidPattern(e.to_string()))?;
            text::search(doc.lines(), &regex)
        }
    };
    let list = MatchList::new(matches);
    debug!(pattern, matches = list.len(), "search evaluated");
    Ok(list)
}
