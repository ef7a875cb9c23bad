//! Fold regions keyed by structural path.
//!
//! Collapsed folds are remembered by [`NodePath`], not by line number. After
//! every re-analysis [`FoldSet::sync`] resolves the paths against the new tree
//! and drops those whose anchor is gone or no longer foldable. While the
//! document does not parse, collapsed paths are kept but nothing is hidden.
//!
//! Folding only changes the visible-line mapping; the text is never touched.

use super::analysis::Analysis;
use super::tree::{NodeKind, NodePath, Tree};
use crate::document::Version;
use std::collections::BTreeSet;

/// What a fold region covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldKind {
    /// A multi-line object or array. Collapsing hides every line after the
    /// first.
    Block,
    /// A long string value. Collapsing hides no lines; the line is shown
    /// truncated.
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRegion {
    pub start: usize,
    pub end: usize,
    pub kind: FoldKind,
    pub path: NodePath,
}

/// Every fold candidate in the tree, in document order.
pub fn fold_candidates(tree: &Tree, string_threshold: usize) -> Vec<FoldRegion> {
    tree.walk()
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id);
            let kind = match &node.kind {
                NodeKind::Object(_) | NodeKind::Array(_) if node.span.is_multiline() => {
                    FoldKind::Block
                }
                NodeKind::String(s) if s.chars().count() >= string_threshold => FoldKind::String,
                _ => return None,
            };
            Some(FoldRegion {
                start: node.span.start.line,
                end: node.span.end.line,
                kind,
                path: tree.path_of(id),
            })
        })
        .collect()
}

/// Collapsed folds for one session.
#[derive(Debug, Clone, Default)]
pub struct FoldSet {
    collapsed: BTreeSet<NodePath>,
    candidates: Vec<FoldRegion>,
    active: Vec<FoldRegion>,
    /// Analysis version and string threshold of the last sync.
    synced: Option<(Version, usize)>,
}

impl FoldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_collapsed(&self) -> bool {
        !self.collapsed.is_empty()
    }

    /// Re-resolves collapsed paths against `analysis`. Does nothing when
    /// this analysis version was already synced.
    pub fn sync(&mut self, analysis: &Analysis, string_threshold: usize) {
        let key = (analysis.version(), string_threshold);
        if self.synced == Some(key) {
            return;
        }
        self.synced = Some(key);
        match analysis.tree() {
            Some(tree) => {
                self.candidates = fold_candidates(tree, string_threshold);
                let known: BTreeSet<&NodePath> = self.candidates.iter().map(|r| &r.path).collect();
                self.collapsed.retain(|p| known.contains(p));
                self.active = self
                    .candidates
                    .iter()
                    .filter(|r| self.collapsed.contains(&r.path))
                    .cloned()
                    .collect();
            }
            None => {
                self.candidates.clear();
                self.active.clear();
            }
        }
    }

    /// Regions the last sync found foldable.
    pub fn candidates(&self) -> &[FoldRegion] {
        &self.candidates
    }

    /// Collapsed regions currently applied.
    pub fn active(&self) -> &[FoldRegion] {
        &self.active
    }

    /// The fold `line` refers to: a region starting on the line, otherwise
    /// the innermost block enclosing it.
    pub fn region_at(&self, line: usize) -> Option<&FoldRegion> {
        self.candidates
            .iter()
            .find(|r| r.start == line)
            .or_else(|| {
                self.candidates
                    .iter()
                    .filter(|r| r.kind == FoldKind::Block && r.start <= line && line <= r.end)
                    .last()
            })
    }

    pub fn is_collapsed(&self, path: &NodePath) -> bool {
        self.collapsed.contains(path)
    }

    /// `za`: flips the fold at `line`. Returns false if there is none.
    pub fn toggle(&mut self, line: usize) -> bool {
        let Some(path) = self.region_at(line).map(|r| r.path.clone()) else {
            return false;
        };
        if !self.collapsed.remove(&path) {
            self.collapsed.insert(path);
        }
        self.refresh_active();
        true
    }

    /// `zo`
    pub fn open(&mut self, line: usize) -> bool {
        let Some(path) = self.region_at(line).map(|r| r.path.clone()) else {
            return false;
        };
        self.collapsed.remove(&path);
        self.refresh_active();
        true
    }

    /// `zc`
    pub fn close(&mut self, line: usize) -> bool {
        let Some(path) = self.region_at(line).map(|r| r.path.clone()) else {
            return false;
        };
        self.collapsed.insert(path);
        self.refresh_active();
        true
    }

    /// `zM`
    pub fn close_all(&mut self) {
        self.collapsed = self.candidates.iter().map(|r| r.path.clone()).collect();
        self.refresh_active();
    }

    /// `zR`
    pub fn open_all(&mut self) {
        self.collapsed.clear();
        self.active.clear();
    }

    /// Opens every collapsed block that hides `line`.
    pub fn reveal(&mut self, line: usize) {
        let hiding: Vec<NodePath> = self
            .active
            .iter()
            .filter(|r| hides(r, line))
            .map(|r| r.path.clone())
            .collect();
        for path in hiding {
            self.collapsed.remove(&path);
        }
        self.refresh_active();
    }

    pub fn is_hidden(&self, line: usize) -> bool {
        self.active.iter().any(|r| hides(r, line))
    }

    /// First line of the outermost collapsed block hiding `line`, or `line`
    /// itself when it is visible.
    pub fn header_of(&self, line: usize) -> usize {
        self.active
            .iter()
            .filter(|r| hides(r, line))
            .map(|r| r.start)
            .min()
            .unwrap_or(line)
    }

    /// True when `line` holds a collapsed long string.
    pub fn is_string_collapsed(&self, line: usize) -> bool {
        self.active
            .iter()
            .any(|r| r.kind == FoldKind::String && r.start == line)
    }

    /// Document lines that remain visible, in order.
    pub fn visible_lines(&self, line_count: usize) -> Vec<usize> {
        (0..line_count).filter(|&l| !self.is_hidden(l)).collect()
    }

    fn refresh_active(&mut self) {
        self.active = self
            .candidates
            .iter()
            .filter(|r| self.collapsed.contains(&r.path))
            .cloned()
            .collect();
    }
}

fn hides(region: &FoldRegion, line: usize) -> bool {
    region.kind == FoldKind::Block && region.start < line && line <= region.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentFormat};

    const TEXT: &str = "{\n  \"a\": {\n    \"x\": 1\n  },\n  \"b\": [\n    2\n  ]\n}";

    fn synced(doc: &Document) -> FoldSet {
        let mut folds = FoldSet::new();
        folds.sync(&Analysis::build(doc), 60);
        folds
    }

    #[test]
    fn test_candidates_in_document_order() {
        let doc = Document::from_text(TEXT, DocumentFormat::Json);
        let folds = synced(&doc);
        let starts: Vec<usize> = folds.candidates().iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0, 1, 4]);
        assert!(folds.visible_lines(doc.line_count()).len() == doc.line_count());
    }

    #[test]
    fn test_toggle_hides_and_shows_lines() {
        let doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        assert!(folds.toggle(1));
        assert_eq!(folds.visible_lines(8), vec![0, 1, 4, 5, 6, 7]);
        assert_eq!(folds.header_of(2), 1);
        assert!(folds.toggle(1));
        assert_eq!(folds.visible_lines(8).len(), 8);
    }

    #[test]
    fn test_region_at_inner_line_uses_enclosing_block() {
        let doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        assert!(folds.close(5));
        assert!(folds.is_hidden(5));
        assert!(!folds.is_hidden(4));
    }

    #[test]
    fn test_folds_follow_paths_across_edits() {
        let mut doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        folds.close(4);

        doc.replace(0..1, vec!["{".to_string(), "  \"new\": true,".to_string()]);
        folds.sync(&Analysis::build(&doc), 60);
        assert!(folds.is_hidden(6));
        assert!(!folds.is_hidden(5));
    }

    #[test]
    fn test_folds_dropped_when_anchor_disappears() {
        let mut doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        folds.close(1);
        doc.replace(1..4, vec!["  \"a\": 1,".to_string()]);
        folds.sync(&Analysis::build(&doc), 60);
        assert!(!folds.has_collapsed());
    }

    #[test]
    fn test_invalid_document_keeps_but_suspends_folds() {
        let mut doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        folds.close(1);
        doc.replace(7..8, vec![String::new()]);
        folds.sync(&Analysis::build(&doc), 60);
        assert!(folds.has_collapsed());
        assert!(!folds.is_hidden(2));

        doc.replace(7..8, vec!["}".to_string()]);
        folds.sync(&Analysis::build(&doc), 60);
        assert!(folds.is_hidden(2));
    }

    #[test]
    fn test_long_string_fold_hides_nothing() {
        let long = "x".repeat(70);
        let doc = Document::from_text(&format!("{{\"s\": \"{}\"}}", long), DocumentFormat::Json);
        let mut folds = synced(&doc);
        assert_eq!(folds.candidates().len(), 1);
        assert!(folds.toggle(0));
        assert!(folds.is_string_collapsed(0));
        assert_eq!(folds.visible_lines(1), vec![0]);
    }

    #[test]
    fn test_sync_skips_an_already_synced_version() {
        let doc = Document::from_text(TEXT, DocumentFormat::Json);
        let mut folds = synced(&doc);
        assert_eq!(folds.candidates().len(), 3);

        // Same version number, different content: the cached regions stay.
        let other = Document::from_text("[\n  1\n]", DocumentFormat::Json);
        assert_eq!(other.version(), doc.version());
        folds.sync(&Analysis::build(&other), 60);
        assert_eq!(folds.candidates().len(), 3);

        folds.sync(&Analysis::build(&other), 10);
        assert_eq!(folds.candidates().len(), 1);
    }
}
