//! Versioned structural analysis and bracket matching.
//!
//! [`StructureCache::get`] hands out the analysis for the document's current
//! version, re-parsing first when the cached one is older. Rebuilding happens
//! inside the same `&mut` call that reads it, so a stale tree is never
//! observable.

use super::lexer::{tokenize, TokenKind};
use super::parser::{parse_document, ValidationError};
use super::tree::{NodeKind, Tree};
use crate::document::{Document, Position, Version};
use crate::error::EditorError;
use std::collections::HashMap;
use tracing::trace;

/// Parse result for one document version.
#[derive(Debug, Clone)]
pub struct Analysis {
    version: Version,
    tree: Tree,
    errors: Vec<ValidationError>,
    pairs: HashMap<Position, Position>,
}

impl Analysis {
    pub fn build(doc: &Document) -> Self {
        let (tree, errors) = parse_document(doc);
        let pairs = if errors.is_empty() {
            tree_pairs(&tree)
        } else {
            token_pairs(doc)
        };
        trace!(
            version = doc.version(),
            nodes = tree.len(),
            errors = errors.len(),
            "structure rebuilt"
        );
        Self {
            version: doc.version(),
            tree,
            errors,
            pairs,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The tree, or `None` while the document has parse errors.
    pub fn tree(&self) -> Option<&Tree> {
        if self.is_valid() {
            Some(&self.tree)
        } else {
            None
        }
    }

    /// The tree, or the first parse error as an [`EditorError`].
    pub fn require_tree(&self) -> Result<&Tree, EditorError> {
        match self.errors.first() {
            Some(err) => Err(err.into()),
            None => Ok(&self.tree),
        }
    }

    /// Counterpart of the bracket, brace or string quote at `pos`.
    pub fn match_bracket(&self, pos: Position) -> Option<Position> {
        self.pairs.get(&pos).copied()
    }
}

/// Pairs from the tree: container delimiters, plus the quotes of every
/// string value and key.
fn tree_pairs(tree: &Tree) -> HashMap<Position, Position> {
    let mut pairs = HashMap::new();
    let mut link = |a: Position, b: Position| {
        pairs.insert(a, b);
        pairs.insert(b, a);
    };
    for id in tree.walk() {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Object(members) => {
                link(node.span.start, node.span.end);
                for member in members.values() {
                    link(member.key_span.start, member.key_span.end);
                }
            }
            NodeKind::Array(_) | NodeKind::String(_) => link(node.span.start, node.span.end),
            _ => {}
        }
    }
    pairs
}

/// Fallback for broken documents: a nesting-depth scan over raw tokens.
/// Closers that do not match the innermost opener are skipped.
fn token_pairs(doc: &Document) -> HashMap<Position, Position> {
    let mut pairs = HashMap::new();
    let mut stack: Vec<(TokenKind, Position)> = Vec::new();
    for token in tokenize(doc.lines(), 0) {
        match token.kind {
            TokenKind::LeftBrace | TokenKind::LeftBracket => stack.push((token.kind, token.start)),
            TokenKind::RightBrace | TokenKind::RightBracket => {
                let opener = if token.kind == TokenKind::RightBrace {
                    TokenKind::LeftBrace
                } else {
                    TokenKind::LeftBracket
                };
                if matches!(stack.last(), Some((kind, _)) if *kind == opener) {
                    if let Some((_, open)) = stack.pop() {
                        pairs.insert(open, token.start);
                        pairs.insert(token.start, open);
                    }
                }
            }
            TokenKind::String { terminated: true } if token.start != token.end => {
                pairs.insert(token.start, token.end);
                pairs.insert(token.end, token.start);
            }
            _ => {}
        }
    }
    pairs
}

/// Lazily rebuilt analysis for one session's document.
#[derive(Debug, Default)]
pub struct StructureCache {
    analysis: Option<Analysis>,
}

impl StructureCache {
    pub fn new() -> Self {
        Self { analysis: None }
    }

    /// Returns the analysis for the document's current version.
    pub fn get(&mut self, doc: &Document) -> &Analysis {
        let stale = self
            .analysis
            .as_ref()
            .map_or(true, |a| a.version != doc.version());
        if stale {
            self.analysis = None;
        }
        self.analysis.get_or_insert_with(|| Analysis::build(doc))
    }

    /// Drops the cached analysis.
    pub fn invalidate(&mut self) {
        self.analysis = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    #[test]
    fn test_bracket_pairs_are_symmetric() {
        let doc = Document::from_text(
            "{\n  \"a\": [1, {\"b\": 2}],\n  \"c\": \"x\"\n}",
            DocumentFormat::Json,
        );
        let analysis = Analysis::build(&doc);
        assert!(analysis.is_valid());
        for (&from, &to) in &analysis.pairs {
            assert_eq!(analysis.match_bracket(to), Some(from));
        }
        assert_eq!(
            analysis.match_bracket(Position::new(0, 0)),
            Some(Position::new(3, 0))
        );
        assert_eq!(
            analysis.match_bracket(Position::new(1, 7)),
            Some(Position::new(1, 19))
        );
    }

    #[test]
    fn test_no_match_on_plain_character() {
        let doc = Document::from_text("[1, 2]", DocumentFormat::Json);
        let analysis = Analysis::build(&doc);
        assert_eq!(analysis.match_bracket(Position::new(0, 1)), None);
    }

    #[test]
    fn test_fallback_scan_on_invalid_json() {
        let doc = Document::from_text("{\n  \"a\": [1, 2,,]\n", DocumentFormat::Json);
        let analysis = Analysis::build(&doc);
        assert!(!analysis.is_valid());
        assert!(analysis.tree().is_none());
        assert_eq!(
            analysis.match_bracket(Position::new(1, 7)),
            Some(Position::new(1, 14))
        );
        assert_eq!(analysis.match_bracket(Position::new(0, 0)), None);
    }

    #[test]
    fn test_cache_rebuilds_on_new_version() {
        let mut doc = Document::from_text("[1]", DocumentFormat::Json);
        let mut cache = StructureCache::new();
        assert!(cache.get(&doc).is_valid());

        doc.replace(0..1, vec!["[1".to_string()]);
        let analysis = cache.get(&doc);
        assert_eq!(analysis.version(), doc.version());
        assert!(!analysis.is_valid());
        assert!(matches!(
            analysis.require_tree(),
            Err(EditorError::InvalidJson { line: 1, .. })
        ));
    }
}
