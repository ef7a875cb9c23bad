//! Recursive-descent parser from tokens to the arena [`Tree`].
//!
//! Parse failures are collected as [`ValidationError`]s instead of aborting,
//! so the editor stays usable on broken text. JSON Lines documents are parsed
//! record by record; a broken record does not hide the others' errors.

use super::lexer::{tokenize, Token, TokenKind};
use super::tree::{Member, Node, NodeId, NodeKind, PathStep, Span, Tree};
use crate::document::{Document, DocumentFormat, Position};
use crate::error::EditorError;
use indexmap::IndexMap;
use serde_json::Value;

/// Nesting depth at which parsing gives up.
pub const MAX_DEPTH: usize = 512;

/// A parse problem at a 0-based location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl From<&ValidationError> for EditorError {
    fn from(err: &ValidationError) -> Self {
        EditorError::InvalidJson {
            line: err.line + 1,
            column: err.col + 1,
            message: err.message.clone(),
        }
    }
}

/// Parses the whole document.
pub fn parse_document(doc: &Document) -> (Tree, Vec<ValidationError>) {
    let jsonl = doc.format() == DocumentFormat::Jsonl;
    let mut tree = Tree::new(jsonl);
    let mut errors = Vec::new();

    if jsonl {
        for (index, record) in doc.records().iter().enumerate() {
            let lines = &doc.lines()[record.start..=record.end];
            let tokens = tokenize(lines, record.start);
            let end = Position::new(record.end, doc.line_len(record.end));
            parse_root(&mut tree, &tokens, end, index, &mut errors);
        }
    } else {
        let tokens = tokenize(doc.lines(), 0);
        let last = doc.line_count() - 1;
        let end = Position::new(last, doc.line_len(last));
        parse_root(&mut tree, &tokens, end, 0, &mut errors);
    }
    (tree, errors)
}

/// Parses `text` as a single JSON value with the validator's depth limit.
pub fn parse_value(text: &str) -> Result<Value, ValidationError> {
    let doc = Document::from_text(text, DocumentFormat::Json);
    let (tree, errors) = parse_document(&doc);
    if let Some(err) = errors.into_iter().next() {
        return Err(err);
    }
    let &(_, root) = tree
        .roots()
        .first()
        .ok_or_else(|| error_at(Position::default(), "unexpected end of input".to_string()))?;
    Ok(tree.to_value(root))
}

fn parse_root(
    tree: &mut Tree,
    tokens: &[Token],
    eof: Position,
    record: usize,
    errors: &mut Vec<ValidationError>,
) {
    let mark = tree.nodes.len();
    let step = tree.is_jsonl().then_some(PathStep::Index(record));
    let mut parser = Parser {
        tokens,
        pos: 0,
        eof,
        tree: &mut *tree,
        depth: 0,
    };
    let result = parser.parse_value(None, step).and_then(|root| {
        match parser.tokens.get(parser.pos) {
            Some(extra) => Err(error_at(extra.start, format!("unexpected '{}' after value", extra.text))),
            None => Ok(root),
        }
    });
    match result {
        Ok(root) => tree.roots.push((record, root)),
        Err(err) => {
            tree.nodes.truncate(mark);
            errors.push(err);
        }
    }
}

fn error_at(pos: Position, message: String) -> ValidationError {
    ValidationError {
        line: pos.line,
        col: pos.col,
        message,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Position,
    tree: &'a mut Tree,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&'a Token, ValidationError> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| error_at(self.eof, "unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'a Token, ValidationError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(error_at(
                token.start,
                format!("expected {}, found '{}'", what, token.text),
            ))
        }
    }

    /// Reserves a node slot so ids follow pre-order.
    fn alloc(&mut self, start: Position, parent: Option<NodeId>, step: Option<PathStep>) -> NodeId {
        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(Node {
            kind: NodeKind::Null,
            span: Span { start, end: start },
            parent,
            step,
        });
        id
    }

    fn finish(&mut self, id: NodeId, kind: NodeKind, end: Position) {
        let node = &mut self.tree.nodes[id.0];
        node.kind = kind;
        node.span.end = end;
    }

    fn parse_value(
        &mut self,
        parent: Option<NodeId>,
        step: Option<PathStep>,
    ) -> Result<NodeId, ValidationError> {
        let token = self.next()?;
        let id = self.alloc(token.start, parent, step);
        match token.kind {
            TokenKind::LeftBrace => {
                self.enter(token)?;
                let (members, end) = self.parse_members(id)?;
                self.depth -= 1;
                self.finish(id, NodeKind::Object(members), end);
            }
            TokenKind::LeftBracket => {
                self.enter(token)?;
                let (items, end) = self.parse_items(id)?;
                self.depth -= 1;
                self.finish(id, NodeKind::Array(items), end);
            }
            TokenKind::String { .. } => {
                let value = decode_string(token)?;
                self.finish(id, NodeKind::String(value), token.end);
            }
            TokenKind::Number => {
                if token.text.parse::<serde_json::Number>().is_err() {
                    return Err(error_at(
                        token.start,
                        format!("invalid number '{}'", token.text),
                    ));
                }
                self.finish(id, NodeKind::Number(token.text.clone()), token.end);
            }
            TokenKind::True => self.finish(id, NodeKind::Bool(true), token.end),
            TokenKind::False => self.finish(id, NodeKind::Bool(false), token.end),
            TokenKind::Null => self.finish(id, NodeKind::Null, token.end),
            _ => {
                return Err(error_at(
                    token.start,
                    format!("expected value, found '{}'", token.text),
                ))
            }
        }
        Ok(id)
    }

    fn enter(&mut self, token: &Token) -> Result<(), ValidationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(error_at(token.start, "nesting too deep".to_string()));
        }
        Ok(())
    }

    fn parse_members(
        &mut self,
        id: NodeId,
    ) -> Result<(IndexMap<String, Member>, Position), ValidationError> {
        let mut members = IndexMap::new();
        if let Some(close) = self.peek().filter(|t| t.kind == TokenKind::RightBrace) {
            self.pos += 1;
            return Ok((members, close.start));
        }
        loop {
            let key_token = self.next()?;
            if !matches!(key_token.kind, TokenKind::String { .. }) {
                return Err(error_at(
                    key_token.start,
                    format!("expected string key, found '{}'", key_token.text),
                ));
            }
            let key = decode_string(key_token)?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_value(Some(id), Some(PathStep::Key(key.clone())))?;
            members.insert(
                key,
                Member {
                    key_span: Span {
                        start: key_token.start,
                        end: key_token.end,
                    },
                    value,
                },
            );

            let sep = self.next()?;
            match sep.kind {
                TokenKind::Comma => continue,
                TokenKind::RightBrace => return Ok((members, sep.start)),
                _ => {
                    return Err(error_at(
                        sep.start,
                        format!("expected ',' or '}}', found '{}'", sep.text),
                    ))
                }
            }
        }
    }

    fn parse_items(&mut self, id: NodeId) -> Result<(Vec<NodeId>, Position), ValidationError> {
        let mut items = Vec::new();
        if let Some(close) = self.peek().filter(|t| t.kind == TokenKind::RightBracket) {
            self.pos += 1;
            return Ok((items, close.start));
        }
        loop {
            let index = PathStep::Index(items.len());
            items.push(self.parse_value(Some(id), Some(index))?);
            let sep = self.next()?;
            match sep.kind {
                TokenKind::Comma => continue,
                TokenKind::RightBracket => return Ok((items, sep.start)),
                _ => {
                    return Err(error_at(
                        sep.start,
                        format!("expected ',' or ']', found '{}'", sep.text),
                    ))
                }
            }
        }
    }
}

fn decode_string(token: &Token) -> Result<String, ValidationError> {
    if token.kind != (TokenKind::String { terminated: true }) {
        return Err(error_at(token.start, "unterminated string".to_string()));
    }
    serde_json::from_str::<String>(&token.text)
        .map_err(|e| error_at(token.start, format!("invalid string: {}", e)))
}
