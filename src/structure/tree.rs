//! Arena tree of parsed JSON values.
//!
//! Nodes are addressed by [`NodeId`]. Ids are handed out in pre-order, so
//! comparing ids compares document order. A tree belongs to one document
//! version and is thrown away when the document changes.

use crate::document::Position;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Inclusive source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }
}

/// An object member: key span plus the value node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub key_span: Span,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Object(IndexMap<String, Member>),
    Array(Vec<NodeId>),
    /// Decoded string content.
    String(String),
    /// Number as written in the source.
    Number(String),
    Bool(bool),
    Null,
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Object(_) => "object",
            NodeKind::Array(_) => "array",
            NodeKind::String(_) => "string",
            NodeKind::Number(_) => "number",
            NodeKind::Bool(_) => "boolean",
            NodeKind::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    /// Key or index under the parent. A JSON Lines root holds its record
    /// index.
    pub step: Option<PathStep>,
}

impl Node {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Object(_) | NodeKind::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One step of a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Path from a root to a node. In JSON Lines documents the first step is
/// the record index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(pub Vec<PathStep>);

impl NodePath {
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    /// Formats the path in query syntax, e.g. `$.users[1].age`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            match step {
                PathStep::Index(i) => write!(f, "[{}]", i)?,
                PathStep::Key(k)
                    if !k.is_empty()
                        && k.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') =>
                {
                    write!(f, ".{}", k)?
                }
                PathStep::Key(k) => write!(f, "['{}']", k.replace('\'', "\\'"))?,
            }
        }
        Ok(())
    }
}

/// The parsed document. `roots` holds one entry per JSON Lines record, or a
/// single entry for a JSON document.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<(usize, NodeId)>,
    pub(crate) jsonl: bool,
}

impl Tree {
    pub fn new(jsonl: bool) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            jsonl,
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_jsonl(&self) -> bool {
        self.jsonl
    }

    /// Root nodes with the record index they were parsed from.
    pub fn roots(&self) -> &[(usize, NodeId)] {
        &self.roots
    }

    /// Children of a container in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).kind {
            NodeKind::Object(members) => members.values().map(|m| m.value).collect(),
            NodeKind::Array(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Every node reachable from the roots, in document order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &(_, root) in &self.roots {
            self.walk_from(root, &mut out);
        }
        out
    }

    fn walk_from(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.children(id) {
            self.walk_from(child, out);
        }
    }

    /// Structural path of `id`.
    pub fn path_of(&self, id: NodeId) -> NodePath {
        let mut steps = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if let Some(step) = &node.step {
                steps.push(step.clone());
            }
            current = node.parent;
        }
        steps.reverse();
        NodePath(steps)
    }

    /// Looks a path up again, typically against a newer tree.
    pub fn resolve(&self, path: &NodePath) -> Option<NodeId> {
        let mut steps = path.steps().iter();
        let mut current = if self.jsonl {
            match steps.next()? {
                PathStep::Index(record) => {
                    self.roots.iter().find(|(r, _)| r == record).map(|(_, id)| *id)?
                }
                PathStep::Key(_) => return None,
            }
        } else {
            self.roots.first()?.1
        };
        for step in steps {
            current = match (&self.node(current).kind, step) {
                (NodeKind::Object(members), PathStep::Key(k)) => members.get(k)?.value,
                (NodeKind::Array(items), PathStep::Index(i)) => *items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Innermost node whose span contains `pos`. A position on an object key
    /// resolves to that member's value.
    pub fn node_at(&self, pos: Position) -> Option<NodeId> {
        let &(_, root) = self
            .roots
            .iter()
            .find(|(_, r)| self.node(*r).span.contains(pos))?;
        let mut current = root;
        'descend: loop {
            match &self.node(current).kind {
                NodeKind::Object(members) => {
                    for member in members.values() {
                        if member.key_span.contains(pos) {
                            return Some(member.value);
                        }
                        if self.node(member.value).span.contains(pos) {
                            current = member.value;
                            continue 'descend;
                        }
                    }
                }
                NodeKind::Array(items) => {
                    for &item in items {
                        if self.node(item).span.contains(pos) {
                            current = item;
                            continue 'descend;
                        }
                    }
                }
                _ => {}
            }
            return Some(current);
        }
    }

    /// Converts a node back into a `serde_json::Value`.
    pub fn to_value(&self, id: NodeId) -> Value {
        match &self.node(id).kind {
            NodeKind::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(k, m)| (k.clone(), self.to_value(m.value)))
                    .collect(),
            ),
            NodeKind::Array(items) => {
                Value::Array(items.iter().map(|&c| self.to_value(c)).collect())
            }
            NodeKind::String(s) => Value::String(s.clone()),
            NodeKind::Number(raw) => raw
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            NodeKind::Bool(b) => Value::Bool(*b),
            NodeKind::Null => Value::Null,
        }
    }

    /// Minified serialization of a node.
    pub fn canonical(&self, id: NodeId) -> String {
        self.to_value(id).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = NodePath(vec![
            PathStep::Key("users".into()),
            PathStep::Index(1),
            PathStep::Key("first name".into()),
        ]);
        assert_eq!(path.to_string(), "$.users[1]['first name']");
        assert_eq!(NodePath::default().to_string(), "$");
    }

    #[test]
    fn test_span_contains_across_lines() {
        let span = Span {
            start: Position::new(1, 4),
            end: Position::new(3, 0),
        };
        assert!(span.contains(Position::new(2, 99)));
        assert!(span.contains(Position::new(1, 4)));
        assert!(!span.contains(Position::new(1, 3)));
        assert!(!span.contains(Position::new(3, 1)));
        assert!(span.is_multiline());
    }
}
