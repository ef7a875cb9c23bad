//! Path evaluation over the arena tree.

use super::ast::PathSegment;
use crate::structure::{NodeId, NodeKind, Tree};

pub struct Evaluator<'a> {
    tree: &'a Tree,
}

impl<'a> Evaluator<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Evaluator { tree }
    }

    /// Evaluates `segments` against every root and returns the matching
    /// nodes in document order, without duplicates.
    pub fn evaluate(&self, segments: &[PathSegment]) -> Vec<NodeId> {
        let mut results = Vec::new();
        for &(_, root) in self.tree.roots() {
            results.extend(self.evaluate_from(root, segments));
        }
        results.sort();
        results.dedup();
        results
    }

    /// Evaluates `segments` with `root` as `$`.
    pub fn evaluate_from(&self, root: NodeId, segments: &[PathSegment]) -> Vec<NodeId> {
        if segments.is_empty() {
            return vec![];
        }

        let mut current = vec![root];
        for segment in segments {
            let mut next = Vec::new();
            for &node in &current {
                next.extend(self.evaluate_segment(root, node, segment));
            }
            current = next;
        }
        current
    }

    fn evaluate_segment(&self, root: NodeId, node: NodeId, segment: &PathSegment) -> Vec<NodeId> {
        match segment {
            PathSegment::Root => vec![root],
            PathSegment::Child(name) => self.find_child(node, name),
            PathSegment::Index(idx) => self.get_array_element(node, *idx),
            PathSegment::Wildcard => self.tree.children(node),
            PathSegment::RecursiveDescent(prop) => {
                let mut results = Vec::new();
                self.recursive_descent(node, prop.as_deref(), &mut results);
                results
            }
            PathSegment::DescendantsOrSelf => {
                let mut results = vec![node];
                self.recursive_descent(node, None, &mut results);
                results
            }
            PathSegment::Slice(start, end) => self.get_slice(node, *start, *end),
            PathSegment::MultiProperty(props) => props
                .iter()
                .flat_map(|prop| self.find_child(node, prop))
                .collect(),
        }
    }

    fn find_child(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        match &self.tree.node(node).kind {
            NodeKind::Object(members) => members.get(name).map(|m| m.value).into_iter().collect(),
            _ => vec![],
        }
    }

    fn get_array_element(&self, node: NodeId, idx: isize) -> Vec<NodeId> {
        if let NodeKind::Array(items) = &self.tree.node(node).kind {
            let len = items.len() as isize;
            let normalized = if idx < 0 { len + idx } else { idx };
            if normalized >= 0 && normalized < len {
                return vec![items[normalized as usize]];
            }
        }
        vec![]
    }

    fn get_slice(&self, node: NodeId, start: Option<isize>, end: Option<isize>) -> Vec<NodeId> {
        if let NodeKind::Array(items) = &self.tree.node(node).kind {
            let len = items.len() as isize;
            let clamp = |i: isize| -> usize {
                let i = if i < 0 { (len + i).max(0) } else { i.min(len) };
                i as usize
            };
            let start_idx = start.map(clamp).unwrap_or(0);
            let end_idx = end.map(clamp).unwrap_or(items.len());
            if start_idx <= end_idx {
                return items[start_idx..end_idx].to_vec();
            }
        }
        vec![]
    }

    /// Collects descendants of `node` (not `node` itself). With a name, only
    /// members with that key are collected.
    fn recursive_descent(&self, node: NodeId, prop: Option<&str>, results: &mut Vec<NodeId>) {
        match &self.tree.node(node).kind {
            NodeKind::Object(members) => {
                for (key, member) in members {
                    if prop.map_or(true, |name| name == key) {
                        results.push(member.value);
                    }
                    self.recursive_descent(member.value, prop, results);
                }
            }
            NodeKind::Array(items) => {
                for &item in items {
                    if prop.is_none() {
                        results.push(item);
                    }
                    self.recursive_descent(item, prop, results);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentFormat};
    use crate::query::parser::Parser;
    use crate::structure::parser::parse_document;

    const STORE: &str = r#"{"store": {"book": [{"author": "A", "price": 8}, {"author": "B", "price": 12}, {"author": "C"}], "bike": {"price": 20}}}"#;

    fn eval(text: &str, query: &str) -> Vec<serde_json::Value> {
        let (tree, errors) = parse_document(&Document::from_text(text, DocumentFormat::Json));
        assert!(errors.is_empty());
        let path = Parser::parse(query).unwrap();
        Evaluator::new(&tree)
            .evaluate(&path.segments)
            .into_iter()
            .map(|id| tree.to_value(id))
            .collect()
    }

    #[test]
    fn test_evaluate_root() {
        assert_eq!(eval("[1]", "$"), vec![serde_json::json!([1])]);
    }

    #[test]
    fn test_evaluate_child_and_index() {
        assert_eq!(eval(STORE, "$.store.book[1].author"), vec![serde_json::json!("B")]);
        assert_eq!(eval(STORE, "$.store.book[-1].author"), vec![serde_json::json!("C")]);
        assert!(eval(STORE, "$.store.book[7]").is_empty());
    }

    #[test]
    fn test_evaluate_wildcard() {
        assert_eq!(
            eval(STORE, "$.store.book[*].author"),
            vec![
                serde_json::json!("A"),
                serde_json::json!("B"),
                serde_json::json!("C")
            ]
        );
    }

    #[test]
    fn test_recursive_descent_is_in_document_order() {
        assert_eq!(
            eval(STORE, "$..price"),
            vec![
                serde_json::json!(8),
                serde_json::json!(12),
                serde_json::json!(20)
            ]
        );
    }

    #[test]
    fn test_descendants_or_self_with_index() {
        assert_eq!(eval("[[1, 2], [3]]", "$..[0]").len(), 3);
    }

    #[test]
    fn test_slice_and_multi_property() {
        assert_eq!(eval("[0, 1, 2, 3]", "$[1:3]"), vec![serde_json::json!(1), serde_json::json!(2)]);
        assert_eq!(eval("[0, 1, 2, 3]", "$[-2:]").len(), 2);
        assert_eq!(
            eval(r#"{"a": 1, "b": 2, "c": 3}"#, "$['c','a']"),
            vec![serde_json::json!(1), serde_json::json!(3)]
        );
    }

    #[test]
    fn test_jsonl_evaluates_each_record() {
        let doc = Document::from_text(
            "{\"name\": \"Alice\"}\n\n{\"name\": \"Bob\"}",
            DocumentFormat::Jsonl,
        );
        let (tree, _) = parse_document(&doc);
        let path = Parser::parse("$.name").unwrap();
        let found = Evaluator::new(&tree).evaluate(&path.segments);
        assert_eq!(found.len(), 2);
        assert_eq!(tree.node(found[1]).as_str(), Some("Bob"));
    }
}
