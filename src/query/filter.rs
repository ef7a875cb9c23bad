//! Splitting a query into path and comparison, and applying the comparison.

use super::ast::{CompareOp, Filter, Query};
use super::error::QueryError;
use super::parser::Parser;
use crate::structure::{NodeId, NodeKind, Tree};
use regex::Regex;
use serde_json::Value;

/// Parses a full query: `path [op operand]`.
pub fn parse_query(input: &str) -> Result<Query, QueryError> {
    let (path_text, filter) = match split_comparison(input) {
        Some((op, at)) => {
            let operand_text = &input[at + op.symbol().len()..];
            (&input[..at], Some(build_filter(op, operand_text)?))
        }
        None => (input, None),
    };
    let path = Parser::parse(path_text.trim_end())?;
    Ok(Query { path, filter })
}

/// Finds the comparison operator: the first operator in scan order that
/// occurs outside brackets and quotes, and its byte offset.
pub fn split_comparison(input: &str) -> Option<(CompareOp, usize)> {
    let outside = outside_positions(input);
    CompareOp::SCAN_ORDER.iter().find_map(|&op| {
        input
            .match_indices(op.symbol())
            .map(|(at, _)| at)
            .find(|at| outside.contains(at))
            .map(|at| (op, at))
    })
}

/// Byte offsets that are not inside `[...]` or a quoted string.
fn outside_positions(input: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Parses an operand as JSON, then as a single-quoted string, then as raw
/// text.
pub fn parse_operand(text: &str) -> Value {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return value;
    }
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return Value::String(text[1..text.len() - 1].to_string());
    }
    Value::String(text.to_string())
}

fn build_filter(op: CompareOp, operand_text: &str) -> Result<Filter, QueryError> {
    let operand = parse_operand(operand_text);
    let regex = if op == CompareOp::Match {
        let pattern = match &operand {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(Regex::new(&pattern).map_err(|e| QueryError::InvalidRegex {
            message: e.to_string(),
        })?)
    } else {
        None
    };
    Ok(Filter {
        op,
        operand,
        regex,
    })
}

/// String form of a node: the content of a string, otherwise the minified
/// serialization.
pub fn string_form(tree: &Tree, id: NodeId) -> String {
    match &tree.node(id).kind {
        NodeKind::String(s) => s.clone(),
        _ => tree.canonical(id),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn node_numeric(tree: &Tree, id: NodeId) -> Option<f64> {
    match &tree.node(id).kind {
        NodeKind::Number(raw) => raw.parse::<f64>().ok(),
        NodeKind::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Value equality that ignores object key order and compares numbers by
/// value, so `{"a":2}` equals `{"a":2.0}`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| values_equal(v, w))
        }
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q)
        }
        _ => a == b,
    }
}

fn equals(tree: &Tree, id: NodeId, operand: &Value) -> bool {
    let node = tree.node(id);
    match (&node.kind, operand) {
        (NodeKind::Object(_) | NodeKind::Array(_), _) => {
            let expected = match operand {
                Value::String(s) => match serde_json::from_str::<Value>(s) {
                    Ok(value) => value,
                    Err(_) => return false,
                },
                other => other.clone(),
            };
            values_equal(&tree.to_value(id), &expected)
        }
        (NodeKind::String(s), Value::String(o)) => s == o,
        (NodeKind::Number(_), Value::Number(_)) => {
            matches!((node_numeric(tree, id), numeric(operand)), (Some(a), Some(b)) if a == b)
        }
        (NodeKind::Bool(b), Value::Bool(o)) => b == o,
        (NodeKind::Null, Value::Null) => true,
        _ => false,
    }
}

/// Applies a filter to one node.
pub fn matches(tree: &Tree, id: NodeId, filter: &Filter) -> bool {
    let ordered = |cmp: fn(f64, f64) -> bool| {
        match (node_numeric(tree, id), numeric(&filter.operand)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    };
    match filter.op {
        CompareOp::Eq => equals(tree, id, &filter.operand),
        CompareOp::Ne => !equals(tree, id, &filter.operand),
        CompareOp::Gt => ordered(|a, b| a > b),
        CompareOp::Lt => ordered(|a, b| a < b),
        CompareOp::Ge => ordered(|a, b| a >= b),
        CompareOp::Le => ordered(|a, b| a <= b),
        CompareOp::Match => filter
            .regex
            .as_ref()
            .is_some_and(|re| re.is_match(&string_form(tree, id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::PathSegment;

    #[test]
    fn test_split_prefers_two_char_operators() {
        assert_eq!(split_comparison("$.a>=3"), Some((CompareOp::Ge, 3)));
        assert_eq!(split_comparison("$.a!=3"), Some((CompareOp::Ne, 3)));
        assert_eq!(split_comparison("$.a=3"), Some((CompareOp::Eq, 3)));
        assert_eq!(split_comparison("$.a"), None);
    }

    #[test]
    fn test_split_ignores_operators_in_brackets() {
        assert_eq!(split_comparison("$['a=b']"), None);
        assert_eq!(split_comparison("$['a>b'] < 4"), Some((CompareOp::Lt, 9)));
    }

    #[test]
    fn test_parse_query_with_filter() {
        let query = parse_query("$.users[*].age > 30").unwrap();
        assert_eq!(query.path.segments.len(), 4);
        assert_eq!(query.path.segments[3], PathSegment::Child("age".to_string()));
        let filter = query.filter.unwrap();
        assert_eq!(filter.op, CompareOp::Gt);
        assert_eq!(filter.operand, serde_json::json!(30));
    }

    #[test]
    fn test_operand_forms() {
        assert_eq!(parse_operand("\"x\""), Value::String("x".to_string()));
        assert_eq!(parse_operand("'x y'"), Value::String("x y".to_string()));
        assert_eq!(parse_operand("abc"), Value::String("abc".to_string()));
        assert_eq!(parse_operand("true"), Value::Bool(true));
    }

    #[test]
    fn test_invalid_regex_operand() {
        assert!(matches!(
            parse_query("$.a ~ ("),
            Err(QueryError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_values_equal_ignores_key_order_and_number_spelling() {
        let a = serde_json::json!({"a": 2, "b": [1, {"c": null}]});
        let b: Value = serde_json::from_str(r#"{"b": [1.0, {"c": null}], "a": 2.0}"#).unwrap();
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &serde_json::json!({"a": 2})));
        assert!(!values_equal(&serde_json::json!([1, 2]), &serde_json::json!([2, 1])));
    }
}
