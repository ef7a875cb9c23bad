//! Pretty-printing and minification of JSON and JSON Lines text.
//!
//! Values are parsed with `serde_json` (with key order and number text
//! preserved), so a round trip keeps the document's member order and numeric
//! spelling.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Serializes a value with `indent` spaces per level.
pub fn pretty(value: &Value, indent: usize) -> String {
    let indent_str = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent_str.as_bytes());
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    // Serializing a `Value` into a Vec cannot fail.
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}

/// Parses `text` and pretty-prints it.
pub fn pretty_text(text: &str, indent: usize) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok(pretty(&value, indent))
}

/// Parses `text` and serializes it without whitespace.
pub fn minify(text: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    serde_json::to_string(&value)
}

/// Collapses every run of whitespace to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits lines into blocks of consecutive non-blank lines.
pub fn split_blocks(lines: &[String]) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.clone());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Turns on-disk JSON Lines text into the editing layout: every record
/// pretty-printed, records separated by one blank line.
///
/// Lines that do not parse are kept as they are.
pub fn jsonl_to_pretty(text: &str, indent: usize) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| pretty_text(line, indent).unwrap_or_else(|_| line.to_string()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Turns the editing layout back into JSON Lines: one minified record per
/// line, in record order.
///
/// A block that does not parse is written with its whitespace collapsed.
pub fn pretty_to_jsonl(lines: &[String]) -> String {
    split_blocks(lines)
        .into_iter()
        .map(|block| {
            let text = block.join("\n");
            minify(&text).unwrap_or_else(|_| collapse_whitespace(&text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reformats a whole document: a JSON document is pretty-printed, a JSONL
/// document has every record pretty-printed and blank-line separated.
///
/// Fails on the first record that does not parse.
pub fn format_lines(
    lines: &[String],
    jsonl: bool,
    indent: usize,
) -> Result<Vec<String>, serde_json::Error> {
    let text = if jsonl {
        let mut records = Vec::new();
        for block in split_blocks(lines) {
            records.push(pretty_text(&block.join("\n"), indent)?);
        }
        records.join("\n\n")
    } else {
        pretty_text(&lines.join("\n"), indent)?
    };
    Ok(text.lines().map(str::to_string).collect())
}

/// Encodes `text` as a JSON string literal, quotes included.
pub fn to_string_literal(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_uses_requested_indent() {
        let value: Value = serde_json::from_str(r#"{"a":[1,2]}"#).unwrap();
        assert_eq!(pretty(&value, 4), "{\n    \"a\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn test_minify_preserves_key_order_and_numbers() {
        let out = minify("{ \"z\": 1.50, \"a\": 2 }").unwrap();
        assert_eq!(out, r#"{"z":1.50,"a":2}"#);
    }

    #[test]
    fn test_jsonl_layout_round_trip() {
        let input = "{\"name\":\"Alice\",\"age\":30}\n{\"name\":\"Bob\",\"age\":25}\n";
        let pretty = jsonl_to_pretty(input, 2);
        assert!(pretty.contains("\n\n"));

        let lines: Vec<String> = pretty.lines().map(str::to_string).collect();
        assert_eq!(
            pretty_to_jsonl(&lines),
            "{\"name\":\"Alice\",\"age\":30}\n{\"name\":\"Bob\",\"age\":25}"
        );
    }

    #[test]
    fn test_unparsable_block_collapses_whitespace() {
        let lines: Vec<String> = vec!["{ \"a\":".into(), "   oops }".into()];
        assert_eq!(pretty_to_jsonl(&lines), "{ \"a\": oops }");
    }

    #[test]
    fn test_format_lines_rejects_invalid() {
        let lines: Vec<String> = vec!["{\"a\": }".into()];
        assert!(format_lines(&lines, false, 2).is_err());
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(to_string_literal(r#"{"a":"b"}"#), r#""{\"a\":\"b\"}""#);
    }
}
