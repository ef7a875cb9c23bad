//! Plain text search over the raw document lines.

use super::Match;
use crate::document::char_len;
use regex::{Regex, RegexBuilder};

/// Builds the search regex, honouring smart case and the `\c` / `\C`
/// suffixes (force insensitive / sensitive).
pub fn compile(pattern: &str, smart_case: bool) -> Result<Regex, regex::Error> {
    let (body, insensitive) = if let Some(body) = pattern.strip_suffix("\\c") {
        (body, true)
    } else if let Some(body) = pattern.strip_suffix("\\C") {
        (body, false)
    } else {
        (pattern, smart_case && !pattern.chars().any(char::is_uppercase))
    };
    RegexBuilder::new(body).case_insensitive(insensitive).build()
}

/// Every non-empty match, line by line, left to right.
pub fn search(lines: &[String], regex: &Regex) -> Vec<Match> {
    let mut matches = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        for m in regex.find_iter(line) {
            if m.start() == m.end() {
                continue;
            }
            let col_start = char_len(&line[..m.start()]);
            matches.push(Match {
                line: line_no,
                col_start,
                col_end: col_start + char_len(m.as_str()),
                path: None,
            });
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_smart_case() {
        assert!(compile("name", true).unwrap().is_match("NAME"));
        assert!(!compile("Name", true).unwrap().is_match("NAME"));
        assert!(!compile("name", false).unwrap().is_match("NAME"));
    }

    #[test]
    fn test_case_suffixes() {
        assert!(compile("Name\\c", true).unwrap().is_match("NAME"));
        assert!(!compile("name\\C", true).unwrap().is_match("NAME"));
    }

    #[test]
    fn test_search_reports_char_columns() {
        let found = search(&lines("{\"é\": \"ab\",\n \"x\": \"ab\"}"), &compile("ab", true).unwrap());
        assert_eq!(found.len(), 2);
        assert_eq!((found[0].line, found[0].col_start, found[0].col_end), (0, 7, 9));
        assert_eq!((found[1].line, found[1].col_start), (1, 7));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(compile("(", true).is_err());
    }
}
