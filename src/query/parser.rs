//! Path expression parser.

use super::ast::{JsonPath, PathSegment};
use super::error::QueryError;

/// Parser for path expressions such as `$.users[*].name`.
pub struct Parser {
    input: Vec<char>,
    position: usize,
}

impl Parser {
    /// Creates a new parser for the given path string.
    pub fn new(query: &str) -> Self {
        Self {
            input: query.chars().collect(),
            position: 0,
        }
    }

    /// Parses the path string into a [`JsonPath`].
    pub fn parse(query: &str) -> Result<JsonPath, QueryError> {
        let mut parser = Parser::new(query);
        let path = parser.parse_path()?;
        parser.skip_whitespace();
        if let Some(ch) = parser.peek() {
            return Err(QueryError::UnexpectedToken {
                position: parser.position,
                found: ch.to_string(),
                expected: "'.' or '['".to_string(),
            });
        }
        Ok(path)
    }

    fn parse_path(&mut self) -> Result<JsonPath, QueryError> {
        let mut segments = Vec::new();

        self.skip_whitespace();

        if self.peek() != Some('$') {
            return Err(QueryError::InvalidSyntax {
                message: "path must start with '$'".to_string(),
            });
        }
        self.next();
        segments.push(PathSegment::Root);

        while !self.is_eof() {
            self.skip_whitespace();
            match self.peek() {
                Some('.') => {
                    self.next();
                    if self.peek() == Some('.') {
                        segments.push(self.parse_recursive_descent()?);
                    } else if self.peek() == Some('*') {
                        self.next();
                        segments.push(PathSegment::Wildcard);
                    } else {
                        let name = self.parse_identifier()?;
                        segments.push(PathSegment::Child(name));
                    }
                }
                Some('[') => {
                    segments.push(self.parse_bracket_expression()?);
                }
                _ => break,
            }
        }

        Ok(JsonPath::new(segments))
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), QueryError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(QueryError::UnexpectedToken {
                position: pos,
                found: ch.to_string(),
                expected: format!("'{}'", expected),
            }),
            None => Err(QueryError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    fn parse_identifier(&mut self) -> Result<String, QueryError> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            Err(QueryError::InvalidSyntax {
                message: "expected identifier".to_string(),
            })
        } else {
            Ok(name)
        }
    }

    /// Parses the part after `..`.
    fn parse_recursive_descent(&mut self) -> Result<PathSegment, QueryError> {
        self.expect('.')?;
        match self.peek() {
            Some('[') => Ok(PathSegment::DescendantsOrSelf),
            Some('*') => {
                self.next();
                Ok(PathSegment::RecursiveDescent(None))
            }
            _ => {
                let name = self.parse_identifier()?;
                Ok(PathSegment::RecursiveDescent(Some(name)))
            }
        }
    }

    /// Parses bracket expression: [index], [start:end], ['key'], [*]
    fn parse_bracket_expression(&mut self) -> Result<PathSegment, QueryError> {
        self.expect('[')?;
        self.skip_whitespace();

        let segment = match self.peek() {
            Some('*') => {
                self.next();
                self.expect(']')?;
                PathSegment::Wildcard
            }
            Some('\'') | Some('"') => {
                let mut properties = self.parse_bracket_strings()?;
                self.expect(']')?;
                if properties.len() == 1 {
                    PathSegment::Child(properties.remove(0))
                } else {
                    PathSegment::MultiProperty(properties)
                }
            }
            Some('-') | Some('0'..='9') => {
                let looks_like_slice = self.input[self.position..]
                    .iter()
                    .take_while(|&&c| c != ']')
                    .any(|&c| c == ':');

                if looks_like_slice {
                    self.parse_slice()?
                } else {
                    let idx = self.parse_bracket_number()?;
                    self.expect(']')?;
                    PathSegment::Index(idx)
                }
            }
            Some(':') => self.parse_slice()?,
            Some(ch) => {
                return Err(QueryError::UnexpectedToken {
                    position: self.position,
                    found: ch.to_string(),
                    expected: "index, slice, '*' or quoted key".to_string(),
                })
            }
            None => {
                return Err(QueryError::UnexpectedEnd {
                    expected: "']'".to_string(),
                })
            }
        };

        Ok(segment)
    }

    /// Parses quoted string(s) inside brackets: ['key'] or ['key1','key2']
    fn parse_bracket_strings(&mut self) -> Result<Vec<String>, QueryError> {
        let mut properties = Vec::new();
        loop {
            self.skip_whitespace();
            let quote = match self.peek() {
                Some(q @ ('\'' | '"')) => {
                    self.next();
                    q
                }
                _ => break,
            };

            let mut value = String::new();
            loop {
                match self.next() {
                    Some(ch) if ch == quote => break,
                    Some('\\') => match self.next() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                        Some(_) | None => {
                            return Err(QueryError::InvalidSyntax {
                                message: "invalid escape sequence".to_string(),
                            })
                        }
                    },
                    Some(ch) => value.push(ch),
                    None => {
                        return Err(QueryError::UnexpectedEnd {
                            expected: format!("closing quote {}", quote),
                        })
                    }
                }
            }
            properties.push(value);

            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.next();
            } else {
                break;
            }
        }
        Ok(properties)
    }

    fn parse_bracket_number(&mut self) -> Result<isize, QueryError> {
        self.skip_whitespace();
        let mut num = String::new();
        if self.peek() == Some('-') {
            num.push('-');
            self.next();
        }
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            num.push(ch);
            self.next();
        }
        num.parse::<isize>().map_err(|_| QueryError::InvalidSyntax {
            message: format!("invalid number: '{}'", num),
        })
    }

    /// Parses array slice: [start:end], [start:], [:end], [:]
    fn parse_slice(&mut self) -> Result<PathSegment, QueryError> {
        self.skip_whitespace();
        let start = if self.peek() == Some(':') {
            None
        } else {
            Some(self.parse_bracket_number()?)
        };

        self.expect(':')?;
        self.skip_whitespace();

        let end = if self.peek() == Some(']') {
            None
        } else {
            Some(self.parse_bracket_number()?)
        };

        self.expect(']')?;

        if let (Some(s), Some(e)) = (start, end) {
            if s >= 0 && e >= 0 && s > e {
                return Err(QueryError::InvalidSyntax {
                    message: format!("invalid slice: start ({}) > end ({})", s, e),
                });
            }
        }

        Ok(PathSegment::Slice(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(query: &str) -> Vec<PathSegment> {
        Parser::parse(query).unwrap().segments
    }

    #[test]
    fn test_parse_root() {
        assert_eq!(segments("$"), vec![PathSegment::Root]);
    }

    #[test]
    fn test_parse_children_and_wildcard() {
        assert_eq!(
            segments("$.users[*].age"),
            vec![
                PathSegment::Root,
                PathSegment::Child("users".to_string()),
                PathSegment::Wildcard,
                PathSegment::Child("age".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_bracket_forms() {
        assert_eq!(
            segments("$['a b'][-1][1:3]['x','y']"),
            vec![
                PathSegment::Root,
                PathSegment::Child("a b".to_string()),
                PathSegment::Index(-1),
                PathSegment::Slice(Some(1), Some(3)),
                PathSegment::MultiProperty(vec!["x".to_string(), "y".to_string()]),
            ]
        );
        assert_eq!(segments("$[:2]")[1], PathSegment::Slice(None, Some(2)));
    }

    #[test]
    fn test_parse_recursive_descent() {
        assert_eq!(
            segments("$..name")[1],
            PathSegment::RecursiveDescent(Some("name".to_string()))
        );
        assert_eq!(segments("$..*")[1], PathSegment::RecursiveDescent(None));
        assert_eq!(
            segments("$..[0]"),
            vec![
                PathSegment::Root,
                PathSegment::DescendantsOrSelf,
                PathSegment::Index(0)
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Parser::parse("users"),
            Err(QueryError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            Parser::parse("$.a[1"),
            Err(QueryError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Parser::parse("$[3:1]"),
            Err(QueryError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            Parser::parse("$.a b"),
            Err(QueryError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_non_ascii_keys() {
        assert_eq!(segments("$.héllo")[1], PathSegment::Child("héllo".to_string()));
    }
}
