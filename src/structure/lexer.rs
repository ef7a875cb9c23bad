//! Line-oriented JSON tokenizer.
//!
//! Tokens carry inclusive start/end positions. Strings never span lines: a
//! string with no closing quote on its line is reported as unterminated.

use crate::document::Position;

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    String { terminated: bool },
    Number,
    True,
    False,
    Null,
    /// Anything else: a stray character or an unknown bare word.
    Invalid,
}

/// A token with its source text and inclusive span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn is_opening(&self) -> bool {
        matches!(self.kind, TokenKind::LeftBrace | TokenKind::LeftBracket)
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.kind, TokenKind::RightBrace | TokenKind::RightBracket)
    }
}

/// Tokenizes `lines`, numbering them from `first_line`.
pub fn tokenize(lines: &[String], first_line: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (offset, line) in lines.iter().enumerate() {
        tokenize_line(line, first_line + offset, &mut tokens);
    }
    tokens
}

fn tokenize_line(line: &str, line_no: usize, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        let kind = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '"' => {
                i += 1;
                let mut terminated = false;
                while i < chars.len() {
                    match chars[i] {
                        '\\' => i += 2,
                        '"' => {
                            terminated = true;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                i = i.min(chars.len().saturating_sub(1));
                TokenKind::String { terminated }
            }
            '-' | '0'..='9' => {
                while i + 1 < chars.len()
                    && matches!(chars[i + 1], '0'..='9' | '.' | 'e' | 'E' | '+' | '-')
                {
                    i += 1;
                }
                TokenKind::Number
            }
            c if c.is_alphabetic() => {
                while i + 1 < chars.len() && chars[i + 1].is_alphanumeric() {
                    i += 1;
                }
                let word: String = chars[start..=i].iter().collect();
                match word.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "null" => TokenKind::Null,
                    _ => TokenKind::Invalid,
                }
            }
            _ => TokenKind::Invalid,
        };
        tokens.push(Token {
            kind,
            text: chars[start..=i].iter().collect(),
            start: Position::new(line_no, start),
            end: Position::new(line_no, i),
        });
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(&[text.to_string()], 0)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_and_literals() {
        assert_eq!(
            kinds(r#"{"a": [1, -2.5e3, true, null]}"#),
            vec![
                TokenKind::LeftBrace,
                TokenKind::String { terminated: true },
                TokenKind::Colon,
                TokenKind::LeftBracket,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::True,
                TokenKind::Comma,
                TokenKind::Null,
                TokenKind::RightBracket,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn test_string_span_and_escapes() {
        let tokens = tokenize(&[r#"  "a\"b" x"#.to_string()], 4);
        assert_eq!(tokens[0].kind, TokenKind::String { terminated: true });
        assert_eq!(tokens[0].text, r#""a\"b""#);
        assert_eq!(tokens[0].start, Position::new(4, 2));
        assert_eq!(tokens[0].end, Position::new(4, 7));
        assert_eq!(tokens[1].kind, TokenKind::Invalid);
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let tokens = tokenize(&["\"abc".to_string(), "}".to_string()], 0);
        assert_eq!(tokens[0].kind, TokenKind::String { terminated: false });
        assert_eq!(tokens[0].end, Position::new(0, 3));
        assert_eq!(tokens[1].kind, TokenKind::RightBrace);
    }

    #[test]
    fn test_trailing_backslash_does_not_overrun() {
        let tokens = tokenize(&["\"ab\\".to_string()], 0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "\"ab\\");
    }
}
