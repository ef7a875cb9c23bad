//! Error types for query parsing.

use std::fmt;

/// Errors that can occur while parsing a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Unexpected token at a specific position.
    UnexpectedToken {
        position: usize,
        found: String,
        expected: String,
    },
    /// Unexpected end of input.
    UnexpectedEnd { expected: String },
    /// Invalid syntax with description.
    InvalidSyntax { message: String },
    /// The operand of `~` is not a valid regular expression.
    InvalidRegex { message: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnexpectedToken {
                position,
                found,
                expected,
            } => write!(
                f,
                "Unexpected token '{}' at position {}, expected {}",
                found, position, expected
            ),
            QueryError::UnexpectedEnd { expected } => {
                write!(f, "Unexpected end of input, expected {}", expected)
            }
            QueryError::InvalidSyntax { message } => {
                write!(f, "Invalid path syntax: {}", message)
            }
            QueryError::InvalidRegex { message } => write!(f, "Invalid regex: {}", message),
        }
    }
}

impl std::error::Error for QueryError {}
