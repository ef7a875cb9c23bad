//! Error kinds surfaced by the editing core.
//!
//! Every variant is recoverable: the session that produced it stays usable and
//! the error is turned into a status message at the dispatch boundary.

use thiserror::Error;

/// Errors produced by editing, querying and session-stack operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The document does not parse. `line` and `column` are 1-based.
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    /// Embedded editing was requested on something that is not a string value.
    #[error("Not a string value")]
    NotAString,

    /// The string selected for embedded editing does not contain JSON.
    #[error("String does not contain valid JSON: {0}")]
    NotValidJson(String),

    /// A search found nothing.
    #[error("Pattern not found: {0}")]
    NoMatch(String),

    #[error("Already at oldest change")]
    NothingToUndo,

    #[error("Already at newest change")]
    NothingToRedo,

    #[error("Not an editor command: {0}")]
    UnrecognizedCommand(String),

    #[error("[readonly]")]
    ReadOnlyViolation,

    /// The parent location of an embedded session no longer holds a string.
    #[error("Parent value is no longer a string (use :q! to discard)")]
    StaleParent,

    /// Write-back was requested from the bottom session.
    #[error("Not an embedded session")]
    NotEmbedded,

    /// A JSON Lines record command ran on a plain JSON document.
    #[error("Not a JSON Lines document")]
    NotJsonl,

    /// The cursor is on a blank line between JSON Lines records.
    #[error("No record under cursor")]
    NoRecord,

    /// A query or regular expression failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl EditorError {
    /// Returns true for boundary conditions that are informational rather
    /// than failures.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            EditorError::NothingToUndo | EditorError::NothingToRedo | EditorError::NoMatch(_)
        )
    }
}

/// Result alias used throughout the core.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_json_message_is_one_based() {
        let err = EditorError::InvalidJson {
            line: 3,
            column: 7,
            message: "expected ':'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid JSON at line 3, column 7: expected ':'"
        );
    }

    #[test]
    fn test_informational_errors() {
        assert!(EditorError::NothingToUndo.is_informational());
        assert!(EditorError::NoMatch("x".to_string()).is_informational());
        assert!(!EditorError::ReadOnlyViolation.is_informational());
        assert_eq!(EditorError::ReadOnlyViolation.to_string(), "[readonly]");
    }
}
