//! Editor mode management for modal editing.
//!
//! Exactly one [`Mode`] is active per session. Transitions happen in the key
//! handler; leaving a visual mode always drops the selection anchor.
//!
//! # Example
//!
//! ```
//! use jsonvim::editor::mode::Mode;
//!
//! let mode = Mode::default();
//! assert_eq!(mode, Mode::Normal);
//! assert_eq!(format!("{}", mode), "NORMAL");
//! assert_eq!(format!("{}", Mode::VisualLine), "V-LINE");
//! ```

use std::fmt;

/// The current editing mode.
///
/// - `Normal`: navigation, operators and commands
/// - `Insert`: typing text into the document
/// - `CommandLine`: collecting a `:` command
/// - `Search`: collecting a `/` or `?` pattern
/// - `VisualChar` / `VisualLine`: selecting text for an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    CommandLine,
    /// `backward` is true for `?`.
    Search {
        backward: bool,
    },
    VisualChar,
    VisualLine,
}

impl Mode {
    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::VisualChar | Mode::VisualLine)
    }

    /// Command-line and search modes edit a one-line prompt.
    pub fn is_prompt(&self) -> bool {
        matches!(self, Mode::CommandLine | Mode::Search { .. })
    }
}

impl fmt::Display for Mode {
    /// Formats the mode as an uppercase string for the status bar.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "NORMAL"),
            Mode::Insert => write!(f, "INSERT"),
            Mode::CommandLine => write!(f, "COMMAND"),
            Mode::Search { .. } => write!(f, "SEARCH"),
            Mode::VisualChar => write!(f, "VISUAL"),
            Mode::VisualLine => write!(f, "V-LINE"),
        }
    }
}

impl Default for Mode {
    /// Sessions always start in Normal mode.
    fn default() -> Self {
        Mode::Normal
    }
}
