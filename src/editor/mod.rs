//! Modal editing of one document.
//!
//! This module provides the pieces a [`session::Session`] is built from:
//! modes, the cursor and visual selection, motions and operators, the
//! unnamed register, undo history, dot-repeat recording and search state.
//!
//! # Modules
//!
//! - `mode`: Editor mode enumeration
//! - `cursor`: Cursor position and visual anchor
//! - `motion`: Cursor motions and their span kinds
//! - `operator`: Delete, change and yank over character or line spans
//! - `undo`: Linear undo/redo history
//! - `session`: One document with its full editing state
//!
//! # Example
//!
//! ```
//! use jsonvim::editor::mode::Mode;
//!
//! // Sessions start in Normal mode
//! let mode = Mode::default();
//! assert_eq!(mode, Mode::Normal);
//! ```

pub mod cursor;
pub mod history;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod registers;
pub mod repeat;
pub mod search;
pub mod session;
pub mod undo;
