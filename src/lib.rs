//! jsonvim - a modal, vim-style editing engine for JSON and JSON Lines.
//!
//! The crate is organised leaves-first:
//!
//! - [`document`]: the line buffer, JSONL records and pretty/minify helpers
//! - [`structure`]: lexing, parsing, bracket matching and folds
//! - [`query`]: path queries with filters, plus plain text search
//! - [`editor`]: one editing session (modes, motions, operators, undo)
//! - [`input`]: key values and per-mode key dispatch
//! - [`stack`]: the stack of sessions for embedded documents, and `:` commands
//! - [`file`] and [`config`]: host-side helpers used by the binary

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file;
pub mod input;
pub mod query;
pub mod stack;
pub mod structure;

pub use document::{Document, DocumentFormat, Position};
pub use editor::session::Session;
pub use error::{EditorError, EditorResult};
pub use input::keys::{parse_keys, Key};
pub use stack::{CommandResult, Editor, Effect, HostRequest};
