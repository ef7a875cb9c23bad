//! Document model: the line buffer being edited.
//!
//! The document text is the source of truth. Everything structural (the parse
//! tree, folds, bracket pairs) is derived from it and tagged with the
//! [`Version`] it was derived from.

pub mod buffer;
pub mod format;

pub use buffer::{char_len, char_to_byte, Change, Document, DocumentFormat, Position, Record, Version};
