//! File I/O for the host binary.
//!
//! The editing core only deals in text. This module loads that text from
//! disk or stdin and writes serialized documents back with atomic writes
//! and optional backups.

pub mod loader;
pub mod saver;
