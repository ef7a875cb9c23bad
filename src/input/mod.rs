//! Keyboard input: the abstract key model and per-session key dispatch.

pub mod handler;
pub mod keys;

pub use handler::Deferred;
pub use keys::{format_keys, parse_keys, Key};
