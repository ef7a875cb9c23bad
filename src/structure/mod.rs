//! Structural analysis of the document text.
//!
//! - [`lexer`]: tokens with line/column spans
//! - [`parser`]: recursive descent into an arena [`tree::Tree`], collecting
//!   validation errors instead of failing
//! - [`analysis`]: the per-version analysis, bracket matching and the lazy
//!   cache
//! - [`fold`]: path-anchored fold regions

pub mod analysis;
pub mod fold;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use analysis::{Analysis, StructureCache};
pub use fold::{FoldKind, FoldRegion, FoldSet};
pub use parser::{parse_value, ValidationError};
pub use tree::{Node, NodeId, NodeKind, NodePath, PathStep, Span, Tree};
