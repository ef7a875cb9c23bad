//! Abstract syntax for path queries.

use regex::Regex;
use serde_json::Value;

/// A segment in a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Root node ($)
    Root,
    /// Named child (.property or ['property'])
    Child(String),
    /// Array index ([0], [-1])
    Index(isize),
    /// Wildcard (* or [*]) - all children
    Wildcard,
    /// Recursive descent (..property or ..*)
    RecursiveDescent(Option<String>),
    /// The node and all of its descendants, produced by `..[`
    DescendantsOrSelf,
    /// Array slice ([start:end])
    Slice(Option<isize>, Option<isize>),
    /// Multiple properties (['prop1','prop2'])
    MultiProperty(Vec<String>),
}

/// A path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    /// Segments that make up the path.
    pub segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates a new path with the given segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

/// Comparison operators, in the order the filter scanner tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Ne,
    Ge,
    Le,
    Match,
    Eq,
    Gt,
    Lt,
}

impl CompareOp {
    pub const SCAN_ORDER: [CompareOp; 7] = [
        CompareOp::Ne,
        CompareOp::Ge,
        CompareOp::Le,
        CompareOp::Match,
        CompareOp::Eq,
        CompareOp::Gt,
        CompareOp::Lt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Match => "~",
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
        }
    }
}

/// The comparison after a path, with its operand.
#[derive(Debug, Clone)]
pub struct Filter {
    pub op: CompareOp,
    pub operand: Value,
    /// Compiled operand for `~`.
    pub regex: Option<Regex>,
}

/// A parsed query: a path and an optional filter.
#[derive(Debug, Clone)]
pub struct Query {
    pub path: JsonPath,
    pub filter: Option<Filter>,
}
