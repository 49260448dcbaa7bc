use std::fmt;

/// A position in the source stream: 1-indexed line, 0-indexed column.
///
/// Attached to syntax-time errors for diagnostics; the evaluator does not
/// track per-expression locations (matching the original interpreter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const fn start() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
