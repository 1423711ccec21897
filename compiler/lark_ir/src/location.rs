//! Source locations.

use std::fmt;
use std::sync::Arc;

/// A position in a source file: file name plus 1-based line and column.
///
/// The file name is shared, so cloning a location never copies text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Location {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location used for values and errors produced by host code.
    pub fn builtin() -> Self {
        Location::new("<builtin>", 0, 0)
    }

    /// Same file, different line and column.
    #[must_use]
    pub fn at(&self, line: u32, column: u32) -> Self {
        Location {
            file: Arc::clone(&self.file),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
