//! Source positions of document nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Line and column of a node in its source text (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Line number
    pub line: usize,
    /// Column number
    pub column: usize,
}

/// Position of a node: the source it was read from and, when the tree
/// parser tracks it, the line and column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    source: Arc<str>,
    location: Option<Location>,
}

impl Position {
    /// Create a position with a known line and column
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            location: Some(Location { line, column }),
        }
    }

    /// Create a position that only knows its source
    #[must_use]
    pub fn unknown(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            location: None,
        }
    }

    /// Source name (usually a file name)
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Shared handle on the source name
    #[must_use]
    pub fn source_handle(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Line and column, if known
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }

    /// Line number, 0 if unknown
    #[must_use]
    pub fn line(&self) -> usize {
        self.location.map_or(0, |l| l.line)
    }

    /// Column number, 0 if unknown
    #[must_use]
    pub fn column(&self) -> usize {
        self.location.map_or(0, |l| l.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::unknown("<memory>")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location { line, column }) => write!(f, "{}:{}:{}", self.source, line, column),
            None => write!(f, "{}", self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let pos = Position::new("schema.yaml", 3, 7);
        assert_eq!(pos.to_string(), "schema.yaml:3:7");
        assert_eq!(pos.line(), 3);
        assert_eq!(pos.column(), 7);
    }

    #[test]
    fn test_unknown_position() {
        let pos = Position::unknown("data.json");
        assert_eq!(pos.to_string(), "data.json");
        assert_eq!(pos.location(), None);
        assert_eq!(pos.line(), 0);
    }

    #[test]
    fn test_source_is_shared() {
        let pos = Position::new("a.yaml", 1, 1);
        let handle = pos.source_handle();
        let other = Position::new(Arc::clone(&handle), 2, 4);
        assert_eq!(other.source(), "a.yaml");
    }
}
