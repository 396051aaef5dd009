//! Error type shared by the schema compiler and the matcher.

use crate::node::Node;
use crate::position::Position;

/// A schema error, a content error, a builder rejection, or an internal
/// inconsistency
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The schema document violates the schema language
    #[error("Schema error at {position}: found {found}, expected {expected}")]
    Schema {
        /// Where the offending schema node is
        position: Position,
        /// Summary of the offending node
        found: String,
        /// What the compiler expected instead
        expected: String,
    },

    /// A content node does not satisfy an expression
    #[error("Content error at {position}: found {found}, expected {expected}")]
    Content {
        /// Where the offending content node is
        position: Position,
        /// Summary of the offending node
        found: String,
        /// Description of the expected shape
        expected: String,
    },

    /// A builder rejected a structurally valid value
    #[error("Builder error for rule '{rule}' at {position}: {message}")]
    Builder {
        /// Rule whose builder failed
        rule: String,
        /// Where the rejected value is
        position: Position,
        /// Message from the builder
        message: String,
    },

    /// The requested entry rule does not exist
    #[error("Could not find rule '{name}' in the schema")]
    MissingRule {
        /// Requested rule name
        name: String,
    },

    /// The compiler and the matcher disagree; this is a bug, not a user mistake
    #[error("Internal error, please report it: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

impl Error {
    /// Schema error located at a schema node
    #[must_use]
    pub fn schema(node: &Node, expected: impl Into<String>) -> Self {
        Self::Schema {
            position: node.position().clone(),
            found: node.summary(),
            expected: expected.into(),
        }
    }

    /// Content error located at a content node
    #[must_use]
    pub fn content(node: &Node, expected: impl Into<String>) -> Self {
        Self::Content {
            position: node.position().clone(),
            found: node.summary(),
            expected: expected.into(),
        }
    }

    /// Internal invariant violation
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Position of the error, if it has one
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Schema { position, .. }
            | Self::Content { position, .. }
            | Self::Builder { position, .. } => Some(position),
            Self::MissingRule { .. } | Self::Internal { .. } => None,
        }
    }

    /// Whether this error is about the schema rather than the content
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Whether this error signals a compiler/matcher inconsistency
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}
