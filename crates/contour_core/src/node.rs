//! Generic document tree.
//!
//! Schema and content documents both arrive as trees of [`Node`]s built by a
//! tree parser (see the `contour_yaml` crate). A node has a kind, a scalar
//! tag, the raw scalar text, ordered children and a source position.
//! Mapping children are stored flat, alternating key and value.

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Document wrapper around a single root node
    Document,
    /// Key/value mapping
    Mapping,
    /// Ordered sequence
    Sequence,
    /// Scalar leaf
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Mapping => write!(f, "mapping"),
            Self::Sequence => write!(f, "sequence"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Resolved type tag of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// String scalar
    Str,
    /// Integer scalar
    Int,
    /// Floating point scalar
    Float,
    /// Boolean scalar
    Bool,
    /// Null scalar
    Null,
    /// Explicitly tagged timestamp scalar
    Timestamp,
    /// Explicitly tagged binary scalar
    Binary,
    /// Mapping
    Map,
    /// Sequence
    Seq,
    /// Any other explicit tag, without its leading `!`
    Custom(String),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "!!str"),
            Self::Int => write!(f, "!!int"),
            Self::Float => write!(f, "!!float"),
            Self::Bool => write!(f, "!!bool"),
            Self::Null => write!(f, "!!null"),
            Self::Timestamp => write!(f, "!!timestamp"),
            Self::Binary => write!(f, "!!binary"),
            Self::Map => write!(f, "!!map"),
            Self::Seq => write!(f, "!!seq"),
            Self::Custom(name) => write!(f, "!{}", name),
        }
    }
}

/// A node of a document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    tag: Tag,
    value: String,
    children: Vec<Node>,
    position: Position,
}

impl Node {
    /// Create a node from its raw parts
    #[must_use]
    pub fn new(
        kind: NodeKind,
        tag: Tag,
        value: String,
        children: Vec<Node>,
        position: Position,
    ) -> Self {
        Self {
            kind,
            tag,
            value,
            children,
            position,
        }
    }

    /// Create a scalar node
    #[must_use]
    pub fn scalar(tag: Tag, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Scalar, tag, value.into(), Vec::new(), Position::default())
    }

    /// Create a string scalar
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(Tag::Str, value)
    }

    /// Create an integer scalar
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::scalar(Tag::Int, value.to_string())
    }

    /// Create a float scalar
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::scalar(Tag::Float, value.to_string())
    }

    /// Create a boolean scalar
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::scalar(Tag::Bool, value.to_string())
    }

    /// Create the null scalar
    #[must_use]
    pub fn null() -> Self {
        Self::scalar(Tag::Null, "null")
    }

    /// Create a mapping from key/value pairs
    #[must_use]
    pub fn mapping(entries: Vec<(Node, Node)>) -> Self {
        let mut children = Vec::with_capacity(entries.len() * 2);
        for (key, value) in entries {
            children.push(key);
            children.push(value);
        }
        Self::new(NodeKind::Mapping, Tag::Map, String::new(), children, Position::default())
    }

    /// Create a sequence
    #[must_use]
    pub fn sequence(items: Vec<Node>) -> Self {
        Self::new(NodeKind::Sequence, Tag::Seq, String::new(), items, Position::default())
    }

    /// Wrap a root node into a document
    #[must_use]
    pub fn document(root: Node) -> Self {
        let position = root.position.clone();
        Self::new(NodeKind::Document, Tag::Map, String::new(), vec![root], position)
    }

    /// Set the position of this node
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Structural kind
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Type tag
    #[must_use]
    pub const fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Raw scalar text (empty for collections)
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Ordered children; mappings alternate key and value
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Source position
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Whether this is a scalar
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind == NodeKind::Scalar
    }

    /// Whether this is a mapping
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        self.kind == NodeKind::Mapping
    }

    /// Whether this is a sequence
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.kind == NodeKind::Sequence
    }

    /// Whether this is a string scalar
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.kind == NodeKind::Scalar && self.tag == Tag::Str
    }

    /// Key/value pairs of a mapping (empty for other kinds)
    pub fn entries(&self) -> impl Iterator<Item = (&Node, &Node)> {
        let pairs: &[Node] = if self.is_mapping() { &self.children } else { &[] };
        pairs.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Entry count of a mapping or item count of a sequence
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Mapping => Some(self.children.len() / 2),
            NodeKind::Sequence => Some(self.children.len()),
            NodeKind::Document | NodeKind::Scalar => None,
        }
    }

    /// Value of the entry whose key is the given string
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()
            .find(|(k, _)| k.is_string() && k.value == key)
            .map(|(_, v)| v)
    }

    /// The root of a document; any other node is its own root
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        match self.kind {
            NodeKind::Document if self.children.len() == 1 => self.children.first(),
            NodeKind::Document => None,
            _ => Some(self),
        }
    }

    /// Short human-readable description used in error messages
    #[must_use]
    pub fn summary(&self) -> String {
        match self.kind {
            NodeKind::Scalar => format!("{} '{}'", self.tag, self.value),
            NodeKind::Mapping => format!("a mapping of {} entries", self.children.len() / 2),
            NodeKind::Sequence => format!("a sequence of {} items", self.children.len()),
            NodeKind::Document => "a document".to_string(),
        }
    }
}
