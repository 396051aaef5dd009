//! Line and column marks of a YAML text.
//!
//! `serde_yaml` resolves tags and scalar types but drops source marks, so
//! the text is scanned a second time with `marked-yaml` and the marks are
//! kept in a tree shaped like the resulting node tree. Texts `marked-yaml`
//! rejects (explicit tags, anchors, complex keys) yield an empty map and
//! their nodes carry the source name only.

use tracing::debug;

/// Mark of one node and of its children
///
/// Mapping children alternate key and value, as in [`contour_core::Node`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    at: Option<(usize, usize)>,
    children: Vec<SourceMap>,
}

impl SourceMap {
    /// Scan `text` for marks; empty if the text cannot be scanned
    #[must_use]
    pub fn scan(source: &str, text: &str) -> Self {
        match marked_yaml::parse_yaml(0, text) {
            Ok(root) => Self::from_marked(&root),
            Err(error) => {
                debug!(source = %source, error = %error, "No source marks");
                Self::default()
            }
        }
    }

    fn from_marked(node: &marked_yaml::Node) -> Self {
        use marked_yaml::Node;

        let children = match node {
            Node::Scalar(_) => Vec::new(),
            Node::Sequence(items) => items.iter().map(Self::from_marked).collect(),
            Node::Mapping(mapping) => mapping
                .iter()
                .flat_map(|(key, value)| [Self::at(key.span()), Self::from_marked(value)])
                .collect(),
        };
        Self {
            at: Self::at(node.span()).at,
            children,
        }
    }

    fn at(span: &marked_yaml::Span) -> Self {
        Self {
            at: span.start().map(|marker| (marker.line(), marker.column())),
            children: Vec::new(),
        }
    }

    /// Line and column of this node, if known
    #[must_use]
    pub const fn line_column(&self) -> Option<(usize, usize)> {
        self.at
    }

    /// Map of the child at `index`, if the shapes agree
    #[must_use]
    pub fn child(&self, index: usize, expected: usize) -> Option<&Self> {
        if self.children.len() == expected { self.children.get(index) } else { None }
    }

    /// Whether no mark is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.at.is_none() && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_nested_marks() {
        let map = SourceMap::scan("c.yaml", "\n\na:\n  - x\n  - y\nb: z\n");
        assert_eq!(map.children.len(), 4);

        let key = map.child(0, 4).unwrap();
        assert_eq!(key.line_column().map(|(line, _)| line), Some(3));

        let items = map.child(1, 4).unwrap();
        let second = items.child(1, 2).unwrap();
        assert_eq!(second.line_column().map(|(line, _)| line), Some(5));
        assert!(items.child(1, 3).is_none());

        let b = map.child(3, 4).unwrap();
        assert_eq!(b.line_column().map(|(line, _)| line), Some(6));
    }

    #[test]
    fn test_unscannable_text_is_empty() {
        assert!(SourceMap::scan("c.yaml", "a: [1, 2").is_empty());
    }
}
