//! Conversion of parsed values into node trees.
//!
//! YAML nodes take their line and column from a [`SourceMap`] scanned from
//! the same text. `serde_json` does not expose source marks, so JSON nodes
//! carry the source name only.

use crate::source_map::SourceMap;
use contour_core::{Node, NodeKind, Position, Tag};
use serde_yaml::value::TaggedValue;
use std::sync::Arc;

const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Convert a YAML value into a document node without source marks
#[must_use]
pub fn from_yaml_value(source: &str, value: &serde_yaml::Value) -> Node {
    from_marked_yaml_value(source, value, &SourceMap::default())
}

/// Convert a YAML value into a document node, taking positions from `marks`
#[must_use]
pub fn from_marked_yaml_value(source: &str, value: &serde_yaml::Value, marks: &SourceMap) -> Node {
    let source = Arc::<str>::from(source);
    Node::document(yaml_node(value, Some(marks), &source))
}

/// Convert a JSON value into a document node
#[must_use]
pub fn from_json_value(source: &str, value: &serde_json::Value) -> Node {
    let position = Position::unknown(Arc::<str>::from(source));
    Node::document(json_node(value, &position))
}

fn scalar(tag: Tag, value: String, position: &Position) -> Node {
    Node::new(NodeKind::Scalar, tag, value, Vec::new(), position.clone())
}

fn position_of(marks: Option<&SourceMap>, source: &Arc<str>) -> Position {
    match marks.and_then(SourceMap::line_column) {
        Some((line, column)) => Position::new(Arc::clone(source), line, column),
        None => Position::unknown(Arc::clone(source)),
    }
}

fn yaml_node(value: &serde_yaml::Value, marks: Option<&SourceMap>, source: &Arc<str>) -> Node {
    use serde_yaml::Value;

    let position = position_of(marks, source);
    match value {
        Value::Null => scalar(Tag::Null, "null".to_string(), &position),
        Value::Bool(b) => scalar(Tag::Bool, b.to_string(), &position),
        Value::Number(n) => {
            let tag = if n.is_f64() { Tag::Float } else { Tag::Int };
            scalar(tag, n.to_string(), &position)
        }
        Value::String(s) => scalar(Tag::Str, s.clone(), &position),
        Value::Sequence(items) => Node::new(
            NodeKind::Sequence,
            Tag::Seq,
            String::new(),
            items
                .iter()
                .enumerate()
                .map(|(i, item)| yaml_node(item, marks.and_then(|m| m.child(i, items.len())), source))
                .collect(),
            position,
        ),
        Value::Mapping(mapping) => {
            let count = mapping.len() * 2;
            let mut children = Vec::with_capacity(count);
            for (i, (key, value)) in mapping.iter().enumerate() {
                children.push(yaml_node(key, marks.and_then(|m| m.child(2 * i, count)), source));
                children.push(yaml_node(value, marks.and_then(|m| m.child(2 * i + 1, count)), source));
            }
            Node::new(NodeKind::Mapping, Tag::Map, String::new(), children, position)
        }
        Value::Tagged(tagged) => tagged_node(tagged, marks, source),
    }
}

/// Explicitly tagged value: the tag overrides the resolved scalar type
fn tagged_node(tagged: &TaggedValue, marks: Option<&SourceMap>, source: &Arc<str>) -> Node {
    let inner = yaml_node(&tagged.value, marks, source);
    let tag_text = tagged.tag.to_string();
    let name = tag_text
        .strip_prefix(CORE_TAG_PREFIX)
        .unwrap_or(&tag_text)
        .trim_start_matches('!');

    let tag = match name {
        "str" => Tag::Str,
        "int" => Tag::Int,
        "float" => Tag::Float,
        "bool" => Tag::Bool,
        "null" => Tag::Null,
        "binary" => Tag::Binary,
        "timestamp" => Tag::Timestamp,
        "map" | "seq" => inner.tag().clone(),
        other => Tag::Custom(other.to_string()),
    };

    Node::new(
        inner.kind(),
        tag,
        inner.value().to_string(),
        inner.children().to_vec(),
        inner.position().clone(),
    )
}

fn json_node(value: &serde_json::Value, position: &Position) -> Node {
    use serde_json::Value;

    match value {
        Value::Null => scalar(Tag::Null, "null".to_string(), position),
        Value::Bool(b) => scalar(Tag::Bool, b.to_string(), position),
        Value::Number(n) => {
            let tag = if n.is_f64() { Tag::Float } else { Tag::Int };
            scalar(tag, n.to_string(), position)
        }
        Value::String(s) => scalar(Tag::Str, s.clone(), position),
        Value::Array(items) => Node::new(
            NodeKind::Sequence,
            Tag::Seq,
            String::new(),
            items.iter().map(|item| json_node(item, position)).collect(),
            position.clone(),
        ),
        Value::Object(object) => {
            let mut children = Vec::with_capacity(object.len() * 2);
            for (key, value) in object {
                children.push(scalar(Tag::Str, key.clone(), position));
                children.push(json_node(value, position));
            }
            Node::new(NodeKind::Mapping, Tag::Map, String::new(), children, position.clone())
        }
    }
}
