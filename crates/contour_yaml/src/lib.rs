//! CONTOUR YAML/JSON Adapter
//!
//! Loads YAML or JSON text into the generic [`contour_core::Node`] tree the
//! schema compiler and the matcher work on. Every loaded tree is a
//! `Document` node wrapping the root.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod source_map;

pub use convert::{from_json_value, from_marked_yaml_value, from_yaml_value};
pub use error::LoadError;
pub use source_map::SourceMap;

use contour_core::Node;
use std::path::Path;
use tracing::debug;

/// Parse YAML text into a document node with line and column positions
///
/// # Errors
///
/// Returns [`LoadError::Yaml`] if the text is not valid YAML
pub fn load_yaml(source: &str, text: &str) -> Result<Node, LoadError> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|error| LoadError::Yaml {
        source_name: source.to_string(),
        error,
    })?;
    Ok(from_marked_yaml_value(source, &value, &SourceMap::scan(source, text)))
}

/// Parse JSON text into a document node
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the text is not valid JSON
pub fn load_json(source: &str, text: &str) -> Result<Node, LoadError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|error| LoadError::Json {
        source_name: source.to_string(),
        error,
    })?;
    Ok(from_json_value(source, &value))
}

/// Read and parse a file; `.json` files are parsed as JSON, anything else
/// as YAML
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or a parse error
pub fn load_file(path: impl AsRef<Path>) -> Result<Node, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|error| LoadError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let source = path.display().to_string();
    debug!(source = %source, bytes = text.len(), "Loading document");

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_json(&source, &text)
    } else {
        load_yaml(&source, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::{NodeKind, Tag};
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_document() {
        let doc = load_yaml("s.yaml", "main: { _map: { name: string } }\n").unwrap();
        assert_eq!(doc.kind(), NodeKind::Document);
        let root = doc.root().unwrap();
        assert!(root.is_mapping());
        assert!(root.get("main").unwrap().get("_map").is_some());
    }

    #[test]
    fn test_yaml_scalar_tags() {
        let doc = load_yaml("d.yaml", "[1, 1.5, true, ~, text, '2', -3]").unwrap();
        let tags: Vec<Tag> = doc.root().unwrap().children().iter().map(|n| n.tag().clone()).collect();
        assert_eq!(
            tags,
            vec![Tag::Int, Tag::Float, Tag::Bool, Tag::Null, Tag::Str, Tag::Str, Tag::Int]
        );
    }

    #[test]
    fn test_non_string_keys() {
        let doc = load_yaml("d.yaml", "1: a\ntrue: b\n").unwrap();
        let keys: Vec<&Tag> = doc.root().unwrap().entries().map(|(k, _)| k.tag()).collect();
        assert_eq!(keys, vec![&Tag::Int, &Tag::Bool]);
    }

    #[test]
    fn test_custom_tag() {
        let doc = load_yaml("d.yaml", "!color red").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.tag(), &Tag::Custom("color".to_string()));
        assert_eq!(root.value(), "red");
    }

    #[test]
    fn test_nested_node_line() {
        let doc = load_yaml("c.yaml", "\n\n\na: x\n").unwrap();
        let value = doc.root().unwrap().get("a").unwrap();
        assert_eq!(value.position().line(), 4);
        assert!(value.position().to_string().starts_with("c.yaml:4:"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = load_yaml("bad.yaml", "a: [1, 2").unwrap_err();
        assert!(matches!(err, LoadError::Yaml { .. }));
        assert_eq!(err.source_name(), "bad.yaml");
    }

    #[test]
    fn test_invalid_json() {
        let err = load_json("bad.json", "{\"a\": }").unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON in bad.json"));
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("data.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"a": [1, 2]}"#)
            .unwrap();
        let doc = load_file(&json_path).unwrap();
        assert_eq!(doc.root().unwrap().get("a").and_then(Node::size), Some(2));
        assert!(doc.position().source().ends_with("data.json"));

        let yaml_path = dir.path().join("data.yaml");
        std::fs::write(&yaml_path, "a: b\n").unwrap();
        assert!(load_file(&yaml_path).is_ok());

        let missing = load_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, LoadError::Io { .. }));
    }

    proptest! {
        #[test]
        fn prop_json_and_yaml_agree(values in proptest::collection::vec(-1000i64..1000, 0..8)) {
            let text = serde_json::to_string(&values).unwrap();
            let from_json = load_json("d", &text).unwrap();
            let from_yaml = from_yaml_value("d", &serde_yaml::from_str(&text).unwrap());
            prop_assert_eq!(from_json, from_yaml);
        }
    }
}
