//! Entry point: match a content document against a named rule.

use contour_core::{Error, MatchOutput, Node};
use contour_schema::{DEFAULT_ENTRY, Schema};
use tracing::debug;

use crate::context::MatchContext;

/// Validates content documents against one entry rule of a schema
#[derive(Debug, Clone)]
pub struct Validator<'s> {
    schema: &'s Schema,
    entry: String,
    fail_fast: bool,
}

impl<'s> Validator<'s> {
    /// Create a validator for the default entry rule
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            entry: DEFAULT_ENTRY.to_string(),
            fail_fast: schema.options().stop_at_first_content_error,
        }
    }

    /// Validate against another rule
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Stop at the first content error
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Name of the entry rule
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Match a document (or a bare node) against the entry rule
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRule`] if the entry rule does not exist,
    /// otherwise every content and builder error found
    pub fn validate(&self, document: &Node) -> Result<MatchOutput, Vec<Error>> {
        let Some(root) = document.root() else {
            return Err(vec![Error::content(document, "a document with a single root")]);
        };
        let Some(entry) = self.schema.lookup(&self.entry) else {
            return Err(vec![Error::MissingRule {
                name: self.entry.clone(),
            }]);
        };

        debug!(
            rule = %self.entry,
            source = %root.position().source(),
            fail_fast = self.fail_fast,
            "Validating document"
        );
        MatchContext::new(self.schema)
            .with_fail_fast(self.fail_fast)
            .match_rule(entry, root)
    }
}

/// Match a document against the schema's `main` rule
///
/// # Errors
///
/// See [`Validator::validate`]
pub fn validate(schema: &Schema, document: &Node) -> Result<MatchOutput, Vec<Error>> {
    Validator::new(schema).validate(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::Data;
    use contour_schema::{Options, SchemaCompiler};
    use contour_yaml::load_yaml;

    const SCHEMA: &str = "main: { _listOf: word }\nword: { _regex: '^[a-z]+$' }\n";

    fn schema(options: Options) -> Schema {
        SchemaCompiler::new()
            .with_options(options)
            .compile(&load_yaml("schema.yaml", SCHEMA).unwrap())
            .unwrap()
    }

    #[test]
    fn test_default_entry() {
        let schema = schema(Options::new());
        let validator = Validator::new(&schema);
        assert_eq!(validator.entry(), DEFAULT_ENTRY);
        assert!(validator.validate(&load_yaml("c.yaml", "[a, b]").unwrap()).is_ok());
    }

    #[test]
    fn test_other_entry() {
        let schema = schema(Options::new());
        let output = Validator::new(&schema)
            .with_entry("word")
            .validate(&load_yaml("c.yaml", "hello").unwrap())
            .unwrap();
        assert_eq!(output.data(), &Data::Str("hello".into()));
        assert_eq!(output.rule_name(), "word");
    }

    #[test]
    fn test_missing_entry() {
        let schema = schema(Options::new());
        let errors = Validator::new(&schema)
            .with_entry("sentence")
            .validate(&Node::string("x"))
            .unwrap_err();
        assert_eq!(errors, vec![Error::MissingRule { name: "sentence".into() }]);
    }

    #[test]
    fn test_bare_node() {
        let schema = schema(Options::new());
        let node = Node::sequence(vec![Node::string("a"), Node::int(1)]);
        let errors = validate(&schema, &node).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let schema = schema(Options::new());
        let document = Node::new(
            contour_core::NodeKind::Document,
            contour_core::Tag::Null,
            String::new(),
            Vec::new(),
            Default::default(),
        );
        assert!(validate(&schema, &document).is_err());
    }

    #[test]
    fn test_fail_fast_from_options() {
        let content = load_yaml("c.yaml", "[A, B, C]").unwrap();

        let accumulating = schema(Options::new());
        assert_eq!(validate(&accumulating, &content).unwrap_err().len(), 3);

        let strict = schema(Options::new().with_stop_at_first_content_error(true));
        assert_eq!(validate(&strict, &content).unwrap_err().len(), 1);
        assert_eq!(
            Validator::new(&strict)
                .with_fail_fast(false)
                .validate(&content)
                .unwrap_err()
                .len(),
            3
        );
    }

    #[test]
    fn test_concurrent_validation() {
        let schema = &schema(Options::new());
        let documents: Vec<Node> = (0..8)
            .map(|i| {
                let items = vec!["ok"; i].join(", ");
                load_yaml(&format!("doc{}.yaml", i), &format!("[{}]", items)).unwrap()
            })
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = documents
                .iter()
                .map(|document| scope.spawn(move || validate(schema, document)))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }
}
