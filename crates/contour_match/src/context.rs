//! Per-call matching context.

use contour_core::ErrorList;
use contour_schema::Schema;

/// State of one match invocation
///
/// The schema is borrowed read-only; everything mutable during a match
/// (error lists, used-entry flags) lives on the call stack, so any number
/// of contexts may share one schema across threads.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'s> {
    pub(crate) schema: &'s Schema,
    pub(crate) fail_fast: bool,
}

impl<'s> MatchContext<'s> {
    /// Create a context using the schema's content error mode
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            fail_fast: schema.options().stop_at_first_content_error,
        }
    }

    /// Stop at the first content error
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Schema matched against
    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Whether matching stops at the first content error
    #[must_use]
    pub const fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Fresh error list in this context's mode
    pub(crate) fn errors(&self) -> ErrorList {
        ErrorList::with_mode(self.fail_fast)
    }

    /// Context for trial matches whose errors are discarded
    pub(crate) fn trial(&self) -> Self {
        self.with_fail_fast(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::Node;
    use contour_schema::{Options, SchemaCompiler};
    use contour_yaml::load_yaml;

    #[test]
    fn test_mode_follows_options() {
        let document = load_yaml("schema.yaml", "main: { _listOf: int }\n").unwrap();
        let lenient = SchemaCompiler::new().compile(&document).unwrap();
        assert!(!MatchContext::new(&lenient).is_fail_fast());

        let strict = SchemaCompiler::new()
            .with_options(Options::new().with_stop_at_first_content_error(true))
            .compile(&document)
            .unwrap();
        let context = MatchContext::new(&strict);
        assert!(context.is_fail_fast());
        assert!(!context.with_fail_fast(false).is_fail_fast());
    }

    #[test]
    fn test_match_rule_directly() {
        let document = load_yaml("schema.yaml", "main: { _listOf: int }\n").unwrap();
        let schema = SchemaCompiler::new().compile(&document).unwrap();
        let context = MatchContext::new(&schema);
        let main = schema.lookup("main").unwrap();

        let content = Node::sequence(vec![Node::string("a"), Node::int(1), Node::null()]);
        assert_eq!(context.match_rule(main, &content).unwrap_err().len(), 2);
        assert_eq!(context.trial().match_rule(main, &content).unwrap_err().len(), 1);
    }
}
