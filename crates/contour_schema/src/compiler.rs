//! Two-pass schema compiler.
//!
//! Pass 0 creates a hollow rule for every declaration of the schema
//! document, after the built-in ground rules. Pass 1 resolves each body into
//! an expression, looking identifiers up in the now complete table, which is
//! what allows forward and recursive references.

use contour_core::{Error, ErrorList, Node};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::builder::BuilderRegistry;
use crate::builtin;
use crate::dependence;
use crate::expr::{Expression, RuleId};
use crate::options::Options;
use crate::recognizer::{Resolver, is_identifier};
use crate::rule::Rule;
use crate::schema::{DEFAULT_ENTRY, Schema};

/// A parsed rule declaration key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Local rule name
    pub name: String,
    /// Builder lookup name, for exported rules
    pub exported_name: Option<String>,
}

impl Declaration {
    /// Parse `name`, `name:`, `name::` or `name::exported`
    ///
    /// # Errors
    ///
    /// Returns a schema error if the key is not a string or not a valid
    /// declaration
    pub fn parse(key: &Node) -> Result<Self, Error> {
        if !key.is_string() {
            return Err(Error::schema(key, "a string (a rule declaration)"));
        }

        let text = key.value();
        let (name, exported_name) = match text.split_once(':') {
            None => (text, None),
            Some((name, "" | ":")) => (name, Some(name)),
            Some((name, rest)) => {
                let exported = rest.strip_prefix(':').ok_or_else(|| invalid_declaration(key))?;
                if !is_identifier(exported)? {
                    return Err(invalid_declaration(key));
                }
                (name, Some(exported))
            }
        };

        if !is_identifier(name)? {
            return Err(invalid_declaration(key));
        }

        Ok(Self {
            name: name.to_string(),
            exported_name: exported_name.map(str::to_string),
        })
    }
}

fn invalid_declaration(key: &Node) -> Error {
    Error::schema(
        key,
        "a valid rule declaration (name, name: or name::exportedName)",
    )
}

/// Compiles schema documents into [`Schema`]s
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    builders: BuilderRegistry,
    options: Options,
}

impl SchemaCompiler {
    /// Create a compiler without builders and with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the builder registry
    #[must_use]
    pub fn with_builders(mut self, builders: BuilderRegistry) -> Self {
        self.builders = builders;
        self
    }

    /// Set the options
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Options used for compilation
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Registered builders
    #[must_use]
    pub const fn builders(&self) -> &BuilderRegistry {
        &self.builders
    }

    /// Compile a schema document (or its root mapping)
    ///
    /// # Errors
    ///
    /// Returns every schema error found; the schema is only produced when
    /// there is none
    pub fn compile(&self, document: &Node) -> Result<Schema, Vec<Error>> {
        let Some(root) = document.root() else {
            return Err(vec![Error::schema(document, "a schema document with a single root")]);
        };
        if !root.is_mapping() {
            return Err(vec![Error::schema(root, "a schema document (a mapping of rules)")]);
        }

        let mut errors = ErrorList::with_mode(self.options.stop_at_first_schema_error);

        // Pass 0
        let mut rules = Vec::new();
        let mut by_name = IndexMap::new();
        let any = builtin::seed(&mut rules, &mut by_name);
        self.hollow_schema(root, &mut rules, &mut by_name, &mut errors);
        debug!(
            rules = rules.len(),
            builtins = any.index() + 1,
            "Hollow schema created"
        );

        // Pass 1
        let mut resolver = Resolver::new(
            &rules,
            &by_name,
            any,
            self.options.bypass_missing_rule,
            self.options.stop_at_first_schema_error,
        );
        let mut resolved: Vec<(usize, Expression)> = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if errors.is_done() {
                break;
            }
            let Some(body) = rule.body() else {
                continue;
            };
            trace!(rule = rule.name(), "Resolving rule");
            if let Some(expression) = errors.absorb(resolver.resolve_rule(RuleId(index), body)) {
                resolved.push((index, expression));
            }
        }
        let references = resolver.into_references();
        for (index, expression) in resolved {
            if let Some(rule) = rules.get_mut(index) {
                rule.expression = Some(expression);
            }
        }

        if !errors.is_done() {
            errors.extend(dependence::check_head_cycles(&rules));
        }
        if !errors.is_done() {
            self.check_builders(root, &rules, &mut errors);
        }
        if self.options.warn_unused_rule && !errors.is_done() {
            check_unused(&rules, &references, &mut errors);
        }

        debug!(errors = errors.len(), "Schema compiled");
        errors.into_result(Schema::new(rules, by_name, any, self.options))
    }

    fn hollow_schema(
        &self,
        root: &Node,
        rules: &mut Vec<Rule>,
        by_name: &mut IndexMap<String, RuleId>,
        errors: &mut ErrorList,
    ) {
        for (key, body) in root.entries() {
            if errors.is_done() {
                return;
            }
            let declaration = match Declaration::parse(key) {
                Ok(declaration) => declaration,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            if by_name.contains_key(&declaration.name) {
                let expected = if builtin::is_builtin_name(&declaration.name) {
                    "no redeclaration of a built-in rule"
                } else {
                    "no repeated rule declaration"
                };
                errors.push(Error::schema(key, expected));
                continue;
            }

            let mut rule = Rule::hollow(
                declaration.name.clone(),
                declaration.exported_name.clone(),
                key.clone(),
                body.clone(),
            );
            if let Some(exported) = &declaration.exported_name {
                rule.builder = self.builders.get(exported).cloned();
            }

            by_name.insert(declaration.name, RuleId(rules.len()));
            rules.push(rule);
        }
    }

    /// Unimplemented and extra builders
    fn check_builders(&self, root: &Node, rules: &[Rule], errors: &mut ErrorList) {
        if self.options.warn_unimplemented_builder {
            for rule in rules {
                if let (Some(exported), None, Some(declaration)) =
                    (rule.exported_name(), rule.builder(), rule.declaration())
                {
                    errors.push(Error::schema(
                        declaration,
                        format!("a builder registered under '{}'", exported),
                    ));
                }
            }
        }

        if !self.options.ignore_extra_builder {
            let exported: IndexSet<&str> = rules.iter().filter_map(Rule::exported_name).collect();
            for name in self.builders.names() {
                if !exported.contains(name) {
                    errors.push(Error::Schema {
                        position: root.position().clone(),
                        found: format!("a builder registered under '{}'", name),
                        expected: "a rule exported under that name".to_string(),
                    });
                }
            }
        }
    }
}

/// User rules never referenced from another rule
fn check_unused(rules: &[Rule], references: &IndexSet<RuleId>, errors: &mut ErrorList) {
    for (index, rule) in rules.iter().enumerate() {
        let Some(declaration) = rule.declaration() else {
            continue;
        };
        if rule.name() != DEFAULT_ENTRY && !references.contains(&RuleId(index)) {
            errors.push(Error::schema(
                declaration,
                format!("rule '{}' to be referenced by another rule", rule.name()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::{Data, MatchOutput};
    use contour_yaml::load_yaml;

    fn doc(text: &str) -> Node {
        load_yaml("schema.yaml", text).unwrap()
    }

    fn compile(text: &str) -> Result<Schema, Vec<Error>> {
        SchemaCompiler::new().compile(&doc(text))
    }

    fn expected_of(errors: &[Error]) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match e {
                Error::Schema { expected, .. } => Some(expected.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_declaration_forms() {
        let plain = Declaration::parse(&Node::string("tree")).unwrap();
        assert_eq!(plain.exported_name, None);

        let exported = Declaration::parse(&Node::string("tree:")).unwrap();
        assert_eq!(exported.name, "tree");
        assert_eq!(exported.exported_name.as_deref(), Some("tree"));

        let double = Declaration::parse(&Node::string("tree::")).unwrap();
        assert_eq!(double.exported_name.as_deref(), Some("tree"));

        let renamed = Declaration::parse(&Node::string("tree::build.Tree")).unwrap();
        assert_eq!(renamed.name, "tree");
        assert_eq!(renamed.exported_name.as_deref(), Some("build.Tree"));
    }

    #[test]
    fn test_invalid_declarations() {
        for text in ["tree:x", "tree:::x", "9tree", "tree::9", "", "a b"] {
            assert!(Declaration::parse(&Node::string(text)).is_err(), "{}", text);
        }
        assert!(Declaration::parse(&Node::int(3)).is_err());
    }

    #[test]
    fn test_forward_reference() {
        let schema = compile(
            "main: { _map: { child: node } }\n\
             node: { _map: { value: string } }\n",
        )
        .unwrap();
        assert!(schema.rule_by_name("node").and_then(Rule::expression).is_some());
        assert!(schema.rule_by_name("main").and_then(Rule::expression).is_some());
    }

    #[test]
    fn test_root_must_be_mapping() {
        let errors = compile("[a, b]").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["a schema document (a mapping of rules)"]);
    }

    #[test]
    fn test_redeclarations() {
        let errors = compile("string: int\nmain: int\n").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["no redeclaration of a built-in rule"]);

        let errors = compile("main: int\n'main:': string\n").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["no repeated rule declaration"]);
    }

    #[test]
    fn test_errors_across_rules() {
        let errors = compile(
            "main: { _map: { a: missing } }\n\
             other: { _list: 3 }\n\
             'bad key!': string\n",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_stop_at_first_schema_error() {
        let compiler = SchemaCompiler::new()
            .with_options(Options::new().with_stop_at_first_schema_error(true));
        let errors = compiler
            .compile(&doc(
                "main: { _map: { a: missing } }\nother: { _list: 3 }\n'bad key!': string\n",
            ))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_builder_attached_by_export_name() {
        let builders = BuilderRegistry::new()
            .with("Color", |_: &MatchOutput| Ok(Data::Null));
        let schema = SchemaCompiler::new()
            .with_builders(builders)
            .compile(&doc("main: color\n'color::Color': string\n"))
            .unwrap();
        let color = schema.rule_by_name("color").unwrap();
        assert!(color.builder().is_some());
        assert_eq!(color.exported_name(), Some("Color"));
        assert!(schema.rule_by_name("main").unwrap().builder().is_none());
    }

    #[test]
    fn test_extra_builder() {
        let builders = BuilderRegistry::new().with("nobody", |_: &MatchOutput| Ok(Data::Null));
        let compiler = SchemaCompiler::new().with_builders(builders);
        let errors = compiler.compile(&doc("main: string\n")).unwrap_err();
        assert_eq!(expected_of(&errors), vec!["a rule exported under that name"]);

        let relaxed = compiler.with_options(Options::new().with_ignore_extra_builder(true));
        assert!(relaxed.compile(&doc("main: string\n")).is_ok());
    }

    #[test]
    fn test_unimplemented_builder() {
        let text = "'main:': string\n";
        assert!(compile(text).is_ok());

        let compiler = SchemaCompiler::new()
            .with_options(Options::new().with_warn_unimplemented_builder(true));
        let errors = compiler.compile(&doc(text)).unwrap_err();
        assert_eq!(expected_of(&errors), vec!["a builder registered under 'main'"]);
    }

    #[test]
    fn test_unused_rule() {
        let text = "main: { _map: { a: used } }\nused: int\nlonely: string\nselfish: { _listOf: selfish }\n";
        assert!(compile(text).is_ok());

        let compiler = SchemaCompiler::new().with_options(Options::new().with_warn_unused_rule(true));
        let errors = compiler.compile(&doc(text)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("'lonely'"));
        assert!(errors[1].to_string().contains("'selfish'"));
    }

    #[test]
    fn test_bypass_missing_rule() {
        let text = "main: { _map: { a: notDeclared } }\n";
        assert!(compile(text).is_err());

        let compiler = SchemaCompiler::new()
            .with_options(Options::new().with_bypass_missing_rule(true));
        assert!(compiler.compile(&doc(text)).is_ok());
    }

    #[test]
    fn test_schema_error_position() {
        let errors = compile("main:\n  _map:\n    a: nothing\n").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["the identifier to be declared in the schema"]);
        let position = errors[0].position().unwrap();
        assert_eq!(position.source(), "schema.yaml");
        assert_eq!(position.line(), 3);
    }

    #[test]
    fn test_empty_schema() {
        let schema = compile("{}").unwrap();
        assert_eq!(schema.user_rules().count(), 0);
        assert!(!schema.has_default_entry());
    }
}
