//! Compiled, immutable schema.

use indexmap::IndexMap;

use crate::expr::RuleId;
use crate::options::Options;
use crate::rule::Rule;

/// Name of the rule matched when the caller names none
pub const DEFAULT_ENTRY: &str = "main";

/// A fully resolved rule table
///
/// Produced only by [`crate::SchemaCompiler::compile`] when compilation
/// reports no error. Holds no per-match state and can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<Rule>,
    by_name: IndexMap<String, RuleId>,
    any: RuleId,
    options: Options,
}

impl Schema {
    pub(crate) fn new(
        rules: Vec<Rule>,
        by_name: IndexMap<String, RuleId>,
        any: RuleId,
        options: Options,
    ) -> Self {
        Self {
            rules,
            by_name,
            any,
            options,
        }
    }

    /// Id of the rule declared under `name`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.by_name.get(name).copied()
    }

    /// Rule with the given id
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.index())
    }

    /// Rule declared under `name`
    #[must_use]
    pub fn rule_by_name(&self, name: &str) -> Option<&Rule> {
        self.lookup(name).and_then(|id| self.rule(id))
    }

    /// Id of the catch-all `any` rule
    #[must_use]
    pub const fn any(&self) -> RuleId {
        self.any
    }

    /// Every rule, built-ins first, then user rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }

    /// User-declared rules in declaration order
    pub fn user_rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules().filter(|(_, rule)| !rule.is_builtin())
    }

    /// Number of rules, built-ins included
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty (never true for a compiled schema)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Options the schema was compiled with
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Whether the schema declares the default entry rule
    #[must_use]
    pub fn has_default_entry(&self) -> bool {
        self.by_name.contains_key(DEFAULT_ENTRY)
    }
}
