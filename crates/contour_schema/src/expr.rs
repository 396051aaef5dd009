//! Compiled expression graph.
//!
//! Expressions refer to rules through [`RuleId`] indices into the schema's
//! rule table, so forward and recursive references need no shared pointers.

use contour_core::Tag;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::sizing::Sizing;

/// Stable index of a rule in the schema's rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Index into the rule table
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A compiled node of the expression graph
#[derive(Debug, Clone)]
pub enum Expression {
    /// Reference to a named rule
    Rule(RuleId),
    /// Map form
    Map(MapExpr),
    /// List form
    List(ListExpr),
    /// Ordered alternatives; the first fully successful option wins
    OneOf(Vec<Expression>),
    /// Literal scalar set
    In(InExpr),
    /// Pattern on string scalars
    Regex(RegexExpr),
}

/// Map form: named properties, a catch-all pair, merged shapes and sizing
#[derive(Debug, Clone, Default)]
pub struct MapExpr {
    /// Required named properties
    pub properties: IndexMap<String, Expression>,
    /// Optional named properties
    pub optional: IndexMap<String, Expression>,
    /// Expression pair accepting entries not consumed by a named property
    pub map_of: Option<Box<KeyValue>>,
    /// Shapes whose properties are matched against the same map
    pub merge: Vec<Mergeable>,
    /// Entry count constraint
    pub sizing: Sizing,
}

/// Key and value expressions of `_mapOf`
#[derive(Debug, Clone)]
pub struct KeyValue {
    /// Expression every extra key must satisfy
    pub key: Expression,
    /// Expression every extra value must satisfy
    pub value: Expression,
}

/// List form: positional tuple, optional tail, catch-all and sizing
#[derive(Debug, Clone, Default)]
pub struct ListExpr {
    /// Required positional items
    pub required: Vec<Expression>,
    /// Optional positional items following the required ones
    pub optional: Vec<Expression>,
    /// Expression for every remaining item
    pub rest: Option<Box<Expression>>,
    /// Item count constraint
    pub sizing: Sizing,
}

/// An expression known to support merging into an enclosing map
///
/// Only the compiler creates these, after checking that the wrapped
/// expression is a map form, a `_oneOf` of mergeables, or a reference to
/// a rule that resolves to one.
#[derive(Debug, Clone)]
pub struct Mergeable(Expression);

impl Mergeable {
    pub(crate) fn new(expression: Expression) -> Self {
        Self(expression)
    }

    /// The wrapped expression
    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.0
    }
}

/// Literal scalar texts grouped by tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InExpr {
    values: IndexMap<Tag, IndexSet<String>>,
}

impl InExpr {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal; returns `false` if it was already present
    pub fn insert(&mut self, tag: Tag, text: impl Into<String>) -> bool {
        self.values.entry(tag).or_default().insert(text.into())
    }

    /// Whether a scalar with this tag and text is accepted
    #[must_use]
    pub fn contains(&self, tag: &Tag, text: &str) -> bool {
        self.values.get(tag).is_some_and(|set| set.contains(text))
    }

    /// Whether the set accepts nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(IndexSet::is_empty)
    }

    /// Accepted literals, tag by tag
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &IndexSet<String>)> {
        self.values.iter()
    }
}

/// Compiled pattern; matching is unanchored
#[derive(Debug, Clone)]
pub struct RegexExpr {
    regex: Regex,
}

impl RegexExpr {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns the pattern engine's error for an invalid pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Source pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the text contains a match
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
