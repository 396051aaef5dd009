//! Built-in ground rules.
//!
//! The intrinsics come first in the rule table, followed by `any`. User
//! rules are appended after them, so a redeclaration is caught by name.

use indexmap::IndexMap;

use crate::expr::{Expression, KeyValue, ListExpr, MapExpr, RuleId};
use crate::rule::{Intrinsic, Rule};

/// Name of the catch-all rule
pub const ANY: &str = "any";

/// Whether `name` is one of the fixed ground rules
#[must_use]
pub fn is_builtin_name(name: &str) -> bool {
    name == ANY || Intrinsic::ALL.iter().any(|i| i.name() == name)
}

/// Seed an empty rule table with the ground rules; returns the id of `any`
pub(crate) fn seed(rules: &mut Vec<Rule>, by_name: &mut IndexMap<String, RuleId>) -> RuleId {
    for intrinsic in Intrinsic::ALL {
        let id = RuleId(rules.len());
        rules.push(Rule::from_intrinsic(intrinsic));
        by_name.insert(intrinsic.name().to_string(), id);
    }

    let any = RuleId(rules.len());
    let by = |name: &str| by_name.get(name).copied().map(Expression::Rule);
    let scalars: Vec<Expression> = ["string", "boolean", "int", "float", "nullType"]
        .into_iter()
        .filter_map(by)
        .collect();

    let mut options = scalars;
    options.push(Expression::Map(MapExpr {
        map_of: Some(Box::new(KeyValue {
            key: Expression::Rule(any),
            value: Expression::Rule(any),
        })),
        ..MapExpr::default()
    }));
    options.push(Expression::List(ListExpr {
        rest: Some(Box::new(Expression::Rule(any))),
        ..ListExpr::default()
    }));

    rules.push(Rule::builtin(ANY, Expression::OneOf(options)));
    by_name.insert(ANY.to_string(), any);
    any
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() {
        let mut rules = Vec::new();
        let mut by_name = IndexMap::new();
        let any = seed(&mut rules, &mut by_name);

        assert_eq!(rules.len(), 8);
        assert_eq!(by_name.get("any"), Some(&any));
        assert!(rules.iter().all(Rule::is_builtin));

        match rules[any.index()].expression() {
            Some(Expression::OneOf(options)) => assert_eq!(options.len(), 7),
            other => panic!("unexpected any expression: {:?}", other),
        }
    }

    #[test]
    fn test_builtin_names() {
        assert!(is_builtin_name("nullType"));
        assert!(is_builtin_name("any"));
        assert!(!is_builtin_name("main"));
    }
}
