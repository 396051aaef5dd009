//! Short names and one-line descriptions of expressions.
//!
//! Descriptions only name sub-expressions, never expand referenced rules,
//! so they stay finite on recursive schemas.

use crate::expr::{Expression, InExpr, ListExpr, MapExpr};
use crate::schema::Schema;

impl Schema {
    /// Short label of an expression: the rule name for references, the form
    /// in parentheses otherwise
    #[must_use]
    pub fn name_of(&self, expression: &Expression) -> String {
        match expression {
            Expression::Rule(id) => self
                .rule(*id)
                .map_or_else(|| format!("(rule #{})", id.index()), |r| r.name().to_string()),
            Expression::Map(_) => "(map)".to_string(),
            Expression::List(_) => "(list)".to_string(),
            Expression::OneOf(_) => "(oneOf)".to_string(),
            Expression::In(_) => "(in)".to_string(),
            Expression::Regex(_) => "(regex)".to_string(),
        }
    }

    /// What content satisfies the expression, for error messages
    #[must_use]
    pub fn describe(&self, expression: &Expression) -> String {
        match expression {
            Expression::Rule(id) => match self.rule(*id) {
                Some(rule) => match (rule.intrinsic(), rule.expression()) {
                    (Some(intrinsic), _) => intrinsic.expected().to_string(),
                    (None, Some(body)) => format!("rule {} {}", rule.name(), self.name_of(body)),
                    (None, None) => format!("rule {}", rule.name()),
                },
                None => format!("(rule #{})", id.index()),
            },
            Expression::Map(map) => self.describe_map(map),
            Expression::List(list) => self.describe_list(list),
            Expression::OneOf(options) if options.is_empty() => "one of nothing".to_string(),
            Expression::OneOf(options) => format!("one of [{}]", self.names(options.iter())),
            Expression::In(set) => describe_in(set),
            Expression::Regex(regex) => format!("a string matching /{}/", regex.pattern()),
        }
    }

    fn names<'e>(&self, expressions: impl Iterator<Item = &'e Expression>) -> String {
        expressions
            .map(|e| self.name_of(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn describe_map(&self, map: &MapExpr) -> String {
        let mut parts = Vec::new();
        if !map.properties.is_empty() {
            parts.push(format!("_map: {{{}}}", self.properties(map.properties.iter())));
        }
        if !map.optional.is_empty() {
            parts.push(format!("_mapOptional: {{{}}}", self.properties(map.optional.iter())));
        }
        if let Some(kv) = &map.map_of {
            parts.push(format!(
                "_mapOf: {{{}: {}}}",
                self.name_of(&kv.key),
                self.name_of(&kv.value)
            ));
        }
        if !map.merge.is_empty() {
            let members = self.names(map.merge.iter().map(|m| m.expression()));
            parts.push(format!("_merge: [{}]", members));
        }
        if !map.sizing.is_none() {
            parts.push(map.sizing.to_string());
        }

        if parts.is_empty() {
            "a mapping".to_string()
        } else {
            format!("a mapping with {}", parts.join(", "))
        }
    }

    fn properties<'e>(&self, properties: impl Iterator<Item = (&'e String, &'e Expression)>) -> String {
        properties
            .map(|(name, e)| format!("{}: {}", name, self.name_of(e)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn describe_list(&self, list: &ListExpr) -> String {
        let mut parts = Vec::new();
        if !list.required.is_empty() {
            parts.push(format!("_list: [{}]", self.names(list.required.iter())));
        }
        if !list.optional.is_empty() {
            parts.push(format!("_listOptional: [{}]", self.names(list.optional.iter())));
        }
        if let Some(rest) = &list.rest {
            parts.push(format!("_listOf: {}", self.name_of(rest)));
        }
        if !list.sizing.is_none() {
            parts.push(list.sizing.to_string());
        }

        if parts.is_empty() {
            "an empty sequence".to_string()
        } else {
            format!("a sequence with {}", parts.join(", "))
        }
    }
}

fn describe_in(set: &InExpr) -> String {
    if set.is_empty() {
        return "a value in an empty set".to_string();
    }
    let groups: Vec<String> = set
        .iter()
        .map(|(tag, values)| {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            format!("{} [{}]", tag, values.join(", "))
        })
        .collect();
    format!("a value in: {}", groups.join(", "))
}
