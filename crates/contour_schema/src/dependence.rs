//! Head-cycle analysis.
//!
//! A rule's head references are the rules it may delegate to without
//! consuming any content: a direct reference, the options of a `_oneOf`, or
//! the members of a `_merge`. A cycle of head references would make the
//! matcher recurse forever on the same content node, so every rule on such a
//! cycle is a schema error. Recursion through map properties, `_mapOf` or
//! list items always descends into a smaller node and stays legal.

use contour_core::{Error, Node};
use indexmap::IndexSet;

use crate::expr::{Expression, RuleId};
use crate::rule::Rule;

/// Rules reachable from `expression` without consuming content
pub(crate) fn head_references(expression: &Expression, out: &mut IndexSet<RuleId>) {
    match expression {
        Expression::Rule(id) => {
            out.insert(*id);
        }
        Expression::OneOf(options) => {
            for option in options {
                head_references(option, out);
            }
        }
        Expression::Map(map) => {
            for member in &map.merge {
                head_references(member.expression(), out);
            }
        }
        Expression::List(_) | Expression::In(_) | Expression::Regex(_) => {}
    }
}

/// Report every user rule lying on a head cycle
pub(crate) fn check_head_cycles(rules: &[Rule]) -> Vec<Error> {
    let heads: Vec<IndexSet<RuleId>> = rules
        .iter()
        .map(|rule| {
            let mut out = IndexSet::new();
            if let Some(expression) = rule.expression() {
                head_references(expression, &mut out);
            }
            out
        })
        .collect();

    let mut errors = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        let Some(declaration) = rule.declaration() else {
            continue;
        };
        if reaches(&heads, RuleId(index)) {
            errors.push(cycle_error(declaration, rule.name()));
        }
    }
    errors
}

/// Whether `start` can reach itself through head references
fn reaches(heads: &[IndexSet<RuleId>], start: RuleId) -> bool {
    let mut visited = IndexSet::new();
    let mut stack: Vec<RuleId> = heads
        .get(start.index())
        .map(|h| h.iter().copied().collect())
        .unwrap_or_default();

    while let Some(current) = stack.pop() {
        if current == start {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = heads.get(current.index()) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

fn cycle_error(declaration: &Node, name: &str) -> Error {
    Error::schema(
        declaration,
        format!(
            "rule '{}' to consume content before referring back to itself \
             (through a map property, _mapOf or a list item)",
            name
        ),
    )
}
