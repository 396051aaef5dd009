//! Recursive-descent matching of content nodes against expressions.
//!
//! Independent checks (distinct properties, distinct list positions, sizing
//! against required properties) all run and their errors are concatenated.
//! `_oneOf` is the only exclusive choice: the first option that matches
//! without error wins, and a total failure yields a single error naming
//! every alternative.

use contour_core::{Data, Error, ErrorList, ListData, MapData, MatchOutput, Node};
use contour_schema::{Expression, InExpr, ListExpr, MapExpr, RegexExpr, RuleId};
use indexmap::IndexSet;
use tracing::trace;

use crate::context::MatchContext;
use crate::hook::apply_builder;
use crate::intrinsic::{match_intrinsic, scalar_data};

type Entry<'n> = (&'n Node, &'n Node);

impl MatchContext<'_> {
    /// Match a content node against a rule, running its builder on success
    ///
    /// # Errors
    ///
    /// Returns every content error found, the builder's errors, or an
    /// internal error if the rule table is inconsistent
    pub fn match_rule(&self, id: RuleId, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        let Some(rule) = self.schema.rule(id) else {
            return Err(vec![Error::internal(format!("no rule with id {}", id.index()))]);
        };

        // `any` accepts every scalar, whatever its tag
        if id == self.schema.any() && node.is_scalar() {
            return Ok(MatchOutput::new(node.position().clone(), scalar_data(node)).with_rule(rule.name()));
        }

        let output = match (rule.intrinsic(), rule.expression()) {
            (Some(intrinsic), _) => match_intrinsic(intrinsic, node)?,
            (None, Some(body)) => self.match_expression(body, node)?,
            (None, None) => {
                return Err(vec![Error::internal(format!("rule '{}' was never resolved", rule.name()))]);
            }
        };

        apply_builder(rule, output.stamp_rule(rule.name()))
    }

    /// Match a content node against an expression
    ///
    /// # Errors
    ///
    /// Returns every content error found below `node`
    pub fn match_expression(&self, expression: &Expression, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        match expression {
            Expression::Rule(id) => self.match_rule(*id, node),
            Expression::Map(map) => self.match_map(expression, map, node),
            Expression::List(list) => self.match_list(expression, list, node),
            Expression::OneOf(options) => self.match_one_of(expression, options, node),
            Expression::In(set) => self.match_in(expression, set, node),
            Expression::Regex(regex) => self.match_regex(expression, regex, node),
        }
    }

    fn expected(&self, expression: &Expression, node: &Node) -> Vec<Error> {
        vec![Error::content(node, self.schema.describe(expression))]
    }

    fn match_map(&self, expression: &Expression, map: &MapExpr, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        if !node.is_mapping() {
            return Err(self.expected(expression, node));
        }

        let entries: Vec<Entry<'_>> = node.entries().collect();
        let mut used = vec![false; entries.len()];
        let mut data = MapData::new();
        let mut errors = self.errors();

        self.merge_map(map, node, &entries, &mut data, &mut used, &mut errors);

        for ((key, value), _) in entries.iter().zip(&used).filter(|(_, used)| !**used) {
            if errors.is_done() {
                break;
            }
            match &map.map_of {
                Some(pair) => {
                    let key_output = self.match_expression(&pair.key, key);
                    let value_output = self.match_expression(&pair.value, value);
                    match (key_output, value_output) {
                        (Ok(k), Ok(v)) => data.unordered.push((k, v)),
                        (k, v) => {
                            errors.absorb(k);
                            errors.absorb(v);
                        }
                    }
                }
                None => errors.push(Error::content(key, "no extra entry")),
            }
        }

        errors.into_result(MatchOutput::new(node.position().clone(), Data::Map(data)))
    }

    /// Match the named properties of a map form and of everything merged
    /// into it against one mapping node
    ///
    /// Sizing is checked against the full entry count at every level. A
    /// property matched here marks its entry as used so the enclosing map
    /// does not treat it as extra; an entry already used by another merged
    /// member is still matched against this member's expression.
    fn merge_map(
        &self,
        map: &MapExpr,
        node: &Node,
        entries: &[Entry<'_>],
        data: &mut MapData,
        used: &mut [bool],
        errors: &mut ErrorList,
    ) {
        if let Some(violation) = map.sizing.violation(entries.len()) {
            errors.push(Error::content(node, format!("a mapping {}", violation)));
        }

        let mut missing: IndexSet<&str> = map.properties.keys().map(String::as_str).collect();

        for (index, (key, value)) in entries.iter().enumerate() {
            if errors.is_done() {
                return;
            }
            if !key.is_string() {
                continue;
            }
            let name = key.value();
            let Some(property) = map.properties.get(name).or_else(|| map.optional.get(name)) else {
                continue;
            };

            missing.shift_remove(name);
            used[index] = true;
            if let Some(output) = errors.absorb(self.match_expression(property, value)) {
                data.named.entry(name.to_string()).or_insert(output);
            }
        }

        for member in &map.merge {
            if errors.is_done() {
                return;
            }
            self.merge_expression(member.expression(), node, entries, data, used, errors);
        }

        for name in missing {
            let expression = map.properties.get(name).map(|e| self.schema.name_of(e)).unwrap_or_default();
            errors.push(Error::content(node, format!("a property '{}' ({})", name, expression)));
        }
    }

    fn merge_expression(
        &self,
        expression: &Expression,
        node: &Node,
        entries: &[Entry<'_>],
        data: &mut MapData,
        used: &mut [bool],
        errors: &mut ErrorList,
    ) {
        match expression {
            Expression::Map(map) => self.merge_map(map, node, entries, data, used, errors),
            Expression::OneOf(options) => {
                for (index, option) in options.iter().enumerate() {
                    trace!(option = index, "Trying merged oneOf option");
                    let mut trial_used = used.to_vec();
                    let mut trial_data = data.clone();
                    let mut trial_errors = self.trial().errors();
                    self.trial()
                        .merge_expression(option, node, entries, &mut trial_data, &mut trial_used, &mut trial_errors);

                    if let Some(internal) = trial_errors.errors().iter().find(|e| e.is_internal()) {
                        errors.push(internal.clone());
                        return;
                    }
                    if trial_errors.is_empty() {
                        used.copy_from_slice(&trial_used);
                        *data = trial_data;
                        return;
                    }
                }
                errors.push(Error::content(
                    node,
                    format!("a mapping merging {}", self.schema.describe(expression)),
                ));
            }
            Expression::Rule(id) => match self.schema.rule(*id).and_then(|rule| rule.expression()) {
                Some(body) => self.merge_expression(body, node, entries, data, used, errors),
                None => errors.push(Error::internal(format!(
                    "merge of rule '{}' which has no mergeable body",
                    self.schema.name_of(expression)
                ))),
            },
            other => errors.push(Error::internal(format!(
                "merge of a non-mergeable expression {}",
                self.schema.name_of(other)
            ))),
        }
    }

    fn match_list(&self, expression: &Expression, list: &ListExpr, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        if !node.is_sequence() {
            return Err(self.expected(expression, node));
        }

        let items = node.children();
        let mut data = ListData::new();
        let mut errors = self.errors();

        if let Some(violation) = list.sizing.violation(items.len()) {
            errors.push(Error::content(node, format!("a sequence {}", violation)));
        }

        let positional = list.required.len() + list.optional.len();
        for (index, item) in items.iter().enumerate() {
            if errors.is_done() {
                break;
            }
            let item_expression = if index < list.required.len() {
                list.required.get(index)
            } else if index < positional {
                list.optional.get(index - list.required.len())
            } else {
                list.rest.as_deref()
            };

            let Some(item_expression) = item_expression else {
                errors.push(Error::content(item, format!("no item at index {}", index)));
                continue;
            };
            if let Some(output) = errors.absorb(self.match_expression(item_expression, item)) {
                if index < positional {
                    data.positional.push(output);
                } else {
                    data.overflow.push(output);
                }
            }
        }

        for (index, missing) in list.required.iter().enumerate().skip(items.len()) {
            errors.push(Error::content(
                node,
                format!("an item at index {} ({})", index, self.schema.name_of(missing)),
            ));
        }

        errors.into_result(MatchOutput::new(node.position().clone(), Data::List(data)))
    }

    fn match_one_of(
        &self,
        expression: &Expression,
        options: &[Expression],
        node: &Node,
    ) -> Result<MatchOutput, Vec<Error>> {
        // Errors of a failed option are discarded, so each option only has to
        // find its first one.
        let trial = self.trial();
        for (index, option) in options.iter().enumerate() {
            trace!(option = index, "Trying oneOf option");
            match trial.match_expression(option, node) {
                Ok(output) => return Ok(output),
                Err(errors) => {
                    if let Some(internal) = errors.into_iter().find(Error::is_internal) {
                        return Err(vec![internal]);
                    }
                }
            }
        }
        Err(self.expected(expression, node))
    }

    fn match_in(&self, expression: &Expression, set: &InExpr, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        if node.is_scalar() && set.contains(node.tag(), node.value()) {
            Ok(MatchOutput::new(node.position().clone(), scalar_data(node)))
        } else {
            Err(self.expected(expression, node))
        }
    }

    fn match_regex(&self, expression: &Expression, regex: &RegexExpr, node: &Node) -> Result<MatchOutput, Vec<Error>> {
        if node.is_string() && regex.is_match(node.value()) {
            Ok(MatchOutput::new(node.position().clone(), Data::Str(node.value().to_string())))
        } else {
            Err(self.expected(expression, node))
        }
    }
}
