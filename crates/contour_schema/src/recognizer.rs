//! Expression and form recognizer.
//!
//! Turns the raw body of a rule into an [`Expression`]. A string is an
//! identifier reference; a mapping is a form whose keywords select one of
//! the form checkers below. Every checker accumulates its errors so one
//! malformed property does not hide the others.

use contour_core::{Error, ErrorList, Node, Tag};
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::expr::{Expression, InExpr, KeyValue, ListExpr, MapExpr, Mergeable, RegexExpr, RuleId};
use crate::keyword::{Form, Keyword};
use crate::rule::Rule;
use crate::sizing::Sizing;

static IDENTIFIER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)*$"));

/// Whether `text` is a valid rule identifier (`a.b_c`, segments start with a letter)
///
/// # Errors
///
/// Returns an internal error if the identifier pattern fails to build
pub fn is_identifier(text: &str) -> Result<bool, Error> {
    IDENTIFIER
        .as_ref()
        .map(|re| re.is_match(text))
        .map_err(|e| Error::internal(format!("identifier pattern: {}", e)))
}

/// Keyword values of one form mapping
type Fields<'n> = IndexMap<Keyword, &'n Node>;

/// Resolution context of pass 1
pub(crate) struct Resolver<'s> {
    rules: &'s [Rule],
    by_name: &'s IndexMap<String, RuleId>,
    any: RuleId,
    bypass_missing_rule: bool,
    fail_fast: bool,
    current: Option<RuleId>,
    references: IndexSet<RuleId>,
}

impl<'s> Resolver<'s> {
    pub(crate) fn new(
        rules: &'s [Rule],
        by_name: &'s IndexMap<String, RuleId>,
        any: RuleId,
        bypass_missing_rule: bool,
        fail_fast: bool,
    ) -> Self {
        Self {
            rules,
            by_name,
            any,
            bypass_missing_rule,
            fail_fast,
            current: None,
            references: IndexSet::new(),
        }
    }

    /// Resolve the body of `rule`
    pub(crate) fn resolve_rule(&mut self, rule: RuleId, body: &Node) -> Result<Expression, Vec<Error>> {
        self.current = Some(rule);
        let result = self.expression(body);
        self.current = None;
        result
    }

    /// Rules referenced from another rule's body
    pub(crate) fn into_references(self) -> IndexSet<RuleId> {
        self.references
    }

    fn errors(&self) -> ErrorList {
        ErrorList::with_mode(self.fail_fast)
    }

    /// Parse any expression
    pub(crate) fn expression(&mut self, node: &Node) -> Result<Expression, Vec<Error>> {
        if node.is_string() {
            return self.identifier(node);
        }
        if !node.is_mapping() || node.size() == Some(0) {
            return Err(vec![Error::schema(
                node,
                "an expression (a rule identifier or a non-empty mapping)",
            )]);
        }
        self.form(node)
    }

    fn identifier(&mut self, node: &Node) -> Result<Expression, Vec<Error>> {
        let name = node.value();
        if !is_identifier(name).map_err(|e| vec![e])? {
            return Err(vec![Error::schema(
                node,
                "a valid identifier reference ([a-zA-Z][a-zA-Z0-9_]* segments separated by '.')",
            )]);
        }

        if let Some(&id) = self.by_name.get(name) {
            if self.current != Some(id) {
                self.references.insert(id);
            }
            return Ok(Expression::Rule(id));
        }

        if self.bypass_missing_rule {
            trace!(identifier = name, "Unknown identifier resolved to any");
            return Ok(Expression::Rule(self.any));
        }

        Err(vec![Error::schema(node, "the identifier to be declared in the schema")])
    }

    /// Classify the keywords of a mapping and dispatch to the form checker
    fn form(&mut self, node: &Node) -> Result<Expression, Vec<Error>> {
        let mut errors = self.errors();
        let mut fields: Fields<'_> = IndexMap::new();
        let mut form: Option<(Form, &Node)> = None;
        let mut sizing_key: Option<&Node> = None;

        for (key, value) in node.entries() {
            if !key.is_string() {
                errors.push(Error::schema(key, "only string keys in an expression"));
                continue;
            }
            let Some(keyword) = Keyword::parse(key.value()) else {
                errors.push(Error::schema(
                    key,
                    "a known keyword (_map, _mapOptional, _mapOf, _merge, _list, _listOptional, \
                     _listOf, _oneOf, _in, _regex, _min, _max, _exactCount)",
                ));
                continue;
            };
            if fields.contains_key(&keyword) {
                errors.push(Error::schema(key, format!("no second occurrence of keyword {}", keyword)));
                continue;
            }
            fields.insert(keyword, value);

            let kind = keyword.form();
            let conflict = match (kind, form) {
                (Form::Sizing, Some((dominant, other))) if !dominant.accepts_sizing() => {
                    Some((dominant, other))
                }
                (Form::Sizing, _) => {
                    sizing_key.get_or_insert(key);
                    None
                }
                (_, Some((dominant, other))) if dominant != kind => Some((dominant, other)),
                (_, Some(_)) => None,
                (_, None) => match sizing_key {
                    Some(other) if !kind.accepts_sizing() => Some((Form::Sizing, other)),
                    _ => {
                        form = Some((kind, key));
                        None
                    }
                },
            };

            if let Some((dominant, other)) = conflict {
                errors.push(Error::schema(
                    key,
                    format!(
                        "no keyword {} (form {}) next to keyword {} (form {})",
                        key.value(),
                        kind,
                        other.value(),
                        dominant
                    ),
                ));
            }
        }

        let expression = match form {
            Some((Form::Map, _)) => errors.absorb(self.map_form(node, &fields)),
            Some((Form::List, _)) => errors.absorb(self.list_form(node, &fields)),
            Some((Form::OneOf, _)) => errors.absorb(self.one_of_form(&fields)),
            Some((Form::In, _)) => errors.absorb(self.in_form(&fields)),
            Some((Form::Regex, _)) => errors.absorb(self.regex_form(&fields)),
            Some((Form::Sizing, _)) => None,
            None => {
                if errors.is_empty() {
                    let expected = match sizing_key {
                        Some(_) => "a map or list form next to the sizing keywords",
                        None => "a recognisable form",
                    };
                    errors.push(Error::schema(node, expected));
                }
                None
            }
        };

        match expression {
            Some(expression) if errors.is_empty() => Ok(expression),
            _ => Err(errors.into_vec()),
        }
    }

    fn map_form(&mut self, node: &Node, fields: &Fields<'_>) -> Result<Expression, Vec<Error>> {
        let mut errors = self.errors();
        let mut map = MapExpr::default();

        if let Some(value) = fields.get(&Keyword::Map) {
            if let Some(properties) = errors.absorb(self.properties(value, None)) {
                map.properties = properties;
            }
        }

        if let Some(value) = fields.get(&Keyword::MapOptional) {
            if let Some(optional) = errors.absorb(self.properties(value, Some(&map.properties))) {
                map.optional = optional;
            }
        }

        if let Some(value) = fields.get(&Keyword::MapOf) {
            map.map_of = errors.absorb(self.map_of(value)).map(Box::new);
        }

        if let Some(value) = fields.get(&Keyword::Merge) {
            if let Some(merge) = errors.absorb(self.merge_list(value)) {
                map.merge = merge;
            }
        }

        if let Some(sizing) = errors.absorb(self.sizing(node, fields)) {
            map.sizing = sizing;
        }

        errors.into_result(Expression::Map(map))
    }

    /// Named properties of `_map` / `_mapOptional`
    fn properties(
        &mut self,
        value: &Node,
        required: Option<&IndexMap<String, Expression>>,
    ) -> Result<IndexMap<String, Expression>, Vec<Error>> {
        if !value.is_mapping() {
            return Err(vec![Error::schema(value, "a mapping of property names to expressions")]);
        }

        let mut errors = self.errors();
        let mut properties = IndexMap::new();
        for (key, body) in value.entries() {
            if errors.is_done() {
                break;
            }
            if !key.is_string() {
                errors.push(Error::schema(key, "a string property name"));
                continue;
            }
            if required.is_some_and(|r| r.contains_key(key.value())) {
                errors.push(Error::schema(key, "an optional property not already declared in _map"));
                continue;
            }
            if let Some(expression) = errors.absorb(self.expression(body)) {
                properties.insert(key.value().to_string(), expression);
            }
        }
        errors.into_result(properties)
    }

    fn map_of(&mut self, value: &Node) -> Result<KeyValue, Vec<Error>> {
        let mut entries = value.entries();
        let (key, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(vec![Error::schema(
                    value,
                    "a mapping with exactly one entry (key expression: value expression)",
                )]);
            }
        };

        let mut errors = self.errors();
        let key = errors.absorb(self.expression(key));
        let value = errors.absorb(self.expression(body));
        match (key, value) {
            (Some(key), Some(value)) if errors.is_empty() => Ok(KeyValue { key, value }),
            _ => Err(errors.into_vec()),
        }
    }

    fn merge_list(&mut self, value: &Node) -> Result<Vec<Mergeable>, Vec<Error>> {
        if !value.is_sequence() {
            return Err(vec![Error::schema(value, "a sequence of mergeable expressions")]);
        }

        let mut errors = self.errors();
        let mut merge = Vec::new();
        for item in value.children() {
            if errors.is_done() {
                break;
            }
            let Some(expression) = errors.absorb(self.expression(item)) else {
                continue;
            };
            if self.is_mergeable(item, &mut IndexSet::new()) {
                merge.push(Mergeable::new(expression));
            } else {
                errors.push(Error::schema(
                    item,
                    "a mergeable expression (a map form, a _oneOf of mergeables, or a rule resolving to one)",
                ));
            }
        }
        errors.into_result(merge)
    }

    /// Whether a raw expression can contribute properties to an enclosing map
    ///
    /// Works on the unresolved bodies so it can run before the referenced
    /// rules are compiled. A reference cycle is not mergeable.
    pub(crate) fn is_mergeable(&self, node: &Node, visiting: &mut IndexSet<RuleId>) -> bool {
        if node.is_string() {
            let Some(&id) = self.by_name.get(node.value()) else {
                return false;
            };
            let Some(rule) = self.rules.get(id.index()) else {
                return false;
            };
            if rule.is_builtin() || !visiting.insert(id) {
                return false;
            }
            let mergeable = rule.body().is_some_and(|body| self.is_mergeable(body, visiting));
            visiting.swap_remove(&id);
            return mergeable;
        }

        let mut options = None;
        for (key, value) in node.entries() {
            match Keyword::parse(key.value()) {
                Some(keyword) if key.is_string() && keyword.form() == Form::Map => return true,
                Some(Keyword::OneOf) if key.is_string() => options = Some(value),
                _ => {}
            }
        }
        options.is_some_and(|options| {
            options.is_sequence()
                && options
                    .children()
                    .iter()
                    .all(|option| self.is_mergeable(option, visiting))
        })
    }

    fn list_form(&mut self, node: &Node, fields: &Fields<'_>) -> Result<Expression, Vec<Error>> {
        let mut errors = self.errors();
        let mut list = ListExpr::default();

        if let Some(value) = fields.get(&Keyword::List) {
            if let Some(items) = errors.absorb(self.sequence_of_expressions(value)) {
                list.required = items;
            }
        }

        if let Some(value) = fields.get(&Keyword::ListOptional) {
            if let Some(items) = errors.absorb(self.sequence_of_expressions(value)) {
                list.optional = items;
            }
        }

        if let Some(value) = fields.get(&Keyword::ListOf) {
            list.rest = errors.absorb(self.expression(value)).map(Box::new);
        }

        if let Some(sizing) = errors.absorb(self.sizing(node, fields)) {
            if !sizing.is_none() && !fields.contains_key(&Keyword::ListOf) {
                errors.push(Error::schema(
                    node,
                    "sizing keywords only together with _listOf (a closed tuple already fixes the length)",
                ));
            }
            list.sizing = sizing;
        }

        errors.into_result(Expression::List(list))
    }

    fn sequence_of_expressions(&mut self, value: &Node) -> Result<Vec<Expression>, Vec<Error>> {
        if !value.is_sequence() {
            return Err(vec![Error::schema(value, "a sequence of expressions")]);
        }

        let mut errors = self.errors();
        let mut items = Vec::with_capacity(value.children().len());
        for item in value.children() {
            if errors.is_done() {
                break;
            }
            if let Some(expression) = errors.absorb(self.expression(item)) {
                items.push(expression);
            }
        }
        errors.into_result(items)
    }

    fn one_of_form(&mut self, fields: &Fields<'_>) -> Result<Expression, Vec<Error>> {
        let Some(value) = fields.get(&Keyword::OneOf) else {
            return Err(vec![Error::internal("oneOf form without _oneOf")]);
        };
        self.sequence_of_expressions(value).map(Expression::OneOf)
    }

    fn in_form(&self, fields: &Fields<'_>) -> Result<Expression, Vec<Error>> {
        let Some(value) = fields.get(&Keyword::In) else {
            return Err(vec![Error::internal("in form without _in")]);
        };
        if !value.is_sequence() {
            return Err(vec![Error::schema(value, "a sequence of scalars")]);
        }

        let mut errors = self.errors();
        let mut set = InExpr::new();
        for item in value.children() {
            if !item.is_scalar() {
                errors.push(Error::schema(item, "a scalar value"));
            } else if !set.insert(item.tag().clone(), item.value()) {
                errors.push(Error::schema(item, "no duplicated value"));
            }
        }
        errors.into_result(Expression::In(set))
    }

    fn regex_form(&self, fields: &Fields<'_>) -> Result<Expression, Vec<Error>> {
        let Some(value) = fields.get(&Keyword::Regex) else {
            return Err(vec![Error::internal("regex form without _regex")]);
        };
        if !value.is_string() {
            return Err(vec![Error::schema(value, "a string (a regex)")]);
        }
        RegexExpr::new(value.value())
            .map(Expression::Regex)
            .map_err(|e| vec![Error::schema(value, format!("a valid regex (error: '{}')", e))])
    }

    /// `_min` / `_max` / `_exactCount` of a map or list form
    fn sizing(&self, node: &Node, fields: &Fields<'_>) -> Result<Sizing, Vec<Error>> {
        let mut errors = self.errors();
        let mut bound = |keyword: Keyword| {
            let value = fields.get(&keyword)?;
            let parsed = if value.is_scalar() && *value.tag() == Tag::Int {
                value.value().parse::<i64>().ok()
            } else {
                None
            };
            match parsed.map(usize::try_from) {
                Some(Ok(n)) => Some(n),
                Some(Err(_)) => {
                    errors.push(Error::schema(value, format!("a non-negative integer for {}", keyword)));
                    None
                }
                None => {
                    errors.push(Error::schema(value, format!("an integer for {}", keyword)));
                    None
                }
            }
        };

        let min = bound(Keyword::Min);
        let max = bound(Keyword::Max);
        let exact = bound(Keyword::ExactCount);
        if !errors.is_empty() {
            return Err(errors.into_vec());
        }

        Sizing::from_bounds(min, max, exact).map_err(|expected| vec![Error::schema(node, expected)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use contour_yaml::load_yaml;

    struct Table {
        rules: Vec<Rule>,
        by_name: IndexMap<String, RuleId>,
        any: RuleId,
    }

    impl Table {
        fn new(schema: &str) -> Self {
            let mut rules = Vec::new();
            let mut by_name = IndexMap::new();
            let any = builtin::seed(&mut rules, &mut by_name);
            let doc = load_yaml("schema.yaml", schema).unwrap();
            for (key, body) in doc.root().unwrap().entries() {
                by_name.insert(key.value().to_string(), RuleId(rules.len()));
                rules.push(Rule::hollow(key.value().to_string(), None, key.clone(), body.clone()));
            }
            Self { rules, by_name, any }
        }

        fn resolver(&self) -> Resolver<'_> {
            Resolver::new(&self.rules, &self.by_name, self.any, false, false)
        }
    }

    fn parse(table: &Table, expression: &str) -> Result<Expression, Vec<Error>> {
        let node = load_yaml("expr.yaml", expression).unwrap();
        table.resolver().expression(node.root().unwrap())
    }

    fn expected_of(errors: &[Error]) -> Vec<String> {
        errors
            .iter()
            .map(|e| match e {
                Error::Schema { expected, .. } => expected.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("a.b_c9").unwrap());
        assert!(!is_identifier("9a").unwrap());
        assert!(!is_identifier("a..b").unwrap());
        assert!(!is_identifier("_map").unwrap());
    }

    #[test]
    fn test_identifier_reference() {
        let table = Table::new("node: string\n");
        assert!(matches!(parse(&table, "node"), Ok(Expression::Rule(_))));
        assert!(matches!(parse(&table, "int"), Ok(Expression::Rule(_))));

        let errors = parse(&table, "missing").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["the identifier to be declared in the schema"]);
    }

    #[test]
    fn test_bypass_missing_rule() {
        let table = Table::new("{}");
        let node = load_yaml("expr.yaml", "missing").unwrap();
        let mut resolver = Resolver::new(&table.rules, &table.by_name, table.any, true, false);
        match resolver.expression(node.root().unwrap()) {
            Ok(Expression::Rule(id)) => assert_eq!(id, table.any),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_map_form() {
        let table = Table::new("{}");
        let expr = parse(
            &table,
            "{ _map: { a: int }, _mapOptional: { b: string }, _mapOf: { string: any }, _min: 1 }",
        )
        .unwrap();
        match expr {
            Expression::Map(map) => {
                assert_eq!(map.properties.keys().collect::<Vec<_>>(), vec!["a"]);
                assert_eq!(map.optional.keys().collect::<Vec<_>>(), vec!["b"]);
                assert!(map.map_of.is_some());
                assert_eq!(map.sizing, Sizing::Min(1));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_facultative_alias() {
        let table = Table::new("{}");
        match parse(&table, "{ _mapFacultative: { b: string } }").unwrap() {
            Expression::Map(map) => assert_eq!(map.optional.len(), 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_forms() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _map: {}, _list: [] }").unwrap_err();
        assert_eq!(errors.len(), 1);
        let text = errors[0].to_string();
        assert!(text.contains("_list"));
        assert!(text.contains("_map"));
    }

    #[test]
    fn test_sizing_needs_map_or_list() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _regex: 'a', _min: 1 }").unwrap_err();
        assert!(errors[0].to_string().contains("_min"));

        let errors = parse(&table, "{ _min: 1 }").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["a map or list form next to the sizing keywords"]);
    }

    #[test]
    fn test_unknown_keyword_and_empty_mapping() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _seq: [] }").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(expected_of(&errors)[0].starts_with("a known keyword"));

        assert!(parse(&table, "{}").is_err());
        assert!(parse(&table, "[string]").is_err());
    }

    #[test]
    fn test_duplicate_keyword_through_alias() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _nb: 1, _exactCount: 1, _listOf: int }").unwrap_err();
        assert!(expected_of(&errors)[0].contains("_exactCount"));
    }

    #[test]
    fn test_sizing_errors() {
        let table = Table::new("{}");
        assert!(parse(&table, "{ _listOf: int, _min: -1 }").is_err());
        assert!(parse(&table, "{ _listOf: int, _min: 'two' }").is_err());
        assert!(parse(&table, "{ _listOf: int, _min: 3, _max: 1 }").is_err());
        assert!(parse(&table, "{ _listOf: int, _min: 1, _exactCount: 2 }").is_err());
        assert!(parse(&table, "{ _listOf: int, _min: 1, _max: 3 }").is_ok());
    }

    #[test]
    fn test_sizing_on_closed_tuple() {
        let table = Table::new("{}");
        assert!(parse(&table, "{ _list: [string], _min: 2 }").is_err());
        assert!(parse(&table, "{ _list: [string], _listOf: int, _min: 2 }").is_ok());
    }

    #[test]
    fn test_property_in_both_maps() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _map: { a: int }, _mapOptional: { a: int } }").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_map_of_needs_one_entry() {
        let table = Table::new("{}");
        assert!(parse(&table, "{ _mapOf: {} }").is_err());
        assert!(parse(&table, "{ _mapOf: { string: int, int: int } }").is_err());
    }

    #[test]
    fn test_errors_accumulate_across_properties() {
        let table = Table::new("{}");
        let errors = parse(&table, "{ _map: { a: nope, b: nada, c: { _bad: 1 } } }").unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_in_form() {
        let table = Table::new("{}");
        match parse(&table, "{ _in: [a, 1, '1', true] }").unwrap() {
            Expression::In(set) => {
                assert!(set.contains(&Tag::Str, "a"));
                assert!(set.contains(&Tag::Int, "1"));
                assert!(set.contains(&Tag::Str, "1"));
                assert!(set.contains(&Tag::Bool, "true"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let errors = parse(&table, "{ _in: [a, a, [b]] }").unwrap_err();
        assert_eq!(expected_of(&errors), vec!["no duplicated value", "a scalar value"]);
        assert!(parse(&table, "{ _in: a }").is_err());
    }

    #[test]
    fn test_regex_form() {
        let table = Table::new("{}");
        assert!(matches!(parse(&table, "{ _regex: '^a+$' }"), Ok(Expression::Regex(_))));

        let errors = parse(&table, "{ _regex: '(' }").unwrap_err();
        assert!(expected_of(&errors)[0].starts_with("a valid regex (error: '"));
        assert!(parse(&table, "{ _regex: 3 }").is_err());
    }

    #[test]
    fn test_one_of_form() {
        let table = Table::new("{}");
        match parse(&table, "{ _oneOf: [] }").unwrap() {
            Expression::OneOf(options) => assert!(options.is_empty()),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse(&table, "{ _oneOf: string }").is_err());
    }

    #[test]
    fn test_mergeability() {
        let table = Table::new(
            "shape: { _map: { a: int } }\n\
             alias: shape\n\
             choice: { _oneOf: [shape, { _mapOf: { string: int } }] }\n\
             mixed: { _oneOf: [shape, string] }\n\
             loop: loop\n\
             words: { _listOf: string }\n",
        );
        let resolver = table.resolver();
        let check = |text: &str| {
            let node = load_yaml("expr.yaml", text).unwrap();
            resolver.is_mergeable(node.root().unwrap(), &mut IndexSet::new())
        };

        assert!(check("shape"));
        assert!(check("alias"));
        assert!(check("choice"));
        assert!(check("{ _merge: [] }"));
        assert!(!check("mixed"));
        assert!(!check("loop"));
        assert!(!check("words"));
        assert!(!check("any"));
        assert!(!check("string"));
    }

    #[test]
    fn test_merge_of_non_mergeable() {
        let table = Table::new("words: { _listOf: string }\nshape: { _map: {} }\n");
        assert!(parse(&table, "{ _merge: [shape] }").is_ok());
        let errors = parse(&table, "{ _merge: [shape, words, string] }").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(expected_of(&errors)[0].starts_with("a mergeable expression"));
    }
}
