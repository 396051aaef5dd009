//! Result tree produced by a successful match.
//!
//! Every [`MatchOutput`] records the content position it was produced from,
//! the rule that produced it and whether a builder replaced its data.

use crate::error::Error;
use crate::position::Position;
use indexmap::IndexMap;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque value returned by a builder
#[derive(Clone)]
pub struct BuiltValue {
    label: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl BuiltValue {
    /// Wrap a domain value
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            label: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Borrow the wrapped value as `T`
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Type name of the wrapped value
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Debug for BuiltValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltValue({})", self.label)
    }
}

impl PartialEq for BuiltValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Data carried by a result
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Null scalar
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Float scalar
    Float(f64),
    /// String-like scalar (strings, enumerations, regex matches, timestamps, binaries)
    Str(String),
    /// Result of a map form
    Map(MapData),
    /// Result of a list form
    List(ListData),
    /// Value produced by a builder
    Built(BuiltValue),
}

impl Data {
    /// String content, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if any
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float content; integers widen
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean content, if any
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Map content, if any
    #[must_use]
    pub const fn as_map(&self) -> Option<&MapData> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// List content, if any
    #[must_use]
    pub const fn as_list(&self) -> Option<&ListData> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Builder output as `T`, if any
    #[must_use]
    pub fn downcast_ref<T: std::any::Any>(&self) -> Option<&T> {
        match self {
            Self::Built(b) => b.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Whether this is the null scalar
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Str(s) => Value::String(s.clone()),
            Self::Map(m) => m.to_json(),
            Self::List(l) => l.to_json(),
            Self::Built(b) => Value::String(format!("<built {}>", b.label())),
        }
    }
}

/// Result of a map form: named properties (including merged ones) and the
/// entries accepted by `_mapOf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    /// Properties declared in `_map` / `_mapOptional`, by name
    pub named: IndexMap<String, MatchOutput>,
    /// Entries accepted by `_mapOf`, in document order
    pub unordered: Vec<(MatchOutput, MatchOutput)>,
}

impl MapData {
    /// Create an empty map result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Named property by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MatchOutput> {
        self.named.get(name)
    }

    /// `_mapOf` entries keyed by their string key
    ///
    /// # Errors
    ///
    /// Returns the first key whose data is not a string
    pub fn hashed(&self) -> Result<IndexMap<&str, &MatchOutput>, &MatchOutput> {
        let mut out = IndexMap::with_capacity(self.unordered.len());
        for (key, value) in &self.unordered {
            match key.data().as_str() {
                Some(name) => {
                    out.entry(name).or_insert(value);
                }
                None => return Err(key),
            }
        }
        Ok(out)
    }

    fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.named {
            object.insert(name.clone(), value.to_json());
        }
        for (key, value) in &self.unordered {
            let name = match key.data() {
                Data::Str(s) => s.clone(),
                other => other.to_json().to_string(),
            };
            object.entry(name).or_insert_with(|| value.to_json());
        }
        Value::Object(object)
    }
}

/// Result of a list form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListData {
    /// Items matched by `_list` then `_listOptional`
    pub positional: Vec<MatchOutput>,
    /// Items matched by `_listOf`
    pub overflow: Vec<MatchOutput>,
}

impl ListData {
    /// Create an empty list result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.overflow.len()
    }

    /// Whether no item was matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items in document order
    pub fn iter(&self) -> impl Iterator<Item = &MatchOutput> {
        self.positional.iter().chain(self.overflow.iter())
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(MatchOutput::to_json).collect())
    }
}

/// A node of the result tree
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutput {
    position: Position,
    data: Data,
    built: bool,
    rule: Option<String>,
}

impl MatchOutput {
    /// Create a result for content found at `position`
    #[must_use]
    pub fn new(position: Position, data: Data) -> Self {
        Self {
            position,
            data,
            built: false,
            rule: None,
        }
    }

    /// Record the rule that produced this result
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Record the rule a result passed through; a built result keeps the
    /// name of the rule whose builder produced it
    #[must_use]
    pub fn stamp_rule(self, rule: impl Into<String>) -> Self {
        if self.built { self } else { self.with_rule(rule) }
    }

    /// Replace the data with a builder's output
    #[must_use]
    pub fn into_built(mut self, data: Data) -> Self {
        self.data = data;
        self.built = true;
        self
    }

    /// Content position of the matched node
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Produced data
    #[must_use]
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Take the produced data
    #[must_use]
    pub fn into_data(self) -> Data {
        self.data
    }

    /// Whether a builder produced the data
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Name of the producing rule, empty if none
    #[must_use]
    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or("")
    }

    /// Builder error positioned at this value
    #[must_use]
    pub fn reject(&self, message: impl Into<String>) -> Error {
        Error::Builder {
            rule: self.rule_name().to_string(),
            position: self.position.clone(),
            message: message.into(),
        }
    }

    /// Render the data as JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.data.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(data: Data) -> MatchOutput {
        MatchOutput::new(Position::new("c.yaml", 1, 1), data)
    }

    #[test]
    fn test_rule_name_defaults_to_empty() {
        let o = out(Data::Null);
        assert_eq!(o.rule_name(), "");
        assert_eq!(o.with_rule("main").rule_name(), "main");
    }

    #[test]
    fn test_stamp_keeps_builder_rule() {
        let plain = out(Data::Int(80)).with_rule("int").stamp_rule("port");
        assert_eq!(plain.rule_name(), "port");

        let built = plain.into_built(Data::Built(BuiltValue::new(80u16))).stamp_rule("main");
        assert_eq!(built.rule_name(), "port");
    }

    #[test]
    fn test_built_value_downcast() {
        let o = out(Data::Str("Jaguar".into())).into_built(Data::Built(BuiltValue::new('J')));
        assert!(o.is_built());
        assert_eq!(o.data().downcast_ref::<char>(), Some(&'J'));
        assert_eq!(o.data().downcast_ref::<String>(), None);
    }

    #[test]
    fn test_hashed() {
        let mut map = MapData::new();
        map.unordered.push((out(Data::Str("a".into())), out(Data::Int(1))));
        map.unordered.push((out(Data::Str("b".into())), out(Data::Int(2))));
        let hashed = map.hashed().unwrap();
        assert_eq!(hashed.len(), 2);
        assert_eq!(hashed["b"].data().as_i64(), Some(2));

        map.unordered.push((out(Data::Int(3)), out(Data::Null)));
        assert_eq!(map.hashed().unwrap_err().data(), &Data::Int(3));
    }

    #[test]
    fn test_to_json() {
        let mut map = MapData::new();
        map.named.insert("name".into(), out(Data::Str("root".into())));
        let list = ListData {
            positional: vec![out(Data::Int(1))],
            overflow: vec![out(Data::Bool(true)), out(Data::Null)],
        };
        map.named.insert("items".into(), out(Data::List(list)));
        map.unordered.push((out(Data::Int(7)), out(Data::Float(0.5))));

        let json = out(Data::Map(map)).to_json();
        assert_eq!(
            json,
            serde_json::json!({"name": "root", "items": [1, true, null], "7": 0.5})
        );
    }

    #[test]
    fn test_reject_carries_rule_and_position() {
        let o = out(Data::Str(String::new())).with_rule("animal");
        let err = o.reject("animal can't be the empty string");
        assert_eq!(err.position().map(Position::line), Some(1));
        assert!(err.to_string().contains("'animal'"));
    }

    #[test]
    fn test_list_iter_order() {
        let list = ListData {
            positional: vec![out(Data::Int(1))],
            overflow: vec![out(Data::Int(2))],
        };
        let values: Vec<i64> = list.iter().filter_map(|o| o.data().as_i64()).collect();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(list.len(), 2);
    }
}
