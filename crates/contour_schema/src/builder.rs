//! Builder callbacks for exported rules.
//!
//! A builder turns the result of a successful match into a domain value, or
//! rejects it with errors. Builders are registered by export name before
//! compilation and attached to the rules declared with `name:` or
//! `name::exported`.

use contour_core::{Data, Error, MatchOutput};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Signature of a builder callback
pub type BuildFn = dyn Fn(&MatchOutput) -> Result<Data, Vec<Error>> + Send + Sync;

/// Shared builder callback
pub type Builder = Arc<BuildFn>;

/// Builders by export name
#[derive(Clone, Default)]
pub struct BuilderRegistry {
    builders: IndexMap<String, Builder>,
}

impl BuilderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&MatchOutput) -> Result<Data, Vec<Error>> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Arc::new(builder));
    }

    /// Register a builder, builder-style
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&MatchOutput) -> Result<Data, Vec<Error>> + Send + Sync + 'static,
    {
        self.register(name, builder);
        self
    }

    /// Builder registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Builder> {
        self.builders.get(name)
    }

    /// Whether a builder is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Number of registered builders
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Whether no builder is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("names", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::Position;

    #[test]
    fn test_register_and_call() {
        let registry = BuilderRegistry::new()
            .with("upper", |output: &MatchOutput| match output.data().as_str() {
                Some(s) => Ok(Data::Str(s.to_uppercase())),
                None => Err(vec![output.reject("a string")]),
            });

        assert!(registry.contains("upper"));
        assert_eq!(registry.len(), 1);

        let builder = registry.get("upper").unwrap();
        let input = MatchOutput::new(Position::default(), Data::Str("abc".into()));
        assert_eq!(builder(&input), Ok(Data::Str("ABC".into())));

        let bad = MatchOutput::new(Position::default(), Data::Int(1));
        assert_eq!(builder(&bad).unwrap_err().len(), 1);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let mut registry = BuilderRegistry::new();
        registry.register("b", |_: &MatchOutput| Ok(Data::Null));
        registry.register("a", |_: &MatchOutput| Ok(Data::Null));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(format!("{:?}", registry).contains("\"b\""));
    }
}
