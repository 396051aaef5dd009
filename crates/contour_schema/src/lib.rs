//! CONTOUR Schema Compiler
//!
//! Compiles a schema document into an immutable rule table. A schema is a
//! mapping from rule declarations to expressions; an expression is either a
//! rule identifier or a mapping of `_`-keywords selecting a form (map, list,
//! oneOf, in, regex) with optional sizing.
//!
//! Compilation runs in two passes so rules may reference rules declared
//! later, or themselves. All schema errors are accumulated.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod builtin;
pub mod compiler;
mod dependence;
mod describe;
pub mod expr;
pub mod keyword;
pub mod options;
mod recognizer;
pub mod rule;
pub mod schema;
pub mod sizing;

// Re-exports
pub use builder::{BuildFn, Builder, BuilderRegistry};
pub use builtin::ANY;
pub use compiler::{Declaration, SchemaCompiler};
pub use expr::{Expression, InExpr, KeyValue, ListExpr, MapExpr, Mergeable, RegexExpr, RuleId};
pub use keyword::{Form, Keyword};
pub use options::Options;
pub use recognizer::is_identifier;
pub use rule::{Intrinsic, Rule};
pub use schema::{DEFAULT_ENTRY, Schema};
pub use sizing::Sizing;
