//! CONTOUR Matcher
//!
//! Validates content trees against a compiled [`contour_schema::Schema`].
//! Matching is recursive descent over the content; every independent defect
//! is reported in one pass unless fail-fast mode is requested. Rules with a
//! registered builder turn their match result into a domain value.
//!
//! The schema is never mutated while matching, so one schema can serve
//! concurrent validations from several threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod hook;
pub mod intrinsic;
mod matcher;
pub mod validator;

// Re-exports
pub use context::MatchContext;
pub use contour_schema::DEFAULT_ENTRY;
pub use hook::apply_builder;
pub use intrinsic::{match_intrinsic, scalar_data};
pub use validator::{Validator, validate};
