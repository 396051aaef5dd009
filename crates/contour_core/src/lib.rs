//! CONTOUR Core Types
//!
//! This crate contains the pure data model shared by the schema compiler
//! and the matcher: the generic document tree, source positions, the error
//! type with its accumulator, and the result tree produced by a match.
//! Nothing in here performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod errorlist;
pub mod node;
pub mod position;
pub mod result;

// Re-exports
pub use error::Error;
pub use errorlist::ErrorList;
pub use node::{Node, NodeKind, Tag};
pub use position::{Location, Position};
pub use result::{BuiltValue, Data, ListData, MapData, MatchOutput};
