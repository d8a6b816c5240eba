//! Nested value model.
//!
//! This module holds the data model shared by the transforms:
//! - `NestedValue`, the recursive Scalar/Sequence/Mapping tree
//! - `Key` and `Symbol`, raw and canonical mapping keys
//! - `TreePath`, location tracking and the nesting guard for walkers
//! - Conversions from and to YAML/JSON documents

mod convert;
mod path;
mod types;

pub(crate) use convert::import_yaml;
pub use path::{DEFAULT_MAX_DEPTH, TreePath};
pub use types::{Key, Mapping, NestedValue, Number, Scalar, Symbol};
