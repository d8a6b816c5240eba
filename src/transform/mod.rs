//! Tree transformations.
//!
//! This module provides the two independent passes over nested values:
//! - Deep cloning into a tree that shares no container with its source
//! - Deep normalization of mapping keys into canonical symbols
//!
//! Both take the input by reference, never modify it and allocate a fresh
//! output tree, so they compose in either order.

mod clone;
mod normalize;

pub use clone::DeepCloner;
pub use normalize::{CollisionPolicy, KeyCollision, KeyNormalizer, Normalized};

use crate::error::TransformError;
use crate::value::NestedValue;

/// Copies `value` with the default depth limit.
///
/// # Errors
///
/// Returns an error if containers nest deeper than the default limit.
pub fn deep_clone(value: &NestedValue) -> Result<NestedValue, TransformError> {
    DeepCloner::new().clone_value(value)
}

/// Normalizes every mapping key of `value` with the default (first-wins)
/// collision policy.
///
/// # Errors
///
/// Returns an error for composite keys or over-deep nesting.
pub fn normalize_keys(value: &NestedValue) -> Result<NestedValue, TransformError> {
    KeyNormalizer::new().normalize(value)
}
