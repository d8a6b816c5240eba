// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # ECS Deploy
//!
//! Tree transformations applied to task definitions before they are handed to
//! the ECS deployment API.
//!
//! ## Overview
//!
//! A task definition arrives from a YAML or JSON loader as a [`NestedValue`]:
//! a recursive tree of mappings, sequences and scalars. Two independent passes
//! work on that tree:
//!
//! - **Deep cloning** ([`DeepCloner`], [`deep_clone`]) copies the tree so that
//!   the copy shares no container with the original.
//! - **Key normalization** ([`KeyNormalizer`], [`normalize_keys`]) rewrites
//!   every mapping key, at any depth, into a canonical [`Symbol`].
//!
//! Both take their input by reference and build a fresh tree, so they compose
//! in either order. Keys that collapse onto the same symbol are resolved by a
//! [`CollisionPolicy`] and reported, never merged silently.
//!
//! ## Modules
//!
//! - [`value`]: The nested value model and its YAML/JSON conversions
//! - [`transform`]: Deep cloning and key normalization
//! - [`config`]: Document loading, overrides and settings
//! - [`request`]: Deployment request documents
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```
//! use ecs_deploy::{Key, NestedValue, normalize_keys};
//!
//! let raw: serde_yaml::Value = serde_yaml::from_str("cpu: 256\nportMappings: [{containerPort: 80}]\n")?;
//! let document = NestedValue::try_from(raw)?;
//! let normalized = normalize_keys(&document)?;
//!
//! let mapping = normalized.as_mapping().expect("mapping");
//! assert!(mapping.keys().all(Key::is_symbol));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod request;
pub mod transform;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{DocumentLoader, Override, TransformSettings};
pub use error::{EcsDeployError, Result, TransformError};
pub use request::DeployRequest;
pub use transform::{
    CollisionPolicy, DeepCloner, KeyCollision, KeyNormalizer, Normalized, deep_clone,
    normalize_keys,
};
pub use value::{Key, Mapping, NestedValue, Number, Scalar, Symbol};
