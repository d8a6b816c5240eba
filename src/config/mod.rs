//! Configuration module for the ECS deploy tool.
//!
//! This module holds the collaborators that feed the transforms:
//! - Loading YAML/JSON task definition documents and `.env` files
//! - Folding command-line overrides into a document
//! - Transform settings from the environment and flags

mod loader;
mod overrides;
mod settings;

pub use loader::{DEFAULT_DOCUMENT_FILES, DocumentFormat, DocumentLoader, find_document};
pub use overrides::{Override, apply_overrides};
pub use settings::{ENV_COLLISION_POLICY, ENV_MAX_DEPTH, TransformSettings};
