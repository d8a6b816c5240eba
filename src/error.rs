//! Error types for the ECS deploy tool.
//!
//! This module provides the error hierarchy for the tree transformations
//! (cloning and key normalization) and for the configuration collaborators
//! that feed them (document loading, overrides, settings).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ECS deploy tool.
#[derive(Debug, Error)]
pub enum EcsDeployError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tree transformation errors.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while cloning or normalizing a nested value.
///
/// Every variant carries the path (`$.containers[0].name`) at which the
/// problem was detected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The input holds a value the nested value model cannot represent.
    #[error("Cannot represent value at {path}: {message}")]
    Serialization {
        /// Location of the offending value.
        path: String,
        /// Description of the unrepresentable value.
        message: String,
    },

    /// Nesting exceeded the configured depth limit.
    ///
    /// Owned trees cannot hold reference cycles, so this also fires for
    /// acyclic input that is simply deeper than the limit.
    #[error("Nesting limit of {limit} levels exceeded at {path}")]
    CyclicStructure {
        /// Location where the limit was hit.
        path: String,
        /// The configured depth limit.
        limit: usize,
    },

    /// A mapping key has no canonical symbolic form.
    #[error("Key at {path} cannot be converted to a symbol: {key}")]
    NonSymbolizableKey {
        /// Location of the mapping holding the key.
        path: String,
        /// Rendering of the offending key.
        key: String,
    },

    /// Two keys of one mapping canonicalize to the same symbol.
    #[error("Keys at {path} collide on symbol :{symbol}")]
    KeyCollision {
        /// Location of the mapping holding the keys.
        path: String,
        /// The shared canonical symbol.
        symbol: String,
    },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document file was not found.
    #[error("Document file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The document could not be parsed.
    #[error("Failed to parse document: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// An override (`path=value`) is malformed or cannot be applied.
    #[error("Invalid override '{input}': {message}")]
    InvalidOverride {
        /// The override as given.
        input: String,
        /// Why it was rejected.
        message: String,
    },

    /// A setting has an invalid value.
    #[error("Invalid setting {name}: {message}")]
    InvalidSetting {
        /// Name of the setting.
        name: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Result type alias for ECS deploy operations.
pub type Result<T> = std::result::Result<T, EcsDeployError>;

impl TransformError {
    /// Creates a serialization error at the given path.
    #[must_use]
    pub fn serialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the path at which the error was detected.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Serialization { path, .. }
            | Self::CyclicStructure { path, .. }
            | Self::NonSymbolizableKey { path, .. }
            | Self::KeyCollision { path, .. } => path,
        }
    }
}

impl ConfigError {
    /// Creates an override error.
    #[must_use]
    pub fn invalid_override(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a settings error.
    #[must_use]
    pub fn invalid_setting(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            message: message.into(),
        }
    }
}
