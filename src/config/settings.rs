//! Transform settings.
//!
//! Settings come from the environment (`ECS_DEPLOY_MAX_DEPTH`,
//! `ECS_DEPLOY_COLLISION_POLICY`), possibly loaded from a `.env` file, and
//! may then be overridden by command-line flags.

use clap::ValueEnum;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::transform::{CollisionPolicy, DeepCloner, KeyNormalizer};
use crate::value::DEFAULT_MAX_DEPTH;

/// Environment variable holding the nesting limit.
pub const ENV_MAX_DEPTH: &str = "ECS_DEPLOY_MAX_DEPTH";

/// Environment variable holding the collision policy.
pub const ENV_COLLISION_POLICY: &str = "ECS_DEPLOY_COLLISION_POLICY";

/// Settings shared by the clone and normalize passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSettings {
    /// Maximum container nesting accepted.
    pub max_depth: usize,
    /// Policy for keys that share a canonical symbol.
    pub collision_policy: CollisionPolicy,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl TransformSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            settings.max_depth = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::invalid_setting(ENV_MAX_DEPTH, format!("'{raw}' is not a depth: {e}"))
            })?;
            debug!("Overriding max_depth from environment");
        }

        if let Some(raw) = lookup(ENV_COLLISION_POLICY) {
            settings.collision_policy =
                CollisionPolicy::from_str(raw.trim(), true).map_err(|e| {
                    ConfigError::invalid_setting(ENV_COLLISION_POLICY, e)
                })?;
            debug!("Overriding collision_policy from environment");
        }

        Ok(settings)
    }

    /// Applies command-line values on top of these settings.
    #[must_use]
    pub fn with_overrides(
        mut self,
        max_depth: Option<usize>,
        collision_policy: Option<CollisionPolicy>,
    ) -> Self {
        if let Some(max_depth) = max_depth {
            self.max_depth = max_depth;
        }
        if let Some(policy) = collision_policy {
            self.collision_policy = policy;
        }
        self
    }

    /// Builds a cloner from these settings.
    #[must_use]
    pub const fn cloner(&self) -> DeepCloner {
        DeepCloner::new().with_max_depth(self.max_depth)
    }

    /// Builds a normalizer from these settings.
    #[must_use]
    pub const fn normalizer(&self) -> KeyNormalizer {
        KeyNormalizer::new()
            .with_policy(self.collision_policy)
            .with_max_depth(self.max_depth)
    }
}
