//! Command-line overrides folded into a document.
//!
//! An override has the form `path.to.field=value`. The value is read as a
//! YAML scalar (`256`, `true`, `nginx`), and intermediate mappings are
//! created as needed.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::ConfigError;
use crate::value::{Key, Mapping, NestedValue, Scalar};

/// A single `path=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    path: Vec<String>,
    value: NestedValue,
}

impl Override {
    /// Creates an override from a path and a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or has empty segments.
    pub fn new(path: &str, value: NestedValue) -> Result<Self, ConfigError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ConfigError::invalid_override(
                path,
                "path segments must not be empty",
            ));
        }
        Ok(Self {
            path: segments,
            value,
        })
    }

    /// The dotted path, split into segments.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The value written at the path.
    #[must_use]
    pub const fn value(&self) -> &NestedValue {
        &self.value
    }

    /// Writes the value into `root`.
    ///
    /// A null root becomes an empty mapping first. Existing string or symbol
    /// keys are reused; missing ones are added as string keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or an intermediate node is not a mapping.
    pub fn apply(&self, root: &mut NestedValue) -> Result<(), ConfigError> {
        if root.is_null() {
            *root = NestedValue::Mapping(Mapping::new());
        }

        let Some((last, parents)) = self.path.split_last() else {
            return Err(ConfigError::invalid_override(self.to_string(), "empty path"));
        };

        let mut current = root.as_mapping_mut().ok_or_else(|| {
            ConfigError::invalid_override(self.to_string(), "document root is not a mapping")
        })?;

        for segment in parents {
            let key = current
                .key_named(segment)
                .cloned()
                .unwrap_or_else(|| Key::string(segment.as_str()));
            current = current
                .get_or_insert_with(key, || NestedValue::Mapping(Mapping::new()))
                .as_mapping_mut()
                .ok_or_else(|| {
                    ConfigError::invalid_override(
                        self.to_string(),
                        format!("'{segment}' is not a mapping"),
                    )
                })?;
        }

        let key = current
            .key_named(last)
            .cloned()
            .unwrap_or_else(|| Key::string(last.as_str()));
        debug!(path = %self.path.join("."), "Applying override");
        current.insert(key, self.value.clone());
        Ok(())
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.path.join("."))?;
        match &self.value {
            NestedValue::Scalar(Scalar::String(s)) => f.write_str(s),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (path, raw) = input
            .split_once('=')
            .ok_or_else(|| ConfigError::invalid_override(input, "expected PATH=VALUE"))?;

        let value = parse_scalar(raw);
        if value.is_container() {
            return Err(ConfigError::invalid_override(input, "value must be a scalar"));
        }

        Self::new(path.trim(), value)
    }
}

/// Reads `raw` as a YAML scalar, falling back to the literal text.
fn parse_scalar(raw: &str) -> NestedValue {
    if raw.is_empty() {
        return NestedValue::from("");
    }
    serde_yaml::from_str::<serde_yaml::Value>(raw)
        .ok()
        .and_then(|value| NestedValue::try_from(value).ok())
        .unwrap_or_else(|| NestedValue::from(raw))
}

/// Applies overrides in order; later ones win on the same path.
///
/// # Errors
///
/// Returns the first override that cannot be applied.
pub fn apply_overrides(root: &mut NestedValue, overrides: &[Override]) -> Result<(), ConfigError> {
    for item in overrides {
        item.apply(root)?;
    }
    Ok(())
}
