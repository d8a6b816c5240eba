//! Document loader for task definition files.
//!
//! This module reads YAML or JSON documents into the nested value model and
//! handles the `.env` file that accompanies them.

use crate::error::{ConfigError, EcsDeployError, Result};
use crate::value::NestedValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML (also used for unknown extensions).
    Yaml,
    /// JSON.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Loader for deployment documents.
#[derive(Debug, Default)]
pub struct DocumentLoader {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl DocumentLoader {
    /// Creates a new document loader.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<NestedValue> {
        let path = path.as_ref();
        info!("Loading document from: {}", path.display());

        if !path.exists() {
            return Err(EcsDeployError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EcsDeployError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        match DocumentFormat::from_path(path) {
            DocumentFormat::Json => self.parse_json(&content, Some(path)),
            DocumentFormat::Yaml => self.parse_yaml(&content, Some(path)),
        }
    }

    /// Parses a document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or holds tagged values.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<NestedValue> {
        debug!("Parsing YAML document");

        let raw: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
            EcsDeployError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })?;

        let document = NestedValue::try_from(raw)?;
        debug!(kind = document.kind(), "Parsed YAML document");
        Ok(document)
    }

    /// Parses a document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(&self, content: &str, source: Option<&Path>) -> Result<NestedValue> {
        debug!("Parsing JSON document");

        let raw: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            EcsDeployError::Config(ConfigError::ParseError {
                message: format!("JSON parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })?;

        Ok(NestedValue::from(raw))
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                EcsDeployError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default document file names to search for.
pub const DEFAULT_DOCUMENT_FILES: &[&str] = &[
    "task-definition.yaml",
    "task-definition.yml",
    "task-definition.json",
];

/// Finds the document in the start directory or its parents.
///
/// # Errors
///
/// Returns an error if no document is found.
pub fn find_document(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_DOCUMENT_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                info!("Found document: {}", candidate.display());
                return Ok(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(EcsDeployError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_DOCUMENT_FILES[0]),
    }))
}
