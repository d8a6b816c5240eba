//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying documents and
//! normalization reports to the user.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::error::TransformError;
use crate::transform::{CollisionPolicy, Normalized};
use crate::value::NestedValue;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Collision row for table display.
#[derive(Tabled)]
struct CollisionRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Kept")]
    kept: String,
    #[tabled(rename = "Dropped")]
    dropped: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a document in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no representation in the format.
    pub fn format_value(&self, value: &NestedValue) -> Result<String, TransformError> {
        match self.format {
            OutputFormat::Yaml => value.to_yaml_string(),
            OutputFormat::Json => value.to_json_string().map(|mut json| {
                json.push('\n');
                json
            }),
        }
    }

    /// Formats the collisions found by a normalization pass.
    #[must_use]
    pub fn format_collisions(report: &Normalized, policy: CollisionPolicy) -> String {
        if !report.has_collisions() {
            return format!("{} No key collisions.\n", "✓".green());
        }

        let mut output = String::new();
        let _ = write!(
            output,
            "\n{} {} key collision(s), resolved with {policy}:\n\n",
            "⚠".yellow(),
            report.collisions.len()
        );

        let rows: Vec<CollisionRow> = report
            .collisions
            .iter()
            .map(|c| CollisionRow {
                path: c.path.clone(),
                symbol: c.symbol.to_string(),
                kept: c.kept.describe(),
                dropped: c.dropped.describe(),
            })
            .collect();

        let table = Table::new(rows).to_string();
        output.push_str(&table);
        output.push('\n');
        output
    }
}
