//! CLI module for the ECS deploy tool.
//!
//! This module provides the command-line interface that loads a task
//! definition, normalizes it and prints the result.

mod commands;
mod output;

pub use commands::{Cli, Commands, LogFormat, OutputFormat};
pub use output::OutputFormatter;
