//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Override;
use crate::transform::CollisionPolicy;

/// ecs-deploy - Normalize task definitions for ECS deployments.
#[derive(Parser, Debug)]
#[command(name = "ecs-deploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Maximum container nesting (overrides `ECS_DEPLOY_MAX_DEPTH`).
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Policy for keys that share a symbol (overrides `ECS_DEPLOY_COLLISION_POLICY`).
    #[arg(long, global = true)]
    pub collisions: Option<CollisionPolicy>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize the keys of a document and print it.
    Normalize {
        /// Document to read (searched for when omitted).
        file: Option<PathBuf>,

        /// Override a field before normalizing.
        #[arg(long = "set", value_name = "PATH=VALUE")]
        overrides: Vec<Override>,

        /// Output format.
        #[arg(short, long, default_value = "yaml")]
        output: OutputFormat,
    },

    /// Report keys that collide after normalization.
    Check {
        /// Document to read (searched for when omitted).
        file: Option<PathBuf>,
    },

    /// Build deployment requests for one or more services of a cluster.
    Render {
        /// Task definition document (searched for when omitted).
        file: Option<PathBuf>,

        /// Target cluster.
        #[arg(long, env = "ECS_CLUSTER")]
        cluster: String,

        /// Target service; repeat or comma-separate for several.
        #[arg(long = "service", env = "ECS_SERVICE", value_delimiter = ',', required = true)]
        services: Vec<String>,

        /// Task definition family.
        #[arg(long, env = "ECS_FAMILY")]
        family: Option<String>,

        /// Override a task definition field before normalizing.
        #[arg(long = "set", value_name = "PATH=VALUE")]
        overrides: Vec<Override>,

        /// Output format.
        #[arg(short, long, default_value = "json")]
        output: OutputFormat,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// YAML document.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NestedValue;

    #[test]
    fn test_parse_normalize() {
        let cli = Cli::try_parse_from([
            "ecs-deploy",
            "normalize",
            "task.yaml",
            "--set",
            "cpu=512",
            "--output",
            "json",
            "--collisions",
            "reject",
        ])
        .unwrap();

        assert_eq!(cli.collisions, Some(CollisionPolicy::Reject));
        match cli.command {
            Commands::Normalize {
                file,
                overrides,
                output,
            } => {
                assert_eq!(file, Some(PathBuf::from("task.yaml")));
                assert_eq!(overrides.len(), 1);
                assert_eq!(overrides[0].value(), &NestedValue::from(512));
                assert!(matches!(output, OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "ecs-deploy",
            "render",
            "--cluster",
            "prod",
            "--service",
            "web,worker",
            "--max-depth",
            "64",
        ])
        .unwrap();

        assert_eq!(cli.max_depth, Some(64));
        match cli.command {
            Commands::Render {
                file,
                cluster,
                services,
                family,
                output,
                ..
            } => {
                assert_eq!(file, None);
                assert_eq!(cluster, "prod");
                assert_eq!(services, vec!["web", "worker"]);
                assert_eq!(family, None);
                assert!(matches!(output, OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_reject_bad_override() {
        let result = Cli::try_parse_from(["ecs-deploy", "normalize", "--set", "cpu"]);
        assert!(result.is_err());
    }
}
