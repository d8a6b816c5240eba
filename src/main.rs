//! ecs-deploy CLI entrypoint.
//!
//! This is the main entrypoint for the ecs-deploy command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ecs_deploy::cli::{Cli, Commands, LogFormat, OutputFormat, OutputFormatter};
use ecs_deploy::config::{
    DocumentLoader, Override, TransformSettings, apply_overrides, find_document,
};
use ecs_deploy::error::Result;
use ecs_deploy::request::DeployRequest;
use ecs_deploy::value::NestedValue;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Env-backed flags read values from .env.
    if let Err(e) = DocumentLoader::new().load_dotenv() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Main entry point.
fn run(cli: Cli) -> Result<()> {
    let settings = TransformSettings::from_env()?.with_overrides(cli.max_depth, cli.collisions);
    debug!(
        max_depth = settings.max_depth,
        policy = %settings.collision_policy,
        "Resolved transform settings"
    );

    match cli.command {
        Commands::Normalize {
            file,
            overrides,
            output,
        } => cmd_normalize(file.as_ref(), &overrides, output, &settings),
        Commands::Check { file } => cmd_check(file.as_ref(), &settings),
        Commands::Render {
            file,
            cluster,
            services,
            family,
            overrides,
            output,
        } => {
            let requests: Vec<DeployRequest> = services
                .into_iter()
                .map(|service| {
                    let request = DeployRequest::new(cluster.as_str(), service);
                    match &family {
                        Some(family) => request.with_family(family.as_str()),
                        None => request,
                    }
                })
                .collect();
            cmd_render(file.as_ref(), &requests, &overrides, output, &settings)
        }
    }
}

/// Normalize a document and print it.
fn cmd_normalize(
    file: Option<&PathBuf>,
    overrides: &[Override],
    output: OutputFormat,
    settings: &TransformSettings,
) -> Result<()> {
    let mut document = load_document(file)?;
    apply_overrides(&mut document, overrides)?;

    let normalized = settings.normalizer().normalize(&document)?;
    write_stdout(&OutputFormatter::new(output).format_value(&normalized)?)
}

/// Report key collisions.
fn cmd_check(file: Option<&PathBuf>, settings: &TransformSettings) -> Result<()> {
    let document = load_document(file)?;
    let report = settings.normalizer().normalize_with_report(&document)?;

    eprint!(
        "{}",
        OutputFormatter::format_collisions(&report, settings.collision_policy)
    );
    Ok(())
}

/// Build and print deployment requests.
fn cmd_render(
    file: Option<&PathBuf>,
    requests: &[DeployRequest],
    overrides: &[Override],
    output: OutputFormat,
    settings: &TransformSettings,
) -> Result<()> {
    let mut document = load_document(file)?;
    apply_overrides(&mut document, overrides)?;

    let cloner = settings.cloner();
    let normalizer = settings.normalizer();
    let mut rendered = Vec::with_capacity(requests.len());
    for request in requests {
        // Each request owns its task definition.
        let task_definition = cloner.clone_value(&document)?;
        rendered.push(normalizer.normalize(&request.build(task_definition))?);
        info!(
            cluster = %request.cluster,
            service = %request.service,
            "Rendered deployment request"
        );
    }

    let rendered = if rendered.len() == 1 {
        rendered.swap_remove(0)
    } else {
        NestedValue::Sequence(rendered)
    };
    write_stdout(&OutputFormatter::new(output).format_value(&rendered)?)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the document path.
fn resolve_document_path(file: Option<&PathBuf>) -> Result<PathBuf> {
    file.map_or_else(|| find_document("."), |path| Ok(path.clone()))
}

/// Loads the document, honoring a `.env` file next to it.
fn load_document(file: Option<&PathBuf>) -> Result<NestedValue> {
    let path = resolve_document_path(file)?;
    debug!("Loading document from: {}", path.display());

    let loader =
        DocumentLoader::new().with_base_path(path.parent().unwrap_or_else(|| Path::new(".")));
    loader.load_dotenv()?;
    loader.load_file(&path)
}

/// Writes command output to stdout.
fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
