//! The migration command: load config, run, report.

use anyhow::{Context, Result};
use tracing::debug;

use schema_migrate::output::render_human;
use schema_migrate::{generate_execution_id, output_json, JsonResponse, MigrationConfig, OutputFormat};

use crate::Cli;

/// Run a migration and print its report.
///
/// Returns the process exit code: 0 on success, 1 when any file or
/// batch-level error was recorded. Configuration errors are returned as Err.
pub fn run_migrate(cli: &Cli) -> Result<u8> {
    let mut config = match &cli.config {
        Some(path) => MigrationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let root = cli.root.clone().unwrap_or_else(|| ".".into());
            debug!(root = %root.display(), "no config file, using conventional layout");
            MigrationConfig::conventional(root)
        }
    };
    if let Some(root) = &cli.root {
        config.project_root = root.clone();
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    let report = schema_migrate::run(config)?;

    match cli.output {
        OutputFormat::Human => {
            print!("{}", render_human(&report));
        }
        OutputFormat::Json => {
            let exec_id = generate_execution_id();
            let response = JsonResponse::new(&report, &exec_id).with_partial(report.has_errors());
            output_json(&response)?;
        }
    }

    Ok(if report.has_errors() { 1 } else { 0 })
}
