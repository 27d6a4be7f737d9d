//! schema-migrate CLI
//!
//! Usage: schema-migrate [--config <FILE>] [--root <DIR>] [--dry-run] [--output human|json]

mod migrate_cmd;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use schema_migrate::OutputFormat;

/// Migrate models and mixins into schema, trait and extension files
#[derive(Debug, Parser)]
#[command(name = "schema-migrate", disable_version_flag = true)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root; overrides `projectRoot` from the config file
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Analyze and generate without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Print version and build information
    #[arg(long, short = 'V')]
    pub version: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so stdout stays clean for JSON
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", schema_migrate::version::version());
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.verbose);

    match migrate_cmd::run_migrate(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
