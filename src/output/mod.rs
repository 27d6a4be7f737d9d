//! Report output for the CLI
//!
//! JSON output is wrapped in a schema-versioned envelope so consumers can
//! detect format changes. Human output is a short summary followed by one
//! line per diagnostic.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::migrate::MigrationReport;

/// JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Summary and diagnostics as text
    #[default]
    Human,
    /// `JsonResponse` envelope on stdout
    Json,
}

/// Envelope around every JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    pub schema_version: String,
    pub execution_id: String,
    pub tool: String,
    pub data: T,
    /// True when at least one file failed and the data is incomplete
    #[serde(default)]
    pub partial: bool,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: env!("CARGO_PKG_NAME").to_string(),
            data,
            partial: false,
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

/// Execution id: `<timestamp hex>-<pid hex>`.
pub fn generate_execution_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{:x}-{:x}", timestamp, std::process::id())
}

/// Print a payload as pretty JSON on stdout.
pub fn output_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Human-readable report.
pub fn render_human(report: &MigrationReport) -> String {
    let mut out = String::new();
    let mode = if report.dry_run { " (dry run)" } else { "" };
    let _ = writeln!(out, "Migration finished{}", mode);
    for (label, counts) in [
        ("models", &report.models),
        ("mixins", &report.mixins),
        ("total", &report.total),
    ] {
        let _ = writeln!(
            out,
            "  {:<7} processed {:>4}  skipped {:>4}  errors {:>4}",
            label, counts.processed, counts.skipped, counts.errors
        );
    }
    let _ = writeln!(
        out,
        "  connected mixins: {} of {}",
        report.graph.connected_mixins.len(),
        report.graph.connected_mixins.len() + report.graph.unconnected_mixins.len()
    );

    let verb = if report.dry_run { "Would write" } else { "Wrote" };
    let _ = writeln!(out, "{} {} artifact(s)", verb, report.artifacts.len());
    for artifact in &report.artifacts {
        let _ = writeln!(out, "  {:<18} {}", artifact.artifact_type, artifact.path);
    }

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "Diagnostics:");
        for diagnostic in &report.diagnostics {
            let _ = writeln!(out, "  {}", diagnostic);
        }
    }
    out
}
