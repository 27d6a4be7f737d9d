//! Structured diagnostics for migration runs.
//!
//! Provides deterministic, sortable diagnostic types for skip reasons,
//! recoverable warnings and per-file errors collected across all stages.

pub mod migration_diagnostics;

pub use migration_diagnostics::{DiagnosticStage, MigrationDiagnostic, SkipReason};
