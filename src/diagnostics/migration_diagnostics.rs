//! Migration diagnostics for structured skip reasons and error reporting.
//!
//! - Structured types for skip reasons, warnings and errors
//! - Deterministic ordering via sort_key()
//! - Human-readable stderr output and serde for JSON reports

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Reason why a file produced no artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// File has no recognizable default-export model or mixin declaration
    NoDeclaration,
    /// Mixin is not reachable from any model
    NotConnected,
    /// Excluded by a configured glob pattern
    ExcludedByGlob,
}

impl SkipReason {
    /// Stable sort key for deterministic ordering.
    pub fn sort_key(&self) -> u8 {
        match self {
            SkipReason::NoDeclaration => 0,
            SkipReason::NotConnected => 1,
            SkipReason::ExcludedByGlob => 2,
        }
    }

    /// Human-readable description for stderr output.
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::NoDeclaration => "no model or mixin declaration",
            SkipReason::NotConnected => "mixin not used by any model",
            SkipReason::ExcludedByGlob => "excluded by pattern",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl PartialOrd for SkipReason {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkipReason {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Stage in the migration pipeline where a problem occurred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiagnosticStage {
    /// Validating configuration and resolving configured specifiers
    Config,
    /// Reading a source file
    Read,
    /// Parsing source code
    Parse,
    /// Extracting fields or dependency edges
    Extract,
    /// Synthesizing descriptors or extensions
    Generate,
    /// Writing artifacts to disk
    Write,
}

impl DiagnosticStage {
    /// Stable sort key for deterministic ordering.
    pub fn sort_key(&self) -> u8 {
        match self {
            DiagnosticStage::Config => 0,
            DiagnosticStage::Read => 1,
            DiagnosticStage::Parse => 2,
            DiagnosticStage::Extract => 3,
            DiagnosticStage::Generate => 4,
            DiagnosticStage::Write => 5,
        }
    }

    /// Human-readable description for stderr output.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticStage::Config => "configuration",
            DiagnosticStage::Read => "reading file",
            DiagnosticStage::Parse => "parsing source",
            DiagnosticStage::Extract => "extracting fields",
            DiagnosticStage::Generate => "generating artifacts",
            DiagnosticStage::Write => "writing artifacts",
        }
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl PartialOrd for DiagnosticStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosticStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A diagnostic event from a migration run.
///
/// Batch-level problems (not owned by any file) use an empty path and
/// therefore sort first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum MigrationDiagnostic {
    /// Error that cost a file (or the batch) its output
    Error {
        path: String,
        stage: DiagnosticStage,
        code: String,
        message: String,
    },
    /// Recoverable problem; the file was still migrated
    Warning {
        path: String,
        stage: DiagnosticStage,
        code: String,
        message: String,
    },
    /// File was skipped without error
    Skipped { path: String, reason: SkipReason },
}

impl MigrationDiagnostic {
    /// Get the file path for this diagnostic.
    pub fn path(&self) -> &str {
        match self {
            MigrationDiagnostic::Error { path, .. } => path,
            MigrationDiagnostic::Warning { path, .. } => path,
            MigrationDiagnostic::Skipped { path, .. } => path,
        }
    }

    /// Whether this diagnostic counts as an error
    pub fn is_error(&self) -> bool {
        matches!(self, MigrationDiagnostic::Error { .. })
    }

    /// Stable sort key for deterministic ordering.
    ///
    /// Primary: path string (lexicographic)
    /// Secondary: variant (Error, Warning, Skipped)
    /// Tertiary: stage/reason sort key
    pub fn sort_key(&self) -> (&str, u8, u8) {
        match self {
            MigrationDiagnostic::Error { path, stage, .. } => (path, 0, stage.sort_key()),
            MigrationDiagnostic::Warning { path, stage, .. } => (path, 1, stage.sort_key()),
            MigrationDiagnostic::Skipped { path, reason } => (path, 2, reason.sort_key()),
        }
    }

    /// Create an Error diagnostic.
    pub fn error(
        path: impl Into<String>,
        stage: DiagnosticStage,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        MigrationDiagnostic::Error {
            path: path.into(),
            stage,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Create a Warning diagnostic.
    pub fn warning(
        path: impl Into<String>,
        stage: DiagnosticStage,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        MigrationDiagnostic::Warning {
            path: path.into(),
            stage,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Create a Skipped diagnostic.
    pub fn skipped(path: impl Into<String>, reason: SkipReason) -> Self {
        MigrationDiagnostic::Skipped {
            path: path.into(),
            reason,
        }
    }

    /// Format for human-readable stderr output.
    ///
    /// Examples:
    /// - "SKIP app/mixins/unused.js: mixin not used by any model"
    /// - "ERROR app/models/bad.js: parsing source: [MIG-PAR-002] syntax error at 3:7"
    pub fn format_stderr(&self) -> String {
        let display_path = |path: &str| {
            if path.is_empty() {
                "<batch>".to_string()
            } else {
                path.to_string()
            }
        };
        match self {
            MigrationDiagnostic::Error {
                path,
                stage,
                code,
                message,
            } => format!("ERROR {}: {}: [{}] {}", display_path(path), stage, code, message),
            MigrationDiagnostic::Warning {
                path,
                stage,
                code,
                message,
            } => format!("WARN {}: {}: [{}] {}", display_path(path), stage, code, message),
            MigrationDiagnostic::Skipped { path, reason } => {
                format!("SKIP {}: {}", display_path(path), reason)
            }
        }
    }
}

impl fmt::Display for MigrationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_stderr())
    }
}

impl PartialOrd for MigrationDiagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MigrationDiagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
