//! Error taxonomy for the migration pipeline.
//!
//! Only configuration errors abort a run. Everything else is caught per file
//! and turned into a [`crate::diagnostics::MigrationDiagnostic`].

use std::path::PathBuf;

/// Errors produced by pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Configuration is invalid or unusable
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Source file could not be read or parsed
    #[error("parse failure in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Artifact synthesis failed for a file
    #[error("generation failure in {path}: {message}")]
    Generation { path: PathBuf, message: String },

    /// Artifact could not be written
    #[error("write failure for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MigrateError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn generation(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MigrateError::Generation {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = MigrateError> = std::result::Result<T, E>;
