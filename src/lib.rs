//! schema-migrate: whole-project migration of declarative models and mixins
//!
//! Models and mixins written as decorated classes or `.extend({})` /
//! `Mixin.create({})` calls are split into declarative descriptors (schemas
//! for models, traits for mixins and intermediate base models) and
//! extension files that keep every behavioral member byte-for-byte.
//!
//! # Pipeline
//!
//! 1. [`scan`] discovers sources under the configured roots
//! 2. [`ingest`] parses each file once into an immutable [`ParsedFile`]
//! 3. [`analysis`] builds the mixin usage graph and its closure; mixins no
//!    model reaches are not migrated
//! 4. [`generation`] synthesizes descriptors, extensions and type files
//! 5. [`routing`] places every artifact under the output roots
//!
//! [`migrate::run`] sequences the stages. Only an invalid configuration is
//! fatal; everything else ends up as a [`MigrationDiagnostic`] in the
//! returned [`MigrationReport`].
//!
//! # Position Conventions
//!
//! Spans are byte offsets into the original source (0-indexed, end
//! exclusive). Lines in diagnostics are 1-indexed.

pub mod analysis;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod error_codes;
pub mod generation;
pub mod ingest;
pub mod migrate;
pub mod output;
pub mod resolve;
pub mod routing;
pub mod scan;
pub mod validation;
pub mod version;

pub use analysis::{analyze, MixinUsageGraph, UsageAnalysis};
pub use config::{MigrationConfig, MigrationContext};
pub use diagnostics::{DiagnosticStage, MigrationDiagnostic, SkipReason};
pub use error::{MigrateError, Result};
pub use generation::{Artifact, ArtifactType};
pub use ingest::{parse, FieldInfo, FieldKind, Language, ParsedFile};
pub use migrate::{migrate, run, MigrationReport, ProcessingResult};
pub use output::{generate_execution_id, output_json, JsonResponse, OutputFormat};
pub use resolve::{EntityScope, Resolver};
pub use routing::{Placement, Router};
