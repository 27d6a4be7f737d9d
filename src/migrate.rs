//! Whole-project migration run.
//!
//! Stages run in a fixed order over an immutable [`MigrationContext`]:
//!
//! 1. Discover model and mixin sources
//! 2. Parse every file once (in parallel; results are keyed by path)
//! 3. Resolve configured intermediate models and order them bases-first
//! 4. Analyze mixin usage
//! 5. Intermediate pass: every base model becomes a trait and is registered
//! 6. Model pass: schemas, composing registered and mixin traits
//! 7. Mixin pass: traits for connected mixins only
//!
//! Every per-file failure becomes a diagnostic; only an invalid
//! configuration aborts the run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analysis::{self, MixinUsageGraph};
use crate::config::{MigrationConfig, MigrationContext};
use crate::diagnostics::{DiagnosticStage, MigrationDiagnostic, SkipReason};
use crate::error::{MigrateError, Result};
use crate::error_codes::{
    MIG_CFG_001_UNRESOLVED_INTERMEDIATE, MIG_CFG_002_INTERMEDIATE_CYCLE,
    MIG_EXT_001_MALFORMED_FIELD, MIG_GEN_001_EXTENSION_FAILED, MIG_IO_001_WRITE_FAILED,
    MIG_PAR_001_UNREADABLE, MIG_PAR_002_SYNTAX_ERROR, MIG_PAR_003_UNSUPPORTED_LANGUAGE,
};
use crate::generation::types::{
    extension_signature_name, extension_type, import_specifier_between, resource_type,
    trait_interface_name, trait_type, TypeImport,
};
use crate::generation::{
    entity_name, generate_extension, schema_descriptor, trait_descriptor, Artifact, ArtifactType,
    DescriptorInput, GeneratedExtension, ImportRewriter, PlacedArtifact, TraitEntry,
    TraitRegistry,
};
use crate::ingest::{self, detect_language, Language, ParsedFile};
use crate::resolve::{EntityScope, Resolver};
use crate::routing::Router;
use crate::scan;
use crate::validation::strip_source_extension;

/// Per-pass file counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ProcessingResult {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Processed => self.processed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.errors += 1,
        }
    }
}

impl Add for ProcessingResult {
    type Output = ProcessingResult;

    fn add(self, other: ProcessingResult) -> ProcessingResult {
        ProcessingResult {
            processed: self.processed + other.processed,
            skipped: self.skipped + other.skipped,
            errors: self.errors + other.errors,
        }
    }
}

impl AddAssign for ProcessingResult {
    fn add_assign(&mut self, other: ProcessingResult) {
        *self = *self + other;
    }
}

/// One artifact written (or, in a dry run, that would have been written)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub name: String,
    /// Output path, project-relative where possible
    pub path: String,
    /// Source file the artifact was generated from
    pub source: String,
}

/// Mixin usage graph with display paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub model_to_mixins: BTreeMap<String, Vec<String>>,
    pub mixin_dependencies: BTreeMap<String, Vec<String>>,
    pub connected_mixins: Vec<String>,
    pub unconnected_mixins: Vec<String>,
}

impl GraphSummary {
    fn from_graph(ctx: &MigrationContext, graph: &MixinUsageGraph, mixins: &[PathBuf]) -> Self {
        let edges = |map: &BTreeMap<PathBuf, BTreeSet<PathBuf>>| -> BTreeMap<String, Vec<String>> {
            map.iter()
                .map(|(from, to)| {
                    (
                        ctx.display_path(from),
                        to.iter().map(|p| ctx.display_path(p)).collect(),
                    )
                })
                .collect()
        };
        GraphSummary {
            model_to_mixins: edges(&graph.model_to_mixins),
            mixin_dependencies: edges(&graph.mixin_dependencies),
            connected_mixins: graph
                .connected_mixins
                .iter()
                .map(|p| ctx.display_path(p))
                .collect(),
            unconnected_mixins: mixins
                .iter()
                .filter(|m| !graph.is_connected(m))
                .map(|p| ctx.display_path(p))
                .collect(),
        }
    }
}

/// Aggregate result of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub dry_run: bool,
    /// Model files, intermediate models included
    pub models: ProcessingResult,
    pub mixins: ProcessingResult,
    pub total: ProcessingResult,
    pub artifacts: Vec<ArtifactRecord>,
    pub graph: GraphSummary,
    /// Sorted by path, then severity
    pub diagnostics: Vec<MigrationDiagnostic>,
}

impl MigrationReport {
    /// Whether any file or batch-level error was recorded
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(MigrationDiagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &MigrationDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

/// Validate `config` and run the migration.
///
/// # Errors
/// Only configuration errors. Per-file failures are reported in the
/// returned [`MigrationReport`].
pub fn run(config: MigrationConfig) -> Result<MigrationReport> {
    let ctx = MigrationContext::new(config)?;
    Ok(migrate(&ctx))
}

/// Run the migration against a validated context.
pub fn migrate(ctx: &MigrationContext) -> MigrationReport {
    info!(
        root = %ctx.project_root.display(),
        dry_run = ctx.dry_run,
        "starting migration"
    );

    let discovered = scan::discover(ctx);
    info!(
        models = discovered.models.len(),
        mixins = discovered.mixins.len(),
        excluded = discovered.excluded.len(),
        "discovered sources"
    );

    let mut run = MigrationRun::new(ctx, &discovered.mixins);
    for path in &discovered.excluded {
        run.diagnostics.push(MigrationDiagnostic::skipped(
            ctx.display_path(path),
            SkipReason::ExcludedByGlob,
        ));
    }

    let sources: Vec<&PathBuf> = discovered
        .models
        .iter()
        .chain(discovered.mixins.iter())
        .collect();
    let loaded: Vec<(PathBuf, std::result::Result<ParsedFile, LoadFailure>)> = sources
        .par_iter()
        .map(|path| ((*path).clone(), load_source(path)))
        .collect();
    for (path, result) in loaded {
        run.accept_load(path, result);
    }
    info!(
        parsed = run.parsed.len(),
        failed = run.failed.len(),
        "parsed sources"
    );

    let intermediates = run.resolve_intermediates();
    let intermediate_set: BTreeSet<PathBuf> = intermediates.iter().cloned().collect();
    run.intermediates = intermediate_set.clone();

    let mut all_models = discovered.models.clone();
    all_models.extend(
        intermediates
            .iter()
            .filter(|p| !discovered.models.contains(*p))
            .cloned(),
    );
    let usage = analysis::analyze(ctx, &all_models, &discovered.mixins, &run.parsed);
    run.diagnostics.extend(usage.diagnostics);
    let graph = usage.graph;
    info!(
        connected = graph.connected_mixins.len(),
        total = discovered.mixins.len(),
        "mixin usage analyzed"
    );

    let mut models = ProcessingResult::default();
    for path in &intermediates {
        let outcome = run.migrate_file(path, Role::Intermediate);
        models.record(outcome);
    }
    debug!(registered = run.registry.len(), "intermediate pass finished");

    for path in discovered
        .models
        .iter()
        .filter(|p| !intermediate_set.contains(*p))
    {
        let outcome = run.migrate_file(path, Role::Model);
        models.record(outcome);
    }

    let mut mixins = ProcessingResult::default();
    for path in &discovered.mixins {
        let outcome = if run.failed.contains(path) {
            Outcome::Failed
        } else if !graph.is_connected(path) {
            debug!(mixin = %path.display(), "mixin not connected to any model");
            run.diagnostics.push(MigrationDiagnostic::skipped(
                ctx.display_path(path),
                SkipReason::NotConnected,
            ));
            Outcome::Skipped
        } else {
            run.migrate_file(path, Role::Mixin)
        };
        mixins.record(outcome);
    }

    let mut diagnostics = run.diagnostics;
    diagnostics.sort();
    let report = MigrationReport {
        dry_run: ctx.dry_run,
        models,
        mixins,
        total: models + mixins,
        artifacts: run.artifacts,
        graph: GraphSummary::from_graph(ctx, &graph, &discovered.mixins),
        diagnostics,
    };
    info!(
        processed = report.total.processed,
        skipped = report.total.skipped,
        errors = report.total.errors,
        artifacts = report.artifacts.len(),
        "migration finished"
    );
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Processed,
    Skipped,
    Failed,
}

/// What a file becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Model,
    Intermediate,
    Mixin,
}

impl Role {
    fn descriptor_type(self) -> ArtifactType {
        match self {
            Role::Model => ArtifactType::Schema,
            Role::Intermediate | Role::Mixin => ArtifactType::Trait,
        }
    }

    fn extension_type(self) -> ArtifactType {
        match self {
            Role::Model => ArtifactType::ResourceExtension,
            Role::Intermediate | Role::Mixin => ArtifactType::TraitExtension,
        }
    }

    fn types_type(self) -> ArtifactType {
        match self {
            Role::Model => ArtifactType::ResourceType,
            Role::Intermediate | Role::Mixin => ArtifactType::TraitType,
        }
    }
}

struct LoadFailure {
    stage: DiagnosticStage,
    code: &'static str,
    message: String,
}

fn load_source(path: &Path) -> std::result::Result<ParsedFile, LoadFailure> {
    let source = fs::read_to_string(path).map_err(|e| LoadFailure {
        stage: DiagnosticStage::Read,
        code: MIG_PAR_001_UNREADABLE,
        message: format!("cannot read file: {}", e),
    })?;
    if detect_language(path).is_none() {
        return Err(LoadFailure {
            stage: DiagnosticStage::Parse,
            code: MIG_PAR_003_UNSUPPORTED_LANGUAGE,
            message: "unsupported source language".to_string(),
        });
    }
    ingest::parse(path, &source).map_err(|e| LoadFailure {
        stage: DiagnosticStage::Parse,
        code: MIG_PAR_002_SYNTAX_ERROR,
        message: failure_message(e),
    })
}

/// Error message without the path prefix (diagnostics carry the path)
fn failure_message(error: MigrateError) -> String {
    match error {
        MigrateError::Parse { message, .. } | MigrateError::Generation { message, .. } => message,
        other => other.to_string(),
    }
}

/// Artifacts planned for one file, before anything is written.
#[derive(Debug, Default)]
struct Plan {
    artifacts: Vec<(PlacedArtifact, PathBuf)>,
    diagnostics: Vec<MigrationDiagnostic>,
    trait_entry: Option<TraitEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Mutable state of one run.
struct MigrationRun<'a> {
    ctx: &'a MigrationContext,
    resolver: Resolver<'a>,
    router: Router<'a>,
    rewriter: ImportRewriter<'a>,
    known_mixins: BTreeSet<PathBuf>,
    parsed: BTreeMap<PathBuf, ParsedFile>,
    failed: BTreeSet<PathBuf>,
    intermediates: BTreeSet<PathBuf>,
    registry: TraitRegistry,
    artifacts: Vec<ArtifactRecord>,
    diagnostics: Vec<MigrationDiagnostic>,
}

impl<'a> MigrationRun<'a> {
    fn new(ctx: &'a MigrationContext, mixins: &[PathBuf]) -> Self {
        MigrationRun {
            ctx,
            resolver: Resolver::new(ctx),
            router: Router::new(ctx),
            rewriter: ImportRewriter::new(&ctx.import_mappings),
            known_mixins: mixins.iter().cloned().collect(),
            parsed: BTreeMap::new(),
            failed: BTreeSet::new(),
            intermediates: BTreeSet::new(),
            registry: TraitRegistry::new(),
            artifacts: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn accept_load(&mut self, path: PathBuf, result: std::result::Result<ParsedFile, LoadFailure>) {
        let rel_path = self.ctx.display_path(&path);
        match result {
            Ok(file) => {
                for message in &file.warnings {
                    warn!(path = %rel_path, %message, "field ignored");
                    self.diagnostics.push(MigrationDiagnostic::warning(
                        rel_path.clone(),
                        DiagnosticStage::Extract,
                        MIG_EXT_001_MALFORMED_FIELD,
                        message.clone(),
                    ));
                }
                self.parsed.insert(path, file);
            }
            Err(failure) => {
                warn!(path = %rel_path, message = %failure.message, "source skipped");
                self.diagnostics.push(MigrationDiagnostic::error(
                    rel_path,
                    failure.stage,
                    failure.code,
                    failure.message,
                ));
                self.failed.insert(path);
            }
        }
    }

    /// Resolve configured intermediate models, ordered bases-first.
    ///
    /// Intermediate models outside the discovered model set are parsed here.
    fn resolve_intermediates(&mut self) -> Vec<PathBuf> {
        let mut resolved: Vec<PathBuf> = Vec::new();
        for specifier in &self.ctx.intermediate_models {
            match self.resolver.resolve_from_root(specifier, EntityScope::Model) {
                Some(path) => {
                    debug!(specifier = %specifier, path = %path.display(), "intermediate model resolved");
                    if !resolved.contains(&path) {
                        resolved.push(path);
                    }
                }
                None => {
                    warn!(specifier = %specifier, "intermediate model not found");
                    self.diagnostics.push(MigrationDiagnostic::error(
                        "",
                        DiagnosticStage::Config,
                        MIG_CFG_001_UNRESOLVED_INTERMEDIATE,
                        format!("intermediate model '{}' could not be resolved", specifier),
                    ));
                }
            }
        }

        for path in &resolved {
            if !self.parsed.contains_key(path) && !self.failed.contains(path) {
                let result = load_source(path);
                self.accept_load(path.clone(), result);
            }
        }

        let members: BTreeSet<PathBuf> = resolved.iter().cloned().collect();
        let mut state = BTreeMap::new();
        let mut ordered = Vec::with_capacity(resolved.len());
        for path in &resolved {
            self.visit_intermediate(path, &members, &mut state, &mut ordered);
        }
        ordered
    }

    /// Depth-first post-order over `extends` edges between intermediates
    fn visit_intermediate(
        &mut self,
        path: &Path,
        members: &BTreeSet<PathBuf>,
        state: &mut BTreeMap<PathBuf, Visit>,
        ordered: &mut Vec<PathBuf>,
    ) {
        match state.get(path) {
            Some(Visit::Done) => return,
            Some(Visit::InProgress) => {
                warn!(path = %path.display(), "intermediate model cycle");
                self.diagnostics.push(MigrationDiagnostic::error(
                    self.ctx.display_path(path),
                    DiagnosticStage::Config,
                    MIG_CFG_002_INTERMEDIATE_CYCLE,
                    "intermediate models extend each other in a cycle; the cycle was broken here",
                ));
                return;
            }
            None => {}
        }

        state.insert(path.to_path_buf(), Visit::InProgress);
        if let Some(base) = self.base_model(path) {
            if members.contains(&base) {
                self.visit_intermediate(&base, members, state, ordered);
            }
        }
        state.insert(path.to_path_buf(), Visit::Done);
        ordered.push(path.to_path_buf());
    }

    /// File of the model `path` extends, when it is imported from a model source
    fn base_model(&self, path: &Path) -> Option<PathBuf> {
        let file = self.parsed.get(path)?;
        let base = file.declaration.as_ref()?.base.as_deref()?;
        let (import, _) = file.import_for_binding(base)?;
        self.resolver
            .resolve(&import.specifier, &file.path, EntityScope::Model)
    }

    /// Generate and write every artifact of one file.
    fn migrate_file(&mut self, path: &Path, role: Role) -> Outcome {
        let planned = match self.parsed.get(path) {
            Some(file) => self.plan(file, role),
            None => return Outcome::Failed,
        };
        let rel_path = self.ctx.display_path(path);
        let plan = match planned {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(path = %rel_path, %reason, "file skipped");
                self.diagnostics
                    .push(MigrationDiagnostic::skipped(rel_path, reason));
                return Outcome::Skipped;
            }
        };
        self.diagnostics.extend(plan.diagnostics);

        let mut write_failed = false;
        for (placed, source) in plan.artifacts {
            if !self.ctx.dry_run {
                if let Err(e) = write_artifact(&placed) {
                    warn!(path = %placed.output_path.display(), error = %e, "write failed");
                    self.diagnostics.push(MigrationDiagnostic::error(
                        rel_path.clone(),
                        DiagnosticStage::Write,
                        MIG_IO_001_WRITE_FAILED,
                        e.to_string(),
                    ));
                    write_failed = true;
                    continue;
                }
            }
            debug!(
                artifact = %placed.artifact.artifact_type,
                path = %placed.output_path.display(),
                "artifact emitted"
            );
            self.artifacts.push(ArtifactRecord {
                artifact_type: placed.artifact.artifact_type,
                name: placed.artifact.name,
                path: self.ctx.display_path(&placed.output_path),
                source: self.ctx.display_path(&source),
            });
        }

        if write_failed {
            return Outcome::Failed;
        }
        if role == Role::Intermediate {
            if let Some(entry) = plan.trait_entry {
                debug!(name = %entry.name, "trait registered");
                self.registry.register(path.to_path_buf(), entry);
            }
        }
        Outcome::Processed
    }

    /// Compute all artifacts of `file` without touching the filesystem.
    fn plan(&self, file: &ParsedFile, role: Role) -> std::result::Result<Plan, SkipReason> {
        let declaration = file
            .declaration
            .as_ref()
            .ok_or(SkipReason::NoDeclaration)?;

        let roots = match role {
            Role::Mixin => self.ctx.mixins.roots(),
            Role::Model | Role::Intermediate => self.ctx.models.roots(),
        };
        let name = entity_name(&file.path, &roots, &self.ctx.extensions);
        let rel_path = self.ctx.display_path(&file.path);
        let is_typescript = file.language == Language::TypeScript;
        let mut plan = Plan::default();

        let mut traits: Vec<TraitEntry> = Vec::new();
        if role != Role::Mixin {
            if let Some(entry) = self.base_trait(file) {
                traits.push(entry);
            }
        }
        for identifier in &declaration.mixins {
            match self.mixin_trait(file, identifier) {
                Some(entry) if !traits.iter().any(|t| t.name == entry.name) => traits.push(entry),
                Some(_) => {}
                None => debug!(path = %rel_path, identifier = %identifier, "mixin not resolvable, not composed"),
            }
        }
        let trait_names: Vec<String> = traits.iter().map(|t| t.name.clone()).collect();

        let extension_placement = self
            .router
            .route_type(role.extension_type(), "", &file.path);
        let extension = match generate_extension(
            file,
            &name,
            Some(&extension_placement.output_path),
            &self.rewriter,
        ) {
            Ok(extension) => extension,
            Err(e) => {
                let message = failure_message(e);
                warn!(path = %rel_path, %message, "extension not generated");
                plan.diagnostics.push(MigrationDiagnostic::warning(
                    rel_path.clone(),
                    DiagnosticStage::Generate,
                    MIG_GEN_001_EXTENSION_FAILED,
                    message,
                ));
                None
            }
        };

        let input = DescriptorInput {
            name: &name,
            fields: &file.fields,
            traits: &trait_names,
            extension: extension.as_ref().map(|e| e.export_name.as_str()),
        };
        let descriptor_code = match role {
            Role::Model => schema_descriptor(&input),
            Role::Intermediate | Role::Mixin => trait_descriptor(&input),
        };
        let descriptor = self.place(
            role.descriptor_type(),
            &name,
            descriptor_code,
            String::new(),
            &file.path,
        );
        let descriptor_path = descriptor.output_path.clone();
        plan.artifacts.push((descriptor, file.path.clone()));

        let mut types_path = None;
        if is_typescript {
            let ext_types = extension.as_ref().map(|ext| {
                self.extension_types(file, &name, ext, &extension_placement.output_path)
            });
            let types_placement = self.router.route_type(role.types_type(), "", &file.path);

            let mut parents: Vec<TypeImport> = traits
                .iter()
                .filter_map(|t| {
                    t.types_path.as_ref().map(|trait_types| TypeImport {
                        interface: trait_interface_name(&t.name),
                        specifier: import_specifier_between(
                            &types_placement.output_path,
                            trait_types,
                        ),
                    })
                })
                .collect();
            if let (Some(ext), Some(placed)) = (extension.as_ref(), ext_types.as_ref()) {
                parents.push(TypeImport {
                    interface: extension_signature_name(&ext.export_name),
                    specifier: import_specifier_between(
                        &types_placement.output_path,
                        &placed.output_path,
                    ),
                });
            }

            let code = match role {
                Role::Model => resource_type(&name, &file.fields, &parents),
                Role::Intermediate | Role::Mixin => trait_type(&name, &file.fields, &parents),
            };
            let placed = self.place(role.types_type(), &name, code, String::new(), &file.path);
            types_path = Some(placed.output_path.clone());
            plan.artifacts.push((placed, file.path.clone()));
            if let Some(placed) = ext_types {
                plan.artifacts.push((placed, file.path.clone()));
            }
        }

        if let Some(ext) = extension {
            let placed = PlacedArtifact {
                artifact: Artifact {
                    artifact_type: role.extension_type(),
                    name: name.clone(),
                    code: ext.code,
                    suggested_file_name: String::new(),
                },
                output_path: extension_placement.output_path,
            };
            plan.artifacts.push((placed, file.path.clone()));
        }

        plan.trait_entry = Some(TraitEntry {
            name,
            schema_path: descriptor_path,
            types_path,
        });
        Ok(plan)
    }

    fn place(
        &self,
        artifact_type: ArtifactType,
        name: &str,
        code: String,
        suggested_file_name: String,
        source: &Path,
    ) -> PlacedArtifact {
        let artifact = Artifact {
            artifact_type,
            name: name.to_string(),
            code,
            suggested_file_name,
        };
        let placement = self.router.route(&artifact, source);
        PlacedArtifact {
            artifact,
            output_path: placement.output_path,
        }
    }

    /// `<stem>.ext.types.ts` naming the extension's shape
    fn extension_types(
        &self,
        file: &ParsedFile,
        name: &str,
        extension: &GeneratedExtension,
        extension_path: &Path,
    ) -> PlacedArtifact {
        let stem = strip_source_extension(&file.path, &self.ctx.extensions)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let suggested = format!("{}.ext.types.ts", stem);
        let placement = self
            .router
            .route_type(ArtifactType::ExtensionType, &suggested, &file.path);
        let code = extension_type(
            &extension.export_name,
            extension.shape,
            &import_specifier_between(&placement.output_path, extension_path),
        );
        PlacedArtifact {
            artifact: Artifact {
                artifact_type: ArtifactType::ExtensionType,
                name: name.to_string(),
                code,
                suggested_file_name: suggested,
            },
            output_path: placement.output_path,
        }
    }

    /// Trait of the registered intermediate model `file` extends
    fn base_trait(&self, file: &ParsedFile) -> Option<TraitEntry> {
        let base = self.base_model(&file.path)?;
        if !self.intermediates.contains(&base) {
            return None;
        }
        let entry = self.registry.get(&base);
        if entry.is_none() {
            debug!(
                path = %file.path.display(),
                base = %base.display(),
                "base model has no registered trait"
            );
        }
        entry.cloned()
    }

    /// Trait generated for the mixin bound to `identifier` in `file`
    fn mixin_trait(&self, file: &ParsedFile, identifier: &str) -> Option<TraitEntry> {
        let (import, _) = file.import_for_binding(identifier)?;
        let mixin = self.resolver.resolve_mixin(&import.specifier, &file.path)?;
        if !self.known_mixins.contains(&mixin) {
            return None;
        }
        let mixin_file = self.parsed.get(&mixin)?;
        let name = entity_name(&mixin, &self.ctx.mixins.roots(), &self.ctx.extensions);
        let schema_path = self
            .router
            .route_type(ArtifactType::Trait, "", &mixin)
            .output_path;
        let types_path = (mixin_file.language == Language::TypeScript).then(|| {
            self.router
                .route_type(ArtifactType::TraitType, "", &mixin)
                .output_path
        });
        Some(TraitEntry {
            name,
            schema_path,
            types_path,
        })
    }
}

fn write_artifact(placed: &PlacedArtifact) -> Result<()> {
    let wrap = |source| MigrateError::Write {
        path: placed.output_path.clone(),
        source,
    };
    fs::create_dir_all(placed.output_dir()).map_err(wrap)?;
    fs::write(&placed.output_path, &placed.artifact.code).map_err(wrap)?;
    Ok(())
}
