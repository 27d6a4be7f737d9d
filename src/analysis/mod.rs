//! Mixin usage analysis.
//!
//! Builds model → mixin and mixin → mixin edges from three signals (runtime
//! imports, polymorphic `belongsTo` type strings, type-only imports) and
//! computes the set of mixins reachable from any model.
//!
//! # Graph View
//!
//! Nodes are canonical absolute file paths. An import that does not resolve
//! to a known mixin file never becomes an edge.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::common::dasherize;
use crate::config::MigrationContext;
use crate::diagnostics::{DiagnosticStage, MigrationDiagnostic};
use crate::error::{MigrateError, Result};
use crate::error_codes::MIG_EXT_002_EDGE_EXTRACTION;
use crate::ingest::{FieldKind, ParsedFile};
use crate::resolve::Resolver;
use crate::validation::strip_source_extension;

/// Which rule produced a direct edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeSignal {
    Import,
    Polymorphic,
    TypeOnlyImport,
}

/// Directed mixin usage graph over canonical file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixinUsageGraph {
    /// Model path → mixins it uses directly
    pub model_to_mixins: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Mixin path → mixins it uses directly
    pub mixin_dependencies: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Every mixin reachable from a model edge
    pub connected_mixins: BTreeSet<PathBuf>,
}

impl MixinUsageGraph {
    pub fn is_connected(&self, mixin: &Path) -> bool {
        self.connected_mixins.contains(mixin)
    }
}

/// Graph plus the per-file extraction failures encountered while building it.
#[derive(Debug, Clone, Default)]
pub struct UsageAnalysis {
    pub graph: MixinUsageGraph,
    pub diagnostics: Vec<MigrationDiagnostic>,
}

/// Build the usage graph and its closure.
///
/// Files missing from `parsed` (parse failures) contribute no edges. A file
/// whose edges cannot be extracted is reported and contributes no edges.
pub fn analyze(
    ctx: &MigrationContext,
    models: &[PathBuf],
    mixins: &[PathBuf],
    parsed: &BTreeMap<PathBuf, ParsedFile>,
) -> UsageAnalysis {
    let extractor = EdgeExtractor::new(ctx, mixins);
    let mut analysis = UsageAnalysis::default();

    for model in models {
        let Some(file) = parsed.get(model) else {
            continue;
        };
        match extractor.model_edges(file) {
            Ok(edges) => {
                let targets: BTreeSet<PathBuf> = edges.into_keys().collect();
                if !targets.is_empty() {
                    analysis.graph.model_to_mixins.insert(model.clone(), targets);
                }
            }
            Err(e) => analysis.diagnostics.push(extraction_failure(ctx, model, e)),
        }
    }

    for mixin in mixins {
        let Some(file) = parsed.get(mixin) else {
            continue;
        };
        match extractor.mixin_edges(file) {
            Ok(mut targets) => {
                targets.remove(mixin);
                if !targets.is_empty() {
                    analysis.graph.mixin_dependencies.insert(mixin.clone(), targets);
                }
            }
            Err(e) => analysis.diagnostics.push(extraction_failure(ctx, mixin, e)),
        }
    }

    let seed: BTreeSet<PathBuf> = analysis
        .graph
        .model_to_mixins
        .values()
        .flatten()
        .cloned()
        .collect();
    analysis.graph.connected_mixins = close_over(seed, &analysis.graph.mixin_dependencies);

    debug!(
        models_with_mixins = analysis.graph.model_to_mixins.len(),
        connected = analysis.graph.connected_mixins.len(),
        total_mixins = mixins.len(),
        "mixin usage analysis finished"
    );
    analysis
}

/// Reachability fixpoint: grow `seed` along `dependencies` until stable.
///
/// Cycles are harmless since insertion is idempotent and the node set is
/// finite.
pub fn close_over(
    seed: BTreeSet<PathBuf>,
    dependencies: &BTreeMap<PathBuf, BTreeSet<PathBuf>>,
) -> BTreeSet<PathBuf> {
    let mut result = seed;
    loop {
        let additions: Vec<PathBuf> = result
            .iter()
            .filter_map(|mixin| dependencies.get(mixin))
            .flatten()
            .filter(|dep| !result.contains(*dep))
            .cloned()
            .collect();
        if additions.is_empty() {
            return result;
        }
        result.extend(additions);
    }
}

fn extraction_failure(ctx: &MigrationContext, path: &Path, error: MigrateError) -> MigrationDiagnostic {
    warn!(path = %path.display(), error = %error, "mixin edge extraction failed");
    MigrationDiagnostic::warning(
        ctx.display_path(path),
        DiagnosticStage::Extract,
        MIG_EXT_002_EDGE_EXTRACTION,
        error.to_string(),
    )
}

/// Direct edge extraction against a fixed set of known mixin files.
struct EdgeExtractor<'a> {
    ctx: &'a MigrationContext,
    resolver: Resolver<'a>,
    known_mixins: BTreeSet<PathBuf>,
    /// Normalized mixin names (`commentable`, `admin/commentable`) → files
    names: BTreeMap<String, BTreeSet<PathBuf>>,
}

impl<'a> EdgeExtractor<'a> {
    fn new(ctx: &'a MigrationContext, mixins: &[PathBuf]) -> Self {
        let roots = ctx.mixins.roots();
        let mut names: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        for mixin in mixins {
            for name in mixin_names(mixin, &roots, &ctx.extensions) {
                names.entry(name).or_default().insert(mixin.clone());
            }
        }
        Self {
            ctx,
            resolver: Resolver::new(ctx),
            known_mixins: mixins.iter().cloned().collect(),
            names,
        }
    }

    /// All three signals for a model, keyed by target.
    fn model_edges(&self, file: &ParsedFile) -> Result<BTreeMap<PathBuf, BTreeSet<EdgeSignal>>> {
        let mut edges: BTreeMap<PathBuf, BTreeSet<EdgeSignal>> = BTreeMap::new();
        for target in self.import_edges(file, false)? {
            edges.entry(target).or_default().insert(EdgeSignal::Import);
        }
        for target in self.polymorphic_edges(file) {
            edges.entry(target).or_default().insert(EdgeSignal::Polymorphic);
        }
        for target in self.import_edges(file, true)? {
            edges.entry(target).or_default().insert(EdgeSignal::TypeOnlyImport);
        }
        for (target, signals) in &edges {
            debug!(
                model = %self.ctx.display_path(&file.path),
                mixin = %self.ctx.display_path(target),
                ?signals,
                "model uses mixin"
            );
        }
        Ok(edges)
    }

    /// Mixin → mixin edges use imports only
    fn mixin_edges(&self, file: &ParsedFile) -> Result<BTreeSet<PathBuf>> {
        let mut targets = self.import_edges(file, false)?;
        targets.extend(self.import_edges(file, true)?);
        Ok(targets)
    }

    fn import_edges(&self, file: &ParsedFile, type_only: bool) -> Result<BTreeSet<PathBuf>> {
        if !file.path.is_absolute() {
            return Err(MigrateError::parse(
                &file.path,
                "source path is not absolute; cannot resolve imports",
            ));
        }
        Ok(file
            .imports
            .iter()
            .filter(|import| import.is_type_only == type_only)
            .filter_map(|import| self.resolver.resolve_mixin(&import.specifier, &file.path))
            .filter(|target| self.known_mixins.contains(target))
            .collect())
    }

    fn polymorphic_edges(&self, file: &ParsedFile) -> BTreeSet<PathBuf> {
        file.fields
            .iter()
            .filter(|field| field.kind == FieldKind::BelongsTo && field.is_polymorphic())
            .filter_map(|field| field.field_type.as_deref())
            .filter_map(|type_name| self.names.get(&normalize_type_name(type_name)))
            .flatten()
            .cloned()
            .collect()
    }
}

/// Names a polymorphic type string may use to refer to a mixin file.
fn mixin_names(path: &Path, roots: &[PathBuf], extensions: &[String]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let stripped = strip_source_extension(path, extensions);
    if let Some(stem) = stripped.file_name() {
        names.insert(dasherize(&stem.to_string_lossy()));
    }
    for root in roots {
        if let Ok(relative) = stripped.strip_prefix(root) {
            let joined = relative
                .components()
                .map(|c| dasherize(&c.as_os_str().to_string_lossy()))
                .collect::<Vec<_>>()
                .join("/");
            if !joined.is_empty() {
                names.insert(joined);
            }
        }
    }
    names
}

fn normalize_type_name(type_name: &str) -> String {
    type_name
        .trim()
        .split('/')
        .map(dasherize)
        .collect::<Vec<_>>()
        .join("/")
}
