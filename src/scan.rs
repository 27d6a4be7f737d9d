//! Source discovery under the configured model and mixin roots.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::MigrationContext;
use crate::validation::canonicalize_or_normalize;

/// Directory names never descended into
const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", ".git", "dist", "tmp"];

/// Files found under the source roots, sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    pub models: Vec<PathBuf>,
    pub mixins: Vec<PathBuf>,
    /// Source files dropped by an `exclude` glob
    pub excluded: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn total(&self) -> usize {
        self.models.len() + self.mixins.len()
    }
}

/// Walk every model and mixin root and collect candidate source files.
///
/// # Guarantees
/// - Paths are canonical and sorted
/// - A file reachable from both a model root and a mixin root is assigned to
///   the entity whose root is the longer (more specific) prefix
/// - Missing roots are skipped, not errors
pub fn discover(ctx: &MigrationContext) -> DiscoveredFiles {
    let model_roots = ctx.models.roots();
    let mixin_roots = ctx.mixins.roots();

    let mut found = DiscoveredFiles::default();
    let mut all: Vec<PathBuf> = Vec::new();
    for root in model_roots.iter().chain(mixin_roots.iter()) {
        collect_sources(root, ctx, &mut all, &mut found.excluded);
    }
    all.sort();
    all.dedup();
    found.excluded.sort();
    found.excluded.dedup();

    for path in all {
        let model_depth = deepest_root(&path, &model_roots);
        let mixin_depth = deepest_root(&path, &mixin_roots);
        match (model_depth, mixin_depth) {
            (Some(m), Some(x)) if x > m => found.mixins.push(path),
            (Some(_), _) => found.models.push(path),
            (None, Some(_)) => found.mixins.push(path),
            (None, None) => {}
        }
    }

    debug!(
        models = found.models.len(),
        mixins = found.mixins.len(),
        excluded = found.excluded.len(),
        "source discovery finished"
    );
    found
}

fn collect_sources(
    root: &Path,
    ctx: &MigrationContext,
    out: &mut Vec<PathBuf>,
    excluded: &mut Vec<PathBuf>,
) {
    if !root.is_dir() {
        debug!(root = %root.display(), "source root does not exist, skipping");
        return;
    }

    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && SKIPPED_DIRECTORIES
                    .iter()
                    .any(|skip| entry.file_name() == *skip))
        });

    for entry in walker.filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_source_file(path, &ctx.extensions) {
            continue;
        }
        let canonical = canonicalize_or_normalize(path);
        if ctx.is_excluded(&canonical) {
            excluded.push(canonical);
            continue;
        }
        out.push(canonical);
    }
}

/// Configured extension and not a `.d.ts` declaration file
pub fn is_source_file(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if name.ends_with(".d.ts") {
        return false;
    }
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

fn deepest_root(path: &Path, roots: &[PathBuf]) -> Option<usize> {
    roots
        .iter()
        .filter(|root| path.starts_with(root))
        .map(|root| root.components().count())
        .max()
}
