//! Import specifier resolution to canonical source files.
//!
//! Resolution never errors: a specifier that maps to no file is an external
//! reference and yields None.
//!
//! Order:
//! 1. Relative specifiers against the importing file's directory
//! 2. The entity's primary import alias against its primary directory
//! 3. The entity's additional `{pattern, directory}` mappings, in order
//!
//! Each candidate base path is probed as-is, then with every configured
//! extension appended, then as a directory holding `index.<ext>`.

pub mod pattern;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{MigrationContext, ResolvedSource};
use crate::validation::{canonicalize_or_normalize, is_relative_specifier, is_within};

pub use pattern::{expand_template, match_pattern, PatternMatch};

/// Which entity's source configuration to resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityScope {
    Model,
    Mixin,
}

/// Resolver bound to an immutable migration context.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    fn source(&self, scope: EntityScope) -> &'a ResolvedSource {
        match scope {
            EntityScope::Model => &self.ctx.models,
            EntityScope::Mixin => &self.ctx.mixins,
        }
    }

    /// Resolve `specifier` written in `current_file` for one entity type.
    ///
    /// # Examples
    /// - `./helpers/format` in `/p/app/models/user.js` → `/p/app/models/helpers/format.js`
    /// - `my-app/mixins/timestamped` → `/p/app/mixins/timestamped.js`
    /// - `@ember-data/model` → None
    pub fn resolve(
        &self,
        specifier: &str,
        current_file: &Path,
        scope: EntityScope,
    ) -> Option<PathBuf> {
        let dir = current_file.parent()?;
        self.resolve_in_dir(specifier, dir, scope)
    }

    /// Resolve a specifier that is not written in any file, such as a
    /// configured intermediate model. Relative specifiers and plain
    /// project-relative paths are taken from the project root.
    pub fn resolve_from_root(&self, specifier: &str, scope: EntityScope) -> Option<PathBuf> {
        self.resolve_in_dir(specifier, &self.ctx.project_root, scope)
            .or_else(|| self.probe(&self.ctx.project_root.join(specifier)))
    }

    fn resolve_in_dir(&self, specifier: &str, dir: &Path, scope: EntityScope) -> Option<PathBuf> {
        if is_relative_specifier(specifier) {
            return self.probe(&dir.join(specifier));
        }

        let source = self.source(scope);
        if let (Some(alias), Some(directory)) = (&source.import_alias, &source.directory) {
            if let Some(rest) = strip_alias(specifier, alias) {
                let base = if rest.is_empty() {
                    directory.clone()
                } else {
                    directory.join(rest)
                };
                if let Some(found) = self.probe(&base) {
                    return Some(found);
                }
            }
        }

        for mapping in &source.additional {
            if let Some(matched) = match_pattern(&mapping.pattern, specifier) {
                let base = expand_template(&mapping.directory, &matched);
                if let Some(found) = self.probe(&base) {
                    return Some(found);
                }
            }
        }

        None
    }

    /// Resolve an import that may reference a mixin.
    ///
    /// The resolved file must lie inside a configured mixin root. This keeps
    /// shared relative imports (utilities, constants) out of the mixin graph.
    pub fn resolve_mixin(&self, specifier: &str, current_file: &Path) -> Option<PathBuf> {
        let resolved = self.resolve(specifier, current_file, EntityScope::Mixin)?;
        let roots = self.ctx.mixins.roots();
        if roots.iter().any(|root| is_within(&resolved, root)) {
            Some(resolved)
        } else {
            debug!(
                specifier,
                resolved = %resolved.display(),
                "resolved outside mixin roots, not a mixin reference"
            );
            None
        }
    }

    /// Probe a base path for an existing source file.
    pub fn probe(&self, base: &Path) -> Option<PathBuf> {
        if base.is_file() {
            return Some(canonicalize_or_normalize(base));
        }
        let text = base.to_string_lossy();
        for ext in &self.ctx.extensions {
            let candidate = PathBuf::from(format!("{}{}", text, ext));
            if candidate.is_file() {
                return Some(canonicalize_or_normalize(&candidate));
            }
        }
        if base.is_dir() {
            for ext in &self.ctx.extensions {
                let candidate = base.join(format!("index{}", ext));
                if candidate.is_file() {
                    return Some(canonicalize_or_normalize(&candidate));
                }
            }
        }
        None
    }
}

/// Remainder of `specifier` after `alias`, on a segment boundary.
fn strip_alias<'s>(specifier: &'s str, alias: &str) -> Option<&'s str> {
    let tail = specifier.strip_prefix(alias)?;
    if tail.is_empty() {
        Some(tail)
    } else {
        tail.strip_prefix('/')
    }
}
