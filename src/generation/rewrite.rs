//! Relative import rewriting for relocated sources.
//!
//! Strategies, tried in order:
//! 1. A configured directory → import base mapping whose directory appears
//!    as a segment sequence in the source path
//! 2. Geometric recomputation from the target location to the original
//!    resolution point
//! 3. A fixed one-level adjustment when no path context is available
//!
//! Non-relative specifiers are returned unchanged.

use std::path::{Component, Path};
use tracing::debug;

use crate::config::ImportMapping;
use crate::validation::{is_relative_specifier, normalize_lexical, relative_path, to_relative_specifier};

/// Which strategy produced a rewritten specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStrategy {
    Unchanged,
    Mapping,
    Geometric,
    Heuristic,
}

/// Rewrites relative specifiers for a file moving from `source` to `target`.
#[derive(Debug, Clone, Copy)]
pub struct ImportRewriter<'a> {
    mappings: &'a [ImportMapping],
}

impl<'a> ImportRewriter<'a> {
    pub fn new(mappings: &'a [ImportMapping]) -> Self {
        Self { mappings }
    }

    /// Rewrite `specifier` written in `source_file` so it still resolves
    /// from `target_file`.
    pub fn rewrite(
        &self,
        specifier: &str,
        source_file: Option<&Path>,
        target_file: Option<&Path>,
    ) -> (String, RewriteStrategy) {
        if !is_relative_specifier(specifier) {
            return (specifier.to_string(), RewriteStrategy::Unchanged);
        }

        if let Some(source) = source_file {
            if let Some(mapped) = self.rewrite_with_mapping(specifier, source) {
                debug!(specifier, rewritten = %mapped, "import rewritten through directory mapping");
                return (mapped, RewriteStrategy::Mapping);
            }
        }

        if let (Some(source), Some(target)) = (source_file, target_file) {
            if let (Some(source_dir), Some(target_dir)) = (source.parent(), target.parent()) {
                let absolute = normalize_lexical(&source_dir.join(specifier));
                let relative = relative_path(target_dir, &absolute);
                return (to_relative_specifier(&relative), RewriteStrategy::Geometric);
            }
        }

        // Approximation: assume the file moved exactly one directory deeper.
        let adjusted = match specifier.strip_prefix("./") {
            Some(rest) => format!("../{}", rest),
            None => format!("../{}", specifier),
        };
        (adjusted, RewriteStrategy::Heuristic)
    }

    /// Apply the first mapping whose directory occurs in `source`.
    ///
    /// For `app/core → my-lib/core` and a source in `app/core/widgets/`:
    /// - `./icon` → `my-lib/core/widgets/icon`
    /// - `../shared/util` → `my-lib/core/widgets/shared/util`
    ///
    /// Parent-directory specifiers resolve against the module path of the
    /// source file itself (`widgets/button`), not its directory. A result
    /// that would climb above the import base is rejected.
    fn rewrite_with_mapping(&self, specifier: &str, source: &Path) -> Option<String> {
        let source_parts = normal_parts(source);
        for mapping in self.mappings {
            let dir_parts: Vec<String> = mapping
                .directory
                .split('/')
                .filter(|p| !p.is_empty() && *p != ".")
                .map(str::to_string)
                .collect();
            if dir_parts.is_empty() {
                continue;
            }
            let Some(found) = find_sequence(&source_parts, &dir_parts) else {
                continue;
            };

            // Segments between the mapped directory and the file name
            let after = &source_parts[found + dir_parts.len()..];
            let Some((file_name, subdirs)) = after.split_last() else {
                continue;
            };

            let mut module: Vec<String> = subdirs.to_vec();
            if specifier.starts_with("../") {
                module.push(strip_extension(file_name).to_string());
            }
            let Some(joined) = join_relative(&module, specifier) else {
                debug!(specifier, mapping = %mapping.directory, "mapped import escapes import base");
                continue;
            };

            let base = mapping.import_base.trim_end_matches('/');
            return Some(if joined.is_empty() {
                base.to_string()
            } else {
                format!("{}/{}", base, joined)
            });
        }
        None
    }
}

/// Normal path components as strings
fn normal_parts(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

fn find_sequence(haystack: &[String], needle: &[String]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Resolve `specifier` against `base` segments; None when it climbs above.
fn join_relative(base: &[String], specifier: &str) -> Option<String> {
    let mut parts: Vec<String> = base.to_vec();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other.to_string()),
        }
    }
    Some(parts.join("/"))
}
