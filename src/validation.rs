//! Path canonicalization and lexical path arithmetic.
//!
//! Every graph node is a canonical absolute path, so all file paths entering
//! the pipeline pass through [`canonicalize_path`]. Import rewriting works on
//! paths that may not exist yet (output locations), which is what the lexical
//! helpers are for: they never touch the filesystem.

use std::path::{Component, Path, PathBuf};

/// Error types for path validation.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    /// Path cannot be canonicalized (doesn't exist or permission denied)
    #[error("cannot canonicalize path: {0}")]
    CannotCanonicalize(String),

    /// Path escapes the directory it was expected to stay in
    #[error("path escapes root: {0} (root: {1})")]
    OutsideRoot(String, String),
}

/// Canonicalize a path using std::fs::canonicalize.
///
/// This resolves all symlinks, `..`, and `.` components to produce an absolute path.
/// Returns an error if the path doesn't exist or cannot be accessed.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, PathValidationError> {
    std::fs::canonicalize(path)
        .map_err(|_| PathValidationError::CannotCanonicalize(path.to_string_lossy().to_string()))
}

/// Canonicalize when possible, otherwise normalize lexically.
///
/// Used for configured directories that are allowed to be absent
/// (an output root that has not been created yet).
pub fn canonicalize_or_normalize(path: &Path) -> PathBuf {
    canonicalize_path(path).unwrap_or_else(|_| normalize_lexical(path))
}

/// Lexically normalize a path: drop `.` components and fold `..` into
/// the preceding component where possible.
///
/// Leading `..` components of a relative path are preserved.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Validate that `path` lies inside `root`, returning the path on success.
///
/// Both paths are compared component-wise after lexical normalization, so
/// this works for paths that do not exist on disk.
pub fn validate_path_within_root(path: &Path, root: &Path) -> Result<PathBuf, PathValidationError> {
    let path = normalize_lexical(path);
    let root = normalize_lexical(root);
    if path.starts_with(&root) {
        Ok(path)
    } else {
        Err(PathValidationError::OutsideRoot(
            path.to_string_lossy().to_string(),
            root.to_string_lossy().to_string(),
        ))
    }
}

/// Whether `path` lies inside `root` (lexically)
pub fn is_within(path: &Path, root: &Path) -> bool {
    validate_path_within_root(path, root).is_ok()
}

/// Compute the relative path that leads from directory `from_dir` to `to`.
///
/// Both inputs should be absolute (or both relative to the same base).
///
/// # Examples
/// - from `/p/app/data/resources`, to `/p/app/core/shared/util` → `../../core/shared/util`
/// - from `/p/a`, to `/p/a/b` → `b`
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize_lexical(from_dir);
    let to = normalize_lexical(to);
    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from_parts.len() {
        result.push("..");
    }
    for part in &to_parts[common..] {
        result.push(part.as_os_str());
    }
    result
}

/// Render a relative path as an import specifier.
///
/// Uses forward slashes and guarantees a `./` or `../` prefix so the
/// result is never mistaken for a package import.
pub fn to_relative_specifier(path: &Path) -> String {
    let joined = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("../") || joined == ".." {
        joined
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        format!("./{}", joined)
    }
}

/// Remove a trailing source extension (`.js`, `.ts`) from a path
pub fn strip_source_extension(path: &Path, extensions: &[String]) -> PathBuf {
    let text = path.to_string_lossy();
    for ext in extensions {
        if let Some(stripped) = text.strip_suffix(ext.as_str()) {
            return PathBuf::from(stripped);
        }
    }
    path.to_path_buf()
}

/// Whether an import specifier is relative (`./` or `../`)
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}
