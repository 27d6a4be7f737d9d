//! Migration configuration and the immutable run context.
//!
//! [`MigrationConfig`] is the serde view of the JSON config file. It is
//! turned into a [`MigrationContext`] exactly once: relative directories are
//! anchored at the project root, globs are compiled, and the result is passed
//! by reference through every pipeline stage.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::validation::canonicalize_or_normalize;

/// Default source extensions, probed in this order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".ts"];

/// Additional `{pattern, directory}` mapping for a source root.
///
/// `pattern` may contain one `*` wildcard; the captured text is substituted
/// into the `*` of `directory` (or appended when the directory has none).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathMapping {
    pub pattern: String,
    pub directory: PathBuf,
}

/// Where one entity type (model or mixin) lives and how it is imported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceConfig {
    /// Primary import alias, e.g. `my-app/models`
    pub import_alias: Option<String>,
    /// Primary directory, e.g. `app/models`
    pub directory: Option<PathBuf>,
    /// Ordered additional mappings
    pub additional: Vec<PathMapping>,
}

/// Output roots per artifact category. Unset roots fall back to the
/// placement policy defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub resources_dir: Option<PathBuf>,
    pub traits_dir: Option<PathBuf>,
    pub extensions_dir: Option<PathBuf>,
}

/// Maps a structural source directory to the import base that reaches it
/// from anywhere, e.g. `app/core` → `my-lib/core`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportMapping {
    pub directory: String,
    pub import_base: String,
}

/// Serde view of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationConfig {
    pub project_root: PathBuf,
    pub extensions: Vec<String>,
    pub models: SourceConfig,
    pub mixins: SourceConfig,
    pub output: OutputConfig,
    pub import_mappings: Vec<ImportMapping>,
    pub intermediate_models: Vec<String>,
    pub exclude: Vec<String>,
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            models: SourceConfig::default(),
            mixins: SourceConfig::default(),
            output: OutputConfig::default(),
            import_mappings: Vec::new(),
            intermediate_models: Vec::new(),
            exclude: Vec::new(),
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    /// Load a configuration file (JSON).
    ///
    /// A relative `projectRoot` is taken relative to the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MigrateError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: MigrationConfig = serde_json::from_str(&text).map_err(|e| {
            MigrateError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        if config.project_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.project_root = base.join(&config.project_root);
        }
        Ok(config)
    }

    /// Configuration for the conventional `app/models` + `app/mixins` layout,
    /// used when no config file is given.
    pub fn conventional(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            models: SourceConfig {
                directory: Some(PathBuf::from("app/models")),
                ..SourceConfig::default()
            },
            mixins: SourceConfig {
                directory: Some(PathBuf::from("app/mixins")),
                ..SourceConfig::default()
            },
            ..Self::default()
        }
    }
}

/// A [`SourceConfig`] with every directory made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub import_alias: Option<String>,
    pub directory: Option<PathBuf>,
    pub additional: Vec<PathMapping>,
    roots: Vec<PathBuf>,
}

impl ResolvedSource {
    fn from_config(source: &SourceConfig, root: &Path) -> Self {
        let directory = source
            .directory
            .as_ref()
            .map(|d| canonicalize_or_normalize(&root.join(d)));
        let additional: Vec<PathMapping> = source
            .additional
            .iter()
            .map(|m| PathMapping {
                pattern: m.pattern.clone(),
                directory: absolutize_template(&m.directory, root),
            })
            .collect();

        let mut roots: Vec<PathBuf> = directory.iter().cloned().collect();
        for mapping in &additional {
            roots.extend(expand_root(&mapping.directory));
        }
        roots.sort();
        roots.dedup();

        Self {
            import_alias: source
                .import_alias
                .as_ref()
                .map(|a| a.trim_end_matches('/').to_string())
                .filter(|a| !a.is_empty()),
            directory,
            additional,
            roots,
        }
    }

    /// Directories that can contain files of this entity type.
    ///
    /// Wildcard templates are expanded against the directories that exist
    /// when the context is built, so `addons/*/addon/mixins` yields one root
    /// per addon that has a mixins directory.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Anchor a directory template at `root` without disturbing its `*`.
fn absolutize_template(template: &Path, root: &Path) -> PathBuf {
    if template.is_absolute() {
        return template.to_path_buf();
    }
    let text = template.to_string_lossy();
    match text.find('*') {
        Some(idx) => {
            let (prefix, rest) = text.split_at(idx);
            let (dir, head) = prefix.rsplit_once('/').unwrap_or(("", prefix));
            let dir_path = canonicalize_or_normalize(&root.join(dir));
            PathBuf::from(format!("{}/{}{}", dir_path.display(), head, rest))
        }
        None => canonicalize_or_normalize(&root.join(template)),
    }
}

/// Existing directories matching an absolute template with at most one `*`.
///
/// The wildcard stands for exactly one path segment. A template without a
/// wildcard is returned as-is, existing or not.
fn expand_root(template: &Path) -> Vec<PathBuf> {
    let text = template.to_string_lossy();
    let Some((prefix, suffix)) = text.split_once('*') else {
        return vec![template.to_path_buf()];
    };
    let (dir, head) = prefix.rsplit_once('/').unwrap_or(("", prefix));
    let (tail, remainder) = suffix.split_once('/').unwrap_or((suffix, ""));
    let parent = if dir.is_empty() { Path::new("/") } else { Path::new(dir) };

    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(template = %text, error = %e, "wildcard source root has no parent directory");
            return Vec::new();
        }
    };

    let mut roots = Vec::new();
    for entry in entries.filter_map(std::result::Result::ok) {
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        // The wildcard captures a non-empty part of the segment
        if name.len() <= head.len() + tail.len()
            || !name.starts_with(head)
            || !name.ends_with(tail)
        {
            continue;
        }
        let candidate = if remainder.is_empty() {
            entry.path()
        } else {
            entry.path().join(remainder)
        };
        if candidate.is_dir() {
            roots.push(canonicalize_or_normalize(&candidate));
        }
    }
    roots.sort();
    roots
}

/// Immutable, validated context shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    pub project_root: PathBuf,
    pub extensions: Vec<String>,
    pub models: ResolvedSource,
    pub mixins: ResolvedSource,
    pub output: OutputConfig,
    pub import_mappings: Vec<ImportMapping>,
    pub intermediate_models: Vec<String>,
    pub exclude: GlobSet,
    pub dry_run: bool,
}

impl MigrationContext {
    /// Validate a configuration and freeze it into a context.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        let project_root = std::fs::canonicalize(&config.project_root).map_err(|e| {
            MigrateError::Config(format!(
                "project root {} is not accessible: {}",
                config.project_root.display(),
                e
            ))
        })?;

        if config.models.directory.is_none()
            && config.models.additional.is_empty()
            && config.mixins.directory.is_none()
            && config.mixins.additional.is_empty()
        {
            return Err(MigrateError::Config(
                "no model or mixin source directory configured".to_string(),
            ));
        }

        for mapping in config.models.additional.iter().chain(config.mixins.additional.iter()) {
            if mapping.pattern.matches('*').count() > 1 {
                return Err(MigrateError::Config(format!(
                    "pattern '{}' has more than one wildcard",
                    mapping.pattern
                )));
            }
        }

        let extensions = if config.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            config
                .extensions
                .iter()
                .map(|e| {
                    if e.starts_with('.') {
                        e.clone()
                    } else {
                        format!(".{}", e)
                    }
                })
                .collect()
        };

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                MigrateError::Config(format!("invalid exclude pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| MigrateError::Config(format!("invalid exclude patterns: {}", e)))?;

        let output = OutputConfig {
            resources_dir: config
                .output
                .resources_dir
                .map(|d| canonicalize_or_normalize(&project_root.join(d))),
            traits_dir: config
                .output
                .traits_dir
                .map(|d| canonicalize_or_normalize(&project_root.join(d))),
            extensions_dir: config
                .output
                .extensions_dir
                .map(|d| canonicalize_or_normalize(&project_root.join(d))),
        };

        Ok(Self {
            models: ResolvedSource::from_config(&config.models, &project_root),
            mixins: ResolvedSource::from_config(&config.mixins, &project_root),
            project_root,
            extensions,
            output,
            import_mappings: config.import_mappings,
            intermediate_models: config.intermediate_models,
            exclude,
            dry_run: config.dry_run,
        })
    }

    /// Path relative to the project root, for display and diagnostics
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Whether a path matches an exclude glob (tested root-relative)
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        self.exclude.is_match(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn basic_config(root: &Path) -> MigrationConfig {
        MigrationConfig {
            project_root: root.to_path_buf(),
            models: SourceConfig {
                import_alias: Some("my-app/models/".to_string()),
                directory: Some(PathBuf::from("app/models")),
                additional: vec![PathMapping {
                    pattern: "shared/*/models".to_string(),
                    directory: PathBuf::from("libs/*/models"),
                }],
            },
            mixins: SourceConfig {
                import_alias: Some("my-app/mixins".to_string()),
                directory: Some(PathBuf::from("app/mixins")),
                additional: Vec::new(),
            },
            ..MigrationConfig::default()
        }
    }

    #[test]
    fn test_context_absolutizes_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("app/models")).unwrap();
        let ctx = MigrationContext::new(basic_config(temp_dir.path())).unwrap();

        let models_dir = ctx.models.directory.clone().unwrap();
        assert!(models_dir.is_absolute());
        assert!(models_dir.ends_with("app/models"));
        assert_eq!(ctx.models.import_alias.as_deref(), Some("my-app/models"));
        let template = ctx.models.additional[0].directory.to_string_lossy().to_string();
        assert!(template.ends_with("libs/*/models"), "template was {}", template);
    }

    #[test]
    fn test_wildcard_roots_expand_to_existing_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("libs/billing/models")).unwrap();
        fs::create_dir_all(temp_dir.path().join("libs/search/models")).unwrap();
        fs::create_dir_all(temp_dir.path().join("libs/docs")).unwrap();
        fs::write(temp_dir.path().join("libs/readme.md"), "").unwrap();
        let ctx = MigrationContext::new(basic_config(temp_dir.path())).unwrap();

        let roots = ctx.models.roots();
        assert_eq!(roots.len(), 3, "roots were {:?}", roots);
        assert!(roots.iter().any(|r| r.ends_with("app/models")));
        assert!(roots.iter().any(|r| r.ends_with("libs/billing/models")));
        assert!(roots.iter().any(|r| r.ends_with("libs/search/models")));
        assert!(!roots.iter().any(|r| r.ends_with("libs")));
    }

    #[test]
    fn test_wildcard_root_without_matches_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = MigrationContext::new(basic_config(temp_dir.path())).unwrap();
        let roots = ctx.models.roots();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].ends_with("app/models"));
    }

    #[test]
    fn test_partial_segment_wildcard() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("packages/ui-core/mixins")).unwrap();
        fs::create_dir_all(temp_dir.path().join("packages/api/mixins")).unwrap();
        let mut config = basic_config(temp_dir.path());
        config.mixins.additional.push(PathMapping {
            pattern: "@ui/*".to_string(),
            directory: PathBuf::from("packages/ui-*/mixins"),
        });
        let ctx = MigrationContext::new(config).unwrap();

        let template = ctx.mixins.additional[0].directory.to_string_lossy().to_string();
        assert!(template.ends_with("packages/ui-*/mixins"), "template was {}", template);
        let roots = ctx.mixins.roots();
        assert!(roots.iter().any(|r| r.ends_with("packages/ui-core/mixins")));
        assert!(!roots.iter().any(|r| r.ends_with("packages/api/mixins")));
    }

    #[test]
    fn test_rejects_double_wildcard() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = basic_config(temp_dir.path());
        config.mixins.additional.push(PathMapping {
            pattern: "a/*/b/*".to_string(),
            directory: PathBuf::from("x/*"),
        });
        let err = MigrationContext::new(config).unwrap_err();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_rejects_missing_source_directories() {
        let temp_dir = TempDir::new().unwrap();
        let config = MigrationConfig {
            project_root: temp_dir.path().to_path_buf(),
            ..MigrationConfig::default()
        };
        assert!(MigrationContext::new(config).is_err());
    }

    #[test]
    fn test_load_camel_case_json_with_relative_root() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("migrate.json");
        fs::write(
            &config_path,
            r#"{
                "projectRoot": ".",
                "models": { "importAlias": "my-app/models", "directory": "app/models" },
                "mixins": { "directory": "app/mixins" },
                "output": { "traitsDir": "app/data/traits" },
                "importMappings": [{ "directory": "app/core", "importBase": "my-lib/core" }],
                "intermediateModels": ["my-app/models/base"],
                "dryRun": true
            }"#,
        )
        .unwrap();

        let config = MigrationConfig::load(&config_path).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.extensions, vec![".js", ".ts"]);
        assert_eq!(config.import_mappings[0].import_base, "my-lib/core");
        assert_eq!(config.project_root, temp_dir.path().join("."));

        let ctx = MigrationContext::new(config).unwrap();
        assert!(ctx.output.traits_dir.unwrap().ends_with("app/data/traits"));
        assert!(ctx.output.resources_dir.is_none());
    }

    #[test]
    fn test_exclude_globs_match_root_relative() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = basic_config(temp_dir.path());
        config.exclude = vec!["app/models/legacy/**".to_string()];
        let ctx = MigrationContext::new(config).unwrap();
        let root = ctx.project_root.clone();
        assert!(ctx.is_excluded(&root.join("app/models/legacy/old.js")));
        assert!(!ctx.is_excluded(&root.join("app/models/user.js")));
    }
}
