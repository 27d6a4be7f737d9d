//! Output placement for generated artifacts.
//!
//! A static table maps each [`ArtifactType`] to a placement policy. Two path
//! strategies exist: mirroring the source file's position under its source
//! root, or taking the generator's suggested filename verbatim.

use std::path::{Path, PathBuf};

use crate::config::MigrationContext;
use crate::generation::{Artifact, ArtifactType};
use crate::validation::strip_source_extension;

/// Which configured output root a policy writes under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKey {
    Resources,
    Traits,
    Extensions,
}

/// How one artifact type is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    pub directory_key: DirectoryKey,
    /// Root used when the directory key is not configured (project-relative)
    pub default_dir: &'static str,
    /// Mirror the source's subdirectory under its source root
    pub use_relative_path: bool,
    /// Inserted between the source stem and the extension
    pub suffix: &'static str,
    /// Keep `.js`/`.ts` from the source; otherwise emit `.ts`
    pub preserve_extension: bool,
    pub use_suggested_file_name: bool,
}

const SUGGESTED_NAME: PlacementPolicy = PlacementPolicy {
    directory_key: DirectoryKey::Resources,
    default_dir: "app/data/resources",
    use_relative_path: false,
    suffix: "",
    preserve_extension: true,
    use_suggested_file_name: true,
};

/// Placement policy for an artifact type.
pub fn policy_for(artifact_type: ArtifactType) -> PlacementPolicy {
    match artifact_type {
        ArtifactType::Schema => PlacementPolicy {
            directory_key: DirectoryKey::Resources,
            default_dir: "app/data/resources",
            use_relative_path: false,
            suffix: ".schema",
            preserve_extension: true,
            use_suggested_file_name: false,
        },
        ArtifactType::Trait => PlacementPolicy {
            directory_key: DirectoryKey::Traits,
            default_dir: "app/data/traits",
            use_relative_path: true,
            suffix: ".schema",
            preserve_extension: true,
            use_suggested_file_name: false,
        },
        ArtifactType::ResourceExtension => PlacementPolicy {
            directory_key: DirectoryKey::Extensions,
            default_dir: "app/data/resources",
            use_relative_path: false,
            suffix: ".ext",
            preserve_extension: true,
            use_suggested_file_name: false,
        },
        ArtifactType::TraitExtension => PlacementPolicy {
            directory_key: DirectoryKey::Extensions,
            default_dir: "app/data/traits",
            use_relative_path: true,
            suffix: ".ext",
            preserve_extension: true,
            use_suggested_file_name: false,
        },
        ArtifactType::ResourceType => PlacementPolicy {
            directory_key: DirectoryKey::Resources,
            default_dir: "app/data/resources",
            use_relative_path: false,
            suffix: ".schema.types",
            preserve_extension: false,
            use_suggested_file_name: false,
        },
        ArtifactType::TraitType => PlacementPolicy {
            directory_key: DirectoryKey::Traits,
            default_dir: "app/data/traits",
            use_relative_path: true,
            suffix: ".schema.types",
            preserve_extension: false,
            use_suggested_file_name: false,
        },
        ArtifactType::ExtensionType => PlacementPolicy {
            directory_key: DirectoryKey::Extensions,
            ..SUGGESTED_NAME
        },
        ArtifactType::Other => SUGGESTED_NAME,
    }
}

/// Routed location of an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
}

/// Artifact placement against a migration context.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> Router<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Destination root for a directory key
    pub fn root_for(&self, policy: &PlacementPolicy) -> PathBuf {
        let configured = match policy.directory_key {
            DirectoryKey::Resources => &self.ctx.output.resources_dir,
            DirectoryKey::Traits => &self.ctx.output.traits_dir,
            DirectoryKey::Extensions => &self.ctx.output.extensions_dir,
        };
        configured
            .clone()
            .unwrap_or_else(|| self.ctx.project_root.join(policy.default_dir))
    }

    /// Decide where `artifact`, generated from `source_file`, is written.
    ///
    /// A source outside every configured root is external: it is placed by
    /// basename directly under the destination root.
    pub fn route(&self, artifact: &Artifact, source_file: &Path) -> Placement {
        self.route_type(artifact.artifact_type, &artifact.suggested_file_name, source_file)
    }

    /// [`Router::route`] without a materialized artifact. Used to compute
    /// import paths between artifacts before their code exists.
    pub fn route_type(
        &self,
        artifact_type: ArtifactType,
        suggested_file_name: &str,
        source_file: &Path,
    ) -> Placement {
        let policy = policy_for(artifact_type);
        let mut output_dir = self.root_for(&policy);

        if policy.use_relative_path {
            if let Some(subdir) = self.relative_subdir(source_file) {
                output_dir.push(subdir);
            }
        }

        let file_name = if policy.use_suggested_file_name {
            suggested_file_name.to_string()
        } else {
            self.derived_file_name(&policy, source_file)
        };

        Placement {
            output_path: output_dir.join(file_name),
            output_dir,
        }
    }

    /// `<stem><suffix><ext>` for a source file
    fn derived_file_name(&self, policy: &PlacementPolicy, source_file: &Path) -> String {
        let stem = strip_source_extension(source_file, &self.ctx.extensions)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = if policy.preserve_extension {
            source_file
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| ".js".to_string())
        } else {
            ".ts".to_string()
        };
        format!("{}{}{}", stem, policy.suffix, extension)
    }

    /// Directory of `source_file` relative to the most specific source root
    /// containing it, or None for external files.
    fn relative_subdir(&self, source_file: &Path) -> Option<PathBuf> {
        let parent = source_file.parent()?;
        let root = self
            .ctx
            .mixins
            .roots()
            .iter()
            .chain(self.ctx.models.roots())
            .filter(|root| parent.starts_with(root))
            .max_by_key(|root| root.components().count())?;
        parent.strip_prefix(root).ok().map(Path::to_path_buf)
    }
}
