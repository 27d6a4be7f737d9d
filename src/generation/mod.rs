//! Artifact generation.
//!
//! Turns a [`crate::ingest::ParsedFile`] into the schema/trait descriptor,
//! the behavior-preserving extension source and (for TypeScript sources) the
//! accompanying type declarations.

pub mod extension;
pub mod render;
pub mod rewrite;
pub mod schema;
pub mod types;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use extension::{generate_extension, ExtensionShape, GeneratedExtension};
pub use rewrite::{ImportRewriter, RewriteStrategy};
pub use schema::{
    entity_name, schema_descriptor, trait_descriptor, DescriptorInput, TraitEntry, TraitRegistry,
};

/// Declared type of a generated artifact; selects its placement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactType {
    Schema,
    Trait,
    ResourceExtension,
    TraitExtension,
    ResourceType,
    TraitType,
    ExtensionType,
    /// Anything else; placed by its suggested filename
    Other,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactType::Schema => "schema",
            ArtifactType::Trait => "trait",
            ArtifactType::ResourceExtension => "resource-extension",
            ArtifactType::TraitExtension => "trait-extension",
            ArtifactType::ResourceType => "resource-type",
            ArtifactType::TraitType => "trait-type",
            ArtifactType::ExtensionType => "extension-type",
            ArtifactType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// A generated source file, not yet placed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Resource or trait name (`user`, `timestamped`)
    pub name: String,
    pub code: String,
    pub suggested_file_name: String,
}

/// Artifact together with its routed output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedArtifact {
    pub artifact: Artifact,
    pub output_path: PathBuf,
}

impl PlacedArtifact {
    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ArtifactType::ResourceExtension).unwrap();
        assert_eq!(json, "\"resource-extension\"");
        assert_eq!(ArtifactType::TraitType.to_string(), "trait-type");
    }
}
