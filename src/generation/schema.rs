//! Schema and trait descriptor synthesis.
//!
//! Declarative fields become descriptor entries. Field-kind defaults are
//! layered under the field's own options, so explicit options always win
//! and are never dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::common::{dasherize, pascal_case};
use crate::generation::render::render_object;
use crate::ingest::{FieldInfo, FieldKind, FieldOptions, OptionValue};
use crate::validation::strip_source_extension;

/// `objectExtensions` every fragment field receives
pub const FRAGMENT_OBJECT_EXTENSIONS: &[&str] = &["ember-object", "fragment"];

/// `arrayExtensions` every fragment-array and array field receives
pub const ARRAY_EXTENSIONS: &[&str] = &["ember-object", "ember-array-like", "fragment-array"];

/// Resource or trait name for a source file.
///
/// The path below the most specific containing root, dasherized per segment
/// (`app/models/admin/UserRole.js` → `admin/user-role`). Files outside
/// every root use their dasherized stem.
pub fn entity_name(path: &Path, roots: &[PathBuf], extensions: &[String]) -> String {
    let stripped = strip_source_extension(path, extensions);
    let nested = roots
        .iter()
        .filter(|root| stripped.starts_with(root))
        .max_by_key(|root| root.components().count())
        .and_then(|root| stripped.strip_prefix(root).ok())
        .map(|relative| {
            relative
                .components()
                .map(|c| dasherize(&c.as_os_str().to_string_lossy()))
                .collect::<Vec<_>>()
                .join("/")
        })
        .filter(|name| !name.is_empty());
    nested.unwrap_or_else(|| {
        stripped
            .file_name()
            .map(|n| dasherize(&n.to_string_lossy()))
            .unwrap_or_default()
    })
}

/// Descriptor entry for one declarative field.
pub fn schema_field(field: &FieldInfo) -> FieldOptions {
    let mut entry = FieldOptions::new();
    let (kind, field_type, defaults) = match field.kind {
        FieldKind::Attribute => ("attribute", field.field_type.clone(), FieldOptions::new()),
        FieldKind::BelongsTo => ("belongsTo", field.field_type.clone(), FieldOptions::new()),
        FieldKind::HasMany => ("hasMany", field.field_type.clone(), FieldOptions::new()),
        FieldKind::Fragment => {
            let mut defaults = FieldOptions::new();
            defaults.insert(
                "objectExtensions",
                OptionValue::strings(FRAGMENT_OBJECT_EXTENSIONS.iter().copied()),
            );
            ("schema-object", Some(fragment_type(field)), defaults)
        }
        FieldKind::FragmentArray => {
            let mut defaults = FieldOptions::new();
            defaults.insert(
                "arrayExtensions",
                OptionValue::strings(ARRAY_EXTENSIONS.iter().copied()),
            );
            ("schema-array", Some(fragment_type(field)), defaults)
        }
        FieldKind::Array => {
            let mut defaults = FieldOptions::new();
            defaults.insert(
                "arrayExtensions",
                OptionValue::strings(ARRAY_EXTENSIONS.iter().copied()),
            );
            ("array", field.field_type.clone(), defaults)
        }
    };

    entry.insert("kind", OptionValue::String(kind.to_string()));
    entry.insert("name", OptionValue::String(field.name.clone()));
    if let Some(field_type) = field_type {
        entry.insert("type", OptionValue::String(field_type));
    }
    let options = defaults.merged_with(&field.options);
    if !options.is_empty() {
        entry.insert("options", OptionValue::Object(options));
    }
    entry
}

/// `fragment:<type>`, falling back to the field name
fn fragment_type(field: &FieldInfo) -> String {
    let base = field
        .field_type
        .clone()
        .unwrap_or_else(|| dasherize(&field.name));
    format!("fragment:{}", base)
}

/// Inputs shared by schema and trait descriptors.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorInput<'a> {
    pub name: &'a str,
    pub fields: &'a [FieldInfo],
    /// Names of composed traits, in declaration order
    pub traits: &'a [String],
    /// Name of the extension carrying this entity's behavior
    pub extension: Option<&'a str>,
}

fn fields_value(fields: &[FieldInfo]) -> OptionValue {
    OptionValue::Array(
        fields
            .iter()
            .map(|f| OptionValue::Object(schema_field(f)))
            .collect(),
    )
}

/// Schema descriptor source for a model.
///
/// ```text
/// export const UserSchema = {
///   type: 'user',
///   legacy: true,
///   identity: { kind: '@id', name: 'id' },
///   fields: [ ... ],
/// };
/// ```
pub fn schema_descriptor(input: &DescriptorInput) -> String {
    let mut descriptor = FieldOptions::new();
    descriptor.insert("type", OptionValue::String(input.name.to_string()));
    descriptor.insert("legacy", OptionValue::Bool(true));
    descriptor.insert("identity", OptionValue::Raw("{ kind: '@id', name: 'id' }".to_string()));
    descriptor.insert("fields", fields_value(input.fields));
    if !input.traits.is_empty() {
        descriptor.insert("traits", OptionValue::strings(input.traits.iter().cloned()));
    }
    if let Some(extension) = input.extension {
        descriptor.insert("objectExtensions", OptionValue::strings([extension]));
    }

    let const_name = format!("{}Schema", pascal_case(input.name));
    module_source(&const_name, &descriptor)
}

/// Trait descriptor source for a mixin or intermediate model.
pub fn trait_descriptor(input: &DescriptorInput) -> String {
    let mut descriptor = FieldOptions::new();
    descriptor.insert("name", OptionValue::String(input.name.to_string()));
    descriptor.insert("mode", OptionValue::String("legacy".to_string()));
    descriptor.insert("fields", fields_value(input.fields));
    if !input.traits.is_empty() {
        descriptor.insert("traits", OptionValue::strings(input.traits.iter().cloned()));
    }
    if let Some(extension) = input.extension {
        descriptor.insert("objectExtensions", OptionValue::strings([extension]));
    }

    let const_name = format!("{}Trait", pascal_case(input.name));
    module_source(&const_name, &descriptor)
}

fn module_source(const_name: &str, descriptor: &FieldOptions) -> String {
    format!(
        "export const {name} = {body};\n\nexport default {name};\n",
        name = const_name,
        body = render_object(descriptor, 0)
    )
}

/// A generated trait and where its files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitEntry {
    pub name: String,
    pub schema_path: PathBuf,
    /// Location of the trait interface (TypeScript sources only)
    pub types_path: Option<PathBuf>,
}

/// Traits known so far, keyed by the canonical source file they came from.
///
/// Intermediate models are registered as their traits are generated; a model
/// extending one of them looks its base trait up here.
#[derive(Debug, Clone, Default)]
pub struct TraitRegistry {
    entries: BTreeMap<PathBuf, TraitEntry>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: PathBuf, entry: TraitEntry) {
        self.entries.insert(source, entry);
    }

    pub fn get(&self, source: &Path) -> Option<&TraitEntry> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, name: &str, field_type: Option<&str>) -> FieldInfo {
        FieldInfo {
            kind,
            name: name.to_string(),
            field_type: field_type.map(str::to_string),
            options: FieldOptions::new(),
        }
    }

    #[test]
    fn test_entity_name_uses_nested_path() {
        let roots = vec![PathBuf::from("/p/app/models")];
        let exts = vec![".js".to_string(), ".ts".to_string()];
        assert_eq!(entity_name(Path::new("/p/app/models/user.js"), &roots, &exts), "user");
        assert_eq!(
            entity_name(Path::new("/p/app/models/admin/UserRole.ts"), &roots, &exts),
            "admin/user-role"
        );
        assert_eq!(entity_name(Path::new("/x/shared.js"), &roots, &exts), "shared");
    }

    #[test]
    fn test_fragment_defaults_under_explicit_options() {
        let mut address = field(FieldKind::Fragment, "address", Some("address"));
        address.options.insert("defaultValue", OptionValue::Raw("() => ({})".to_string()));
        let entry = schema_field(&address);
        assert_eq!(entry.get("kind").and_then(|v| v.as_str()), Some("schema-object"));
        assert_eq!(entry.get("type").and_then(|v| v.as_str()), Some("fragment:address"));
        let Some(OptionValue::Object(options)) = entry.get("options") else {
            panic!("expected options");
        };
        assert_eq!(
            options.get("objectExtensions"),
            Some(&OptionValue::strings(["ember-object", "fragment"]))
        );
        assert!(options.get("defaultValue").is_some());
    }

    #[test]
    fn test_explicit_array_extensions_win() {
        let mut tags = field(FieldKind::Array, "tags", None);
        tags.options
            .insert("arrayExtensions", OptionValue::strings(["custom"]));
        let entry = schema_field(&tags);
        let Some(OptionValue::Object(options)) = entry.get("options") else {
            panic!("expected options");
        };
        assert_eq!(options.get("arrayExtensions"), Some(&OptionValue::strings(["custom"])));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_fragment_array_kind() {
        let entry = schema_field(&field(FieldKind::FragmentArray, "lines", Some("line-item")));
        assert_eq!(entry.get("kind").and_then(|v| v.as_str()), Some("schema-array"));
        assert_eq!(entry.get("type").and_then(|v| v.as_str()), Some("fragment:line-item"));
    }

    #[test]
    fn test_plain_attribute_has_no_options() {
        let entry = schema_field(&field(FieldKind::Attribute, "name", Some("string")));
        assert!(entry.get("options").is_none());
        assert_eq!(
            render_object(&entry, 0),
            "{\n  kind: 'attribute',\n  name: 'name',\n  type: 'string',\n}"
        );
    }

    #[test]
    fn test_schema_descriptor_shape() {
        let fields = vec![field(FieldKind::Attribute, "name", Some("string"))];
        let traits = vec!["timestamped".to_string()];
        let code = schema_descriptor(&DescriptorInput {
            name: "user",
            fields: &fields,
            traits: &traits,
            extension: Some("user"),
        });
        assert!(code.starts_with("export const UserSchema = {\n  type: 'user',\n  legacy: true,\n"));
        assert!(code.contains("identity: { kind: '@id', name: 'id' },"));
        assert!(code.contains("traits: ['timestamped'],"));
        assert!(code.contains("objectExtensions: ['user'],"));
        assert!(code.ends_with("export default UserSchema;\n"));
    }

    #[test]
    fn test_trait_descriptor_shape() {
        let code = trait_descriptor(&DescriptorInput {
            name: "audit/logged",
            fields: &[],
            traits: &[],
            extension: None,
        });
        assert!(code.starts_with("export const AuditLoggedTrait = {\n  name: 'audit/logged',\n  mode: 'legacy',\n  fields: [],\n};"));
        assert!(!code.contains("traits:"));
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = TraitRegistry::new();
        registry.register(
            PathBuf::from("/p/app/models/base.js"),
            TraitEntry {
                name: "base".to_string(),
                schema_path: PathBuf::from("/p/app/data/traits/base.schema.js"),
                types_path: None,
            },
        );
        assert!(registry.contains(Path::new("/p/app/models/base.js")));
        assert_eq!(registry.get(Path::new("/p/app/models/base.js")).unwrap().name, "base");
        assert_eq!(registry.len(), 1);
    }
}
