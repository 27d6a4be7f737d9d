//! TypeScript type artifacts for migrated resources, traits and extensions.

use std::path::Path;

use crate::common::pascal_case;
use crate::generation::extension::ExtensionShape;
use crate::generation::render::{quote, render_key};
use crate::ingest::{FieldInfo, FieldKind};
use crate::validation::{relative_path, to_relative_specifier};

/// An interface imported from another generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeImport {
    pub interface: String,
    pub specifier: String,
}

/// Interface name of a resource (`admin/user` → `AdminUser`)
pub fn resource_interface_name(entity_name: &str) -> String {
    pascal_case(entity_name)
}

/// Interface name of a trait (`timestamped` → `TimestampedTrait`)
pub fn trait_interface_name(entity_name: &str) -> String {
    format!("{}Trait", pascal_case(entity_name))
}

/// Type alias exported by an extension type file
pub fn extension_signature_name(extension_export: &str) -> String {
    format!("{}Signature", extension_export)
}

/// Specifier importing `to_file` from `from_file`, without the file extension.
pub fn import_specifier_between(from_file: &Path, to_file: &Path) -> String {
    let from_dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    let relative = relative_path(from_dir, &to_file.with_extension(""));
    to_relative_specifier(&relative)
}

fn ts_type(field: &FieldInfo) -> &'static str {
    match field.kind {
        FieldKind::Attribute => match field.field_type.as_deref() {
            Some("string") => "string | null",
            Some("number") => "number | null",
            Some("boolean") => "boolean | null",
            Some("date") => "Date | null",
            _ => "unknown",
        },
        FieldKind::BelongsTo => "unknown | null",
        FieldKind::HasMany => "unknown[]",
        FieldKind::Fragment => "Record<string, unknown> | null",
        FieldKind::FragmentArray => "Record<string, unknown>[] | null",
        FieldKind::Array => "unknown[] | null",
    }
}

fn interface_source(
    interface: &str,
    fields: &[FieldInfo],
    parents: &[TypeImport],
    with_identity: bool,
) -> String {
    let mut out = String::new();
    for parent in parents {
        out.push_str(&format!(
            "import type {{ {} }} from {};\n",
            parent.interface,
            quote(&parent.specifier)
        ));
    }
    if !parents.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("export interface {}", interface));
    if !parents.is_empty() {
        let names: Vec<&str> = parents.iter().map(|p| p.interface.as_str()).collect();
        out.push_str(&format!(" extends {}", names.join(", ")));
    }
    out.push_str(" {\n");
    if with_identity {
        out.push_str("  readonly id: string | null;\n");
    }
    for field in fields {
        out.push_str(&format!("  {}: {};\n", render_key(&field.name), ts_type(field)));
    }
    out.push_str("}\n");
    out
}

/// `<basename>.schema.types.ts` for a resource.
///
/// `parents` are trait interfaces followed by the extension signature, if any.
pub fn resource_type(entity_name: &str, fields: &[FieldInfo], parents: &[TypeImport]) -> String {
    interface_source(&resource_interface_name(entity_name), fields, parents, true)
}

/// `<basename>.schema.types.ts` for a trait
pub fn trait_type(entity_name: &str, fields: &[FieldInfo], parents: &[TypeImport]) -> String {
    interface_source(&trait_interface_name(entity_name), fields, parents, false)
}

/// `<basename>.ext.types.ts`: the extension's shape as a named type
pub fn extension_type(extension_export: &str, shape: ExtensionShape, specifier: &str) -> String {
    let target = match shape {
        ExtensionShape::Class => extension_export.to_string(),
        ExtensionShape::Object => format!("typeof {}", extension_export),
    };
    format!(
        "import type {{ {} }} from {};\n\nexport type {} = {};\n",
        extension_export,
        quote(specifier),
        extension_signature_name(extension_export),
        target
    )
}
