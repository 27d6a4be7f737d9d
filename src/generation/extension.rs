//! Extension source synthesis.
//!
//! An extension keeps every behavioral member of the original declaration
//! byte-for-byte, wrapped in a class (class-body members) or an object
//! literal (mixin and classic `.extend({})` members). The default export is
//! dropped, other top-level statements are kept, and imports are filtered
//! to those still referenced and rewritten for the new location.

use std::path::Path;

use crate::common::{contains_identifier, pascal_case};
use crate::error::{MigrateError, Result};
use crate::generation::rewrite::ImportRewriter;
use crate::ingest::imports::{ImportBinding, ImportInfo, ImportedName};
use crate::ingest::{MemberOrigin, ParsedFile};

/// Syntactic wrapper of a generated extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionShape {
    Class,
    Object,
}

/// Extension source plus the name it exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedExtension {
    pub code: String,
    pub export_name: String,
    pub shape: ExtensionShape,
}

/// Exported binding name for an entity's extension (`user` → `UserExtension`)
pub fn extension_export_name(entity_name: &str) -> String {
    format!("{}Extension", pascal_case(entity_name))
}

/// Build the extension for `file`, or None when it has no behavior.
///
/// `target_file` is the routed output path of the extension; without it
/// relative imports fall back to the heuristic rewrite.
pub fn generate_extension(
    file: &ParsedFile,
    entity_name: &str,
    target_file: Option<&Path>,
    rewriter: &ImportRewriter,
) -> Result<Option<GeneratedExtension>> {
    if !file.has_behavior() {
        return Ok(None);
    }

    // Classic `.extend({...})` members are object pairs (`name: value`,
    // `method() {}` with separating commas) and cannot be pasted into a
    // class body unchanged, so any non-class member selects the object shape.
    let shape = if file
        .behaviors
        .iter()
        .all(|m| m.origin == MemberOrigin::ClassBody)
    {
        ExtensionShape::Class
    } else {
        ExtensionShape::Object
    };

    let mut members = Vec::with_capacity(file.behaviors.len());
    for member in &file.behaviors {
        let text = file.text(&member.span).ok_or_else(|| {
            MigrateError::generation(
                &file.path,
                format!("member span {}..{} is not valid source", member.span.start, member.span.end),
            )
        })?;
        let text = match shape {
            ExtensionShape::Class if member.is_class_field && !text.trim_end().ends_with(';') => {
                format!("{};", text)
            }
            ExtensionShape::Object => format!("{},", text),
            ExtensionShape::Class => text.to_string(),
        };
        members.push(text);
    }

    let mut retained = Vec::with_capacity(file.retained_statements.len());
    for span in &file.retained_statements {
        let text = file.text(span).ok_or_else(|| {
            MigrateError::generation(&file.path, "retained statement span is not valid source")
        })?;
        retained.push(text);
    }

    let export_name = extension_export_name(entity_name);
    let body = members
        .iter()
        .map(|m| format!("  {}", m))
        .collect::<Vec<_>>()
        .join("\n\n");
    let wrapper = match shape {
        ExtensionShape::Class => format!("export class {} {{\n{}\n}}\n", export_name, body),
        ExtensionShape::Object => format!("export const {} = {{\n{}\n}};\n", export_name, body),
    };

    let referenced = format!("{}\n{}", retained.join("\n"), members.join("\n"));
    let mut imports = Vec::new();
    for import in &file.imports {
        if let Some(statement) = rewrite_import(file, import, &referenced, target_file, rewriter)? {
            imports.push(statement);
        }
    }

    let mut sections = Vec::new();
    if !imports.is_empty() {
        sections.push(imports.join("\n"));
    }
    if !retained.is_empty() {
        sections.push(retained.join("\n\n"));
    }
    sections.push(wrapper);

    Ok(Some(GeneratedExtension {
        code: sections.join("\n\n"),
        export_name,
        shape,
    }))
}

/// Keep an import if any binding is referenced, with its specifier rewritten.
fn rewrite_import(
    file: &ParsedFile,
    import: &ImportInfo,
    referenced: &str,
    target_file: Option<&Path>,
    rewriter: &ImportRewriter,
) -> Result<Option<String>> {
    let used: Vec<&ImportBinding> = import
        .bindings
        .iter()
        .filter(|b| contains_identifier(referenced, &b.local))
        .collect();
    if !import.is_side_effect_only() && used.is_empty() {
        return Ok(None);
    }

    let (specifier, _) = rewriter.rewrite(&import.specifier, Some(&file.path), target_file);

    if used.len() == import.bindings.len() {
        // Whole statement kept; only the specifier span changes
        let statement = file.text(&import.statement_span).ok_or_else(|| {
            MigrateError::generation(&file.path, "import statement span is not valid source")
        })?;
        let start = import.specifier_span.start - import.statement_span.start;
        let end = import.specifier_span.end - import.statement_span.start;
        if end > statement.len() || !statement.is_char_boundary(start) || !statement.is_char_boundary(end) {
            return Err(MigrateError::generation(
                &file.path,
                "import specifier span lies outside its statement",
            ));
        }
        return Ok(Some(format!(
            "{}{}{}",
            &statement[..start],
            specifier,
            &statement[end..]
        )));
    }

    let quote = file
        .source
        .get(import.specifier_span.start.saturating_sub(1)..import.specifier_span.start)
        .unwrap_or("'");
    Ok(Some(partial_import(import, &used, &specifier, quote)))
}

/// `import A, { b, c as d } from '<specifier>';` for a subset of bindings
fn partial_import(import: &ImportInfo, used: &[&ImportBinding], specifier: &str, quote: &str) -> String {
    let mut clause = Vec::new();
    let mut named = Vec::new();
    for binding in used {
        let type_prefix = if binding.is_type_only && !import.is_type_only {
            "type "
        } else {
            ""
        };
        match &binding.imported {
            ImportedName::Default => clause.push(binding.local.clone()),
            ImportedName::Namespace => clause.push(format!("* as {}", binding.local)),
            ImportedName::Named(name) if *name == binding.local => {
                named.push(format!("{}{}", type_prefix, name))
            }
            ImportedName::Named(name) => {
                named.push(format!("{}{} as {}", type_prefix, name, binding.local))
            }
        }
    }
    if !named.is_empty() {
        clause.push(format!("{{ {} }}", named.join(", ")));
    }
    let keyword = if import.is_type_only { "import type" } else { "import" };
    format!(
        "{} {} from {}{}{};",
        keyword,
        clause.join(", "),
        quote,
        specifier,
        quote
    )
}
