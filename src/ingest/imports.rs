//! Import statement extraction from JavaScript and TypeScript sources.
//!
//! Only ES `import` declarations are recorded. Each import keeps the byte
//! span of the whole statement and of the specifier text so the generator
//! can rewrite the specifier in place without re-printing the statement.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::common::{node_text, unquote};

/// What an import binding refers to in the source module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ImportedName {
    /// `import X from '...'`
    Default,
    /// `import * as X from '...'`
    Namespace,
    /// `import { name as X } from '...'`
    Named(String),
}

/// One local name introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBinding {
    pub local: String,
    pub imported: ImportedName,
    /// `import { type X }`
    pub is_type_only: bool,
}

/// A fact about an import statement.
///
/// Pure data. Resolution against the filesystem happens in `resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Module specifier without quotes
    pub specifier: String,
    /// `import type ...`, or every binding is individually type-only
    pub is_type_only: bool,
    pub bindings: Vec<ImportBinding>,
    /// Byte span of the full statement
    pub statement_span: Range<usize>,
    /// Byte span of the specifier text, quotes excluded
    pub specifier_span: Range<usize>,
}

impl ImportInfo {
    pub fn is_side_effect_only(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Local names of the bindings
    pub fn locals(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.local.as_str())
    }
}

/// Extract import facts from a parsed program.
///
/// Only top-level statements are inspected; dynamic `import()` is ignored.
pub fn extract_imports(root: &tree_sitter::Node, source: &str) -> Vec<ImportInfo> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "import_statement" {
            if let Some(info) = extract_import_statement(&child, source) {
                imports.push(info);
            }
        }
    }
    imports
}

fn extract_import_statement(node: &tree_sitter::Node, source: &str) -> Option<ImportInfo> {
    let source_node = node.child_by_field_name("source")?;
    let raw = node_text(&source_node, source)?;
    let specifier = unquote(raw).to_string();
    let specifier_span = if raw.len() >= 2 {
        source_node.start_byte() + 1..source_node.end_byte() - 1
    } else {
        source_node.start_byte()..source_node.end_byte()
    };

    let mut statement_type_only = false;
    let mut bindings = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "type" if !child.is_named() => statement_type_only = true,
            "import_clause" => collect_clause_bindings(&child, source, &mut bindings),
            _ => {}
        }
    }

    let is_type_only =
        statement_type_only || (!bindings.is_empty() && bindings.iter().all(|b| b.is_type_only));
    if statement_type_only {
        for binding in &mut bindings {
            binding.is_type_only = true;
        }
    }

    Some(ImportInfo {
        specifier,
        is_type_only,
        bindings,
        statement_span: node.start_byte()..node.end_byte(),
        specifier_span,
    })
}

fn collect_clause_bindings(clause: &tree_sitter::Node, source: &str, out: &mut Vec<ImportBinding>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                if let Some(local) = node_text(&child, source) {
                    out.push(ImportBinding {
                        local: local.to_string(),
                        imported: ImportedName::Default,
                        is_type_only: false,
                    });
                }
            }
            "namespace_import" => {
                let mut inner = child.walk();
                let local = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier")
                    .and_then(|n| node_text(&n, source));
                if let Some(local) = local {
                    out.push(ImportBinding {
                        local: local.to_string(),
                        imported: ImportedName::Namespace,
                        is_type_only: false,
                    });
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "import_specifier" {
                        if let Some(binding) = import_specifier(&spec, source) {
                            out.push(binding);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn import_specifier(spec: &tree_sitter::Node, source: &str) -> Option<ImportBinding> {
    let name_node = spec.child_by_field_name("name")?;
    let imported = unquote(node_text(&name_node, source)?).to_string();
    let local = match spec.child_by_field_name("alias") {
        Some(alias) => node_text(&alias, source)?.to_string(),
        None => imported.clone(),
    };
    let mut cursor = spec.walk();
    let is_type_only = spec
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == "type");
    let imported = if imported == "default" {
        ImportedName::Default
    } else {
        ImportedName::Named(imported)
    };
    Some(ImportBinding {
        local,
        imported,
        is_type_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::pool::with_parser;
    use crate::ingest::Language;

    fn imports_of(language: Language, source: &str) -> Vec<ImportInfo> {
        let tree = with_parser(language, |p| p.parse(source, None))
            .unwrap()
            .unwrap();
        extract_imports(&tree.root_node(), source)
    }

    #[test]
    fn test_default_and_named_bindings() {
        let source = "import Model, { attr, belongsTo as bt } from '@ember-data/model';\n";
        let imports = imports_of(Language::JavaScript, source);
        assert_eq!(imports.len(), 1);
        let import = &imports[0];
        assert_eq!(import.specifier, "@ember-data/model");
        assert_eq!(&source[import.specifier_span.clone()], "@ember-data/model");
        assert_eq!(&source[import.statement_span.clone()], source.trim_end());

        let locals: Vec<&str> = import.locals().collect();
        assert_eq!(locals, vec!["Model", "attr", "bt"]);
        assert_eq!(import.bindings[0].imported, ImportedName::Default);
        assert_eq!(
            import.bindings[2].imported,
            ImportedName::Named("belongsTo".to_string())
        );
        assert!(!import.is_type_only);
    }

    #[test]
    fn test_namespace_and_side_effect_imports() {
        let source = "import * as utils from './utils';\nimport './polyfill';\n";
        let imports = imports_of(Language::JavaScript, source);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].bindings[0].imported, ImportedName::Namespace);
        assert_eq!(imports[0].bindings[0].local, "utils");
        assert!(imports[1].is_side_effect_only());
        assert_eq!(imports[1].specifier, "./polyfill");
    }

    #[test]
    fn test_type_only_imports() {
        let source = "import type Owner from '../mixins/owner';\nimport { type Tag, type Label } from './tags';\nimport { type A, b } from './mixed';\n";
        let imports = imports_of(Language::TypeScript, source);
        assert_eq!(imports.len(), 3);
        assert!(imports[0].is_type_only);
        assert!(imports[0].bindings[0].is_type_only);
        assert!(imports[1].is_type_only);
        assert!(!imports[2].is_type_only);
        assert!(imports[2].bindings[0].is_type_only);
        assert!(!imports[2].bindings[1].is_type_only);
    }

    #[test]
    fn test_nested_imports_are_ignored() {
        let source = "function f() { return import('./lazy'); }\n";
        assert!(imports_of(Language::JavaScript, source).is_empty());
    }
}
