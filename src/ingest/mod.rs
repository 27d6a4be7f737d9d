//! Parsing of model and mixin sources into [`ParsedFile`] records.
//!
//! Each file is parsed exactly once. The resulting record holds everything
//! later stages need (imports, declarative fields, the default-export
//! declaration, behavioral member spans) and is never mutated afterwards.

pub mod declarations;
pub mod imports;
pub mod literal;
pub mod pool;

pub use imports::{ImportBinding, ImportInfo};
pub use literal::{FieldOptions, OptionValue};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::common::safe_str_slice;
use crate::error::{MigrateError, Result};

/// Source language of a file, which selects the tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    /// File extension (with dot) used for generated sources
    pub fn extension(&self) -> &'static str {
        match self {
            Language::JavaScript => ".js",
            Language::TypeScript => ".ts",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::JavaScript => write!(f, "javascript"),
            Language::TypeScript => write!(f, "typescript"),
        }
    }
}

/// Detect the language from a path's extension.
///
/// Declaration files (`.d.ts`) are not sources and yield None.
pub fn detect_language(path: &Path) -> Option<Language> {
    let name = path.file_name()?.to_string_lossy();
    if name.ends_with(".d.ts") {
        return None;
    }
    match path.extension()?.to_str()? {
        "js" | "mjs" => Some(Language::JavaScript),
        "ts" | "mts" => Some(Language::TypeScript),
        _ => None,
    }
}

/// Closed set of declarative field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Attribute,
    BelongsTo,
    HasMany,
    /// `fragment(...)`, migrated to a schema-object field
    Fragment,
    /// `fragmentArray(...)`, migrated to a schema-array field
    FragmentArray,
    Array,
}

impl FieldKind {
    /// Decode a field function name (after import alias resolution).
    pub fn from_callee(name: &str) -> Option<FieldKind> {
        match name {
            "attr" => Some(FieldKind::Attribute),
            "belongsTo" => Some(FieldKind::BelongsTo),
            "hasMany" => Some(FieldKind::HasMany),
            "fragment" => Some(FieldKind::Fragment),
            "fragmentArray" => Some(FieldKind::FragmentArray),
            "array" => Some(FieldKind::Array),
            _ => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldKind::BelongsTo | FieldKind::HasMany)
    }
}

/// A declarative field recognized in a model or mixin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub kind: FieldKind,
    pub name: String,
    /// First string argument: transform, related type or fragment type
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub options: FieldOptions,
}

impl FieldInfo {
    /// `polymorphic: true` on a relationship field
    pub fn is_polymorphic(&self) -> bool {
        self.kind.is_relationship()
            && self
                .options
                .get("polymorphic")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
    }
}

/// Syntactic shape of the default-export declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// `class X extends Base.extend(A) { ... }`
    Class,
    /// `Base.extend(A, { ... })`
    Extend,
    /// `Mixin.create(A, { ... })`
    MixinCreate,
}

/// The declaration a file default-exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Class or binding name, when there is one
    pub name: Option<String>,
    /// Leftmost identifier of the base (`Model`, `BaseModel`)
    pub base: Option<String>,
    /// Identifiers of composed mixins, in source order
    pub mixins: Vec<String>,
    /// Top-level statement spans that make up the declaration
    pub statement_spans: Vec<Range<usize>>,
}

/// Where a behavioral member was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberOrigin {
    ClassBody,
    ObjectLiteral,
}

/// A non-declarative member (method, accessor, service injection, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMember {
    pub name: Option<String>,
    /// Byte span including leading decorators and comments
    pub span: Range<usize>,
    pub origin: MemberOrigin,
    /// Class field syntax that needs a terminating `;` in a class body
    pub is_class_field: bool,
}

/// Immutable structural record of one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub language: Language,
    pub imports: Vec<ImportInfo>,
    pub fields: Vec<FieldInfo>,
    pub declaration: Option<Declaration>,
    pub behaviors: Vec<BehaviorMember>,
    /// Top-level statements an extension file must keep
    pub retained_statements: Vec<Range<usize>>,
    /// Extraction problems (malformed field shapes); the file is still usable
    pub warnings: Vec<String>,
    pub source: String,
}

impl ParsedFile {
    /// Source text of a span
    pub fn text(&self, span: &Range<usize>) -> Option<&str> {
        safe_str_slice(&self.source, span.start, span.end)
    }

    /// Find the import that binds `local`
    pub fn import_for_binding(&self, local: &str) -> Option<(&ImportInfo, &ImportBinding)> {
        self.imports.iter().find_map(|import| {
            import
                .bindings
                .iter()
                .find(|b| b.local == local)
                .map(|b| (import, b))
        })
    }

    pub fn has_behavior(&self) -> bool {
        !self.behaviors.is_empty()
    }
}

/// Parse a source file into a [`ParsedFile`].
///
/// # Errors
/// - unsupported extension
/// - syntax errors anywhere in the tree (ERROR or MISSING nodes)
///
/// Unrecognized field or declaration shapes are not errors: they are left
/// out of `fields` (and kept as behavior where applicable).
pub fn parse(path: &Path, source: &str) -> Result<ParsedFile> {
    let language = detect_language(path).ok_or_else(|| {
        MigrateError::parse(path, "unsupported source language")
    })?;

    let tree = pool::with_parser(language, |parser| parser.parse(source, None))
        .map_err(|e| MigrateError::parse(path, e.to_string()))?
        .ok_or_else(|| MigrateError::parse(path, "parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let location = first_error_position(&root)
            .map(|p| format!(" at {}:{}", p.row + 1, p.column + 1))
            .unwrap_or_default();
        return Err(MigrateError::parse(path, format!("syntax error{}", location)));
    }

    let imports = imports::extract_imports(&root, source);
    let extracted = declarations::extract(&root, source, &imports);

    Ok(ParsedFile {
        path: path.to_path_buf(),
        language,
        imports,
        fields: extracted.fields,
        declaration: extracted.declaration,
        behaviors: extracted.behaviors,
        retained_statements: extracted.retained_statements,
        warnings: extracted.warnings,
        source: source.to_string(),
    })
}

fn first_error_position(node: &tree_sitter::Node) -> Option<tree_sitter::Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error_position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("a/user.js")), Some(Language::JavaScript));
        assert_eq!(detect_language(Path::new("a/user.ts")), Some(Language::TypeScript));
        assert_eq!(detect_language(Path::new("a/user.d.ts")), None);
        assert_eq!(detect_language(Path::new("a/user.hbs")), None);
    }

    #[test]
    fn test_field_kind_from_callee() {
        assert_eq!(FieldKind::from_callee("attr"), Some(FieldKind::Attribute));
        assert_eq!(FieldKind::from_callee("fragmentArray"), Some(FieldKind::FragmentArray));
        assert_eq!(FieldKind::from_callee("service"), None);
    }

    #[test]
    fn test_parse_model_class() {
        let source = r#"import Model, { attr, belongsTo, hasMany } from '@ember-data/model';
import { computed } from '@ember/object';

export default class User extends Model {
  @attr('string') name;
  @belongsTo('company', { async: false, inverse: null }) company;
  @hasMany('post') posts;

  get displayName() {
    return `${this.name}!`;
  }
}
"#;
        let parsed = parse(Path::new("/p/app/models/user.js"), source).unwrap();
        assert_eq!(parsed.language, Language::JavaScript);
        assert_eq!(parsed.imports.len(), 2);

        let names: Vec<&str> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "company", "posts"]);
        assert_eq!(parsed.fields[0].field_type.as_deref(), Some("string"));
        assert_eq!(parsed.fields[1].kind, FieldKind::BelongsTo);
        assert_eq!(
            parsed.fields[1].options.get("async"),
            Some(&OptionValue::Bool(false))
        );

        let decl = parsed.declaration.as_ref().unwrap();
        assert_eq!(decl.kind, DeclarationKind::Class);
        assert_eq!(decl.name.as_deref(), Some("User"));
        assert_eq!(decl.base.as_deref(), Some("Model"));

        assert_eq!(parsed.behaviors.len(), 1);
        let text = parsed.text(&parsed.behaviors[0].span).unwrap();
        assert!(text.starts_with("get displayName()"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let err = parse(Path::new("/p/app/models/bad.js"), "export default class {").unwrap_err();
        match err {
            MigrateError::Parse { message, .. } => assert!(message.contains("syntax error")),
            other => panic!("expected parse failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_extension_is_parse_failure() {
        assert!(matches!(
            parse(Path::new("/p/app/models/user.hbs"), "{{name}}"),
            Err(MigrateError::Parse { .. })
        ));
    }

    #[test]
    fn test_file_without_declaration_parses() {
        let parsed = parse(Path::new("/p/app/utils/format.js"), "export function f() {}\n").unwrap();
        assert!(parsed.declaration.is_none());
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.retained_statements.len(), 1);
    }

    #[test]
    fn test_polymorphic_flag() {
        let source = r#"import Model, { belongsTo } from '@ember-data/model';
export default class Comment extends Model {
  @belongsTo('commentable', { polymorphic: true, async: false }) target;
}
"#;
        let parsed = parse(Path::new("/p/app/models/comment.js"), source).unwrap();
        assert!(parsed.fields[0].is_polymorphic());
    }
}
