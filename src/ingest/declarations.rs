//! Default-export declaration analysis.
//!
//! Walks the top level of a program, finds the declaration the file
//! default-exports and splits its members into declarative fields and
//! behavioral members. Everything else at the top level (except imports and
//! comments) is recorded as a retained statement.

use std::ops::Range;
use tree_sitter::Node;

use crate::common::{node_text, unquote};
use crate::ingest::imports::{ImportInfo, ImportedName};
use crate::ingest::literal::{FieldOptions, OptionValue};
use crate::ingest::{
    BehaviorMember, Declaration, DeclarationKind, FieldInfo, FieldKind, MemberOrigin,
};

/// Everything [`extract`] learned about a file besides its imports.
#[derive(Debug, Default)]
pub struct Extraction {
    pub fields: Vec<FieldInfo>,
    pub declaration: Option<Declaration>,
    pub behaviors: Vec<BehaviorMember>,
    pub retained_statements: Vec<Range<usize>>,
    pub warnings: Vec<String>,
}

/// Outcome of decoding one field-vocabulary call.
enum FieldCall {
    /// Callee is not part of the field vocabulary
    NotAField,
    Field {
        kind: FieldKind,
        field_type: Option<String>,
        options: FieldOptions,
    },
    /// Callee is a field function but the arguments are unusable
    Malformed(String),
}

struct Walker<'a> {
    source: &'a str,
    imports: &'a [ImportInfo],
    out: Extraction,
}

/// Analyze the top-level statements of a parsed program.
pub fn extract(root: &Node, source: &str, imports: &[ImportInfo]) -> Extraction {
    let mut walker = Walker {
        source,
        imports,
        out: Extraction::default(),
    };

    let mut cursor = root.walk();
    let statements: Vec<Node> = root.named_children(&mut cursor).collect();

    let default_export = statements
        .iter()
        .copied()
        .find(|stmt| stmt.kind() == "export_statement" && has_token(stmt, "default"));

    let mut consumed: Vec<Range<usize>> = Vec::new();
    if let Some(export) = default_export {
        consumed.push(export.start_byte()..export.end_byte());
        if let Some(target) = exported_value(&export) {
            walker.analyze_export_target(&target, &statements, &mut consumed);
        }
    }

    for stmt in &statements {
        let span = stmt.start_byte()..stmt.end_byte();
        match stmt.kind() {
            "import_statement" | "comment" => {}
            _ if consumed.contains(&span) => {}
            _ => walker.out.retained_statements.push(span),
        }
    }

    if let Some(declaration) = walker.out.declaration.as_mut() {
        declaration.statement_spans = consumed;
    }
    walker.out
}

impl<'a> Walker<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node_text(node, self.source).unwrap_or_default()
    }

    /// Follow `export default X` to the top-level statement declaring X.
    fn analyze_export_target(
        &mut self,
        target: &Node,
        statements: &[Node],
        consumed: &mut Vec<Range<usize>>,
    ) {
        if target.kind() != "identifier" {
            self.analyze_declaration(target, None);
            return;
        }

        let name = self.text(target);
        for stmt in statements {
            if let Some(decl) = self.find_named_declaration(stmt, name) {
                consumed.push(stmt.start_byte()..stmt.end_byte());
                self.analyze_declaration(&decl, Some(name.to_string()));
                return;
            }
        }
    }

    /// A class declaration or `const X = <expr>` named `name` in `stmt`.
    fn find_named_declaration<'t>(&self, stmt: &Node<'t>, name: &str) -> Option<Node<'t>> {
        match stmt.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                let id = stmt.child_by_field_name("name")?;
                (self.text(&id) == name).then_some(*stmt)
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = stmt.walk();
                let found = stmt
                    .named_children(&mut cursor)
                    .filter(|d| d.kind() == "variable_declarator")
                    .find(|d| {
                        d.child_by_field_name("name")
                            .map(|id| self.text(&id) == name)
                            .unwrap_or(false)
                    });
                found.and_then(|d| d.child_by_field_name("value"))
            }
            "export_statement" => {
                let inner = stmt.child_by_field_name("declaration")?;
                self.find_named_declaration(&inner, name)
            }
            _ => None,
        }
    }

    fn analyze_declaration(&mut self, node: &Node, binding_name: Option<String>) {
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(&n).to_string())
                    .or(binding_name);
                let mut base = None;
                let mut mixins = Vec::new();
                if let Some(heritage) = heritage_expression(node) {
                    self.analyze_heritage(&heritage, &mut base, &mut mixins);
                }
                self.out.declaration = Some(Declaration {
                    kind: DeclarationKind::Class,
                    name,
                    base,
                    mixins,
                    statement_spans: Vec::new(),
                });
                if let Some(body) = node.child_by_field_name("body") {
                    self.collect_class_members(&body);
                }
            }
            "call_expression" => self.analyze_call_declaration(node, binding_name),
            "parenthesized_expression" => {
                if let Some(inner) = node.named_child(0) {
                    self.analyze_declaration(&inner, binding_name);
                }
            }
            _ => {}
        }
    }

    /// `Base.extend(A, B, { ... })` or `Mixin.create(A, { ... })`
    fn analyze_call_declaration(&mut self, node: &Node, binding_name: Option<String>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        if function.kind() != "member_expression" {
            return;
        }
        let method = function
            .child_by_field_name("property")
            .map(|p| self.text(&p))
            .unwrap_or_default();
        let kind = match method {
            "extend" => DeclarationKind::Extend,
            "create" => DeclarationKind::MixinCreate,
            _ => return,
        };

        let mut base = None;
        let mut mixins = Vec::new();
        if let Some(object) = function.child_by_field_name("object") {
            if kind == DeclarationKind::Extend {
                // Base may itself be a chain: Model.extend(A).extend(B, {...})
                self.analyze_heritage(&object, &mut base, &mut mixins);
            }
        }

        let mut body = None;
        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for arg in arguments.named_children(&mut cursor) {
                match arg.kind() {
                    "identifier" => mixins.push(self.text(&arg).to_string()),
                    "object" => body = Some(arg),
                    _ => {}
                }
            }
        }

        self.out.declaration = Some(Declaration {
            kind,
            name: binding_name,
            base,
            mixins,
            statement_spans: Vec::new(),
        });
        if let Some(body) = body {
            self.collect_object_members(&body);
        }
    }

    fn analyze_heritage(&self, expr: &Node, base: &mut Option<String>, mixins: &mut Vec<String>) {
        match expr.kind() {
            "call_expression" => {
                let function = expr.child_by_field_name("function");
                let extend_object = function.as_ref().and_then(|f| {
                    let is_extend = f.kind() == "member_expression"
                        && f.child_by_field_name("property")
                            .map(|p| self.text(&p) == "extend")
                            .unwrap_or(false);
                    if is_extend {
                        f.child_by_field_name("object")
                    } else {
                        None
                    }
                });
                match extend_object {
                    Some(object) => {
                        self.analyze_heritage(&object, base, mixins);
                        if let Some(arguments) = expr.child_by_field_name("arguments") {
                            let mut cursor = arguments.walk();
                            for arg in arguments.named_children(&mut cursor) {
                                if arg.kind() == "identifier" {
                                    mixins.push(self.text(&arg).to_string());
                                }
                            }
                        }
                    }
                    None => *base = leftmost_identifier(expr, self.source),
                }
            }
            "parenthesized_expression" => {
                if let Some(inner) = expr.named_child(0) {
                    self.analyze_heritage(&inner, base, mixins);
                }
            }
            _ => *base = leftmost_identifier(expr, self.source),
        }
    }

    fn collect_class_members(&mut self, body: &Node) {
        let mut pending_start: Option<usize> = None;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                // Leading trivia and TypeScript method decorators attach to
                // the member that follows them.
                "comment" | "decorator" => {
                    pending_start.get_or_insert(member.start_byte());
                }
                "field_definition" | "public_field_definition" => {
                    let start = pending_start.take().unwrap_or(member.start_byte());
                    self.class_field(&member, start);
                }
                kind => {
                    let start = pending_start.take().unwrap_or(member.start_byte());
                    let is_class_field = matches!(
                        kind,
                        "method_signature" | "abstract_method_signature" | "index_signature"
                    );
                    let name = member
                        .child_by_field_name("name")
                        .map(|n| self.text(&n).to_string());
                    self.out.behaviors.push(BehaviorMember {
                        name,
                        span: start..member.end_byte(),
                        origin: MemberOrigin::ClassBody,
                        is_class_field,
                    });
                }
            }
        }
    }

    fn class_field(&mut self, member: &Node, start: usize) {
        let name_node = member
            .child_by_field_name("property")
            .or_else(|| member.child_by_field_name("name"));
        let name = name_node.map(|n| unquote(self.text(&n)).to_string());

        let mut cursor = member.walk();
        let decorators: Vec<Node> = member
            .children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .collect();

        for decorator in &decorators {
            let Some(expr) = decorator.named_child(0) else {
                continue;
            };
            match self.decode_field_call(&expr) {
                FieldCall::NotAField => continue,
                FieldCall::Field {
                    kind,
                    field_type,
                    options,
                } => {
                    if let Some(name) = name {
                        self.out.fields.push(FieldInfo {
                            kind,
                            name,
                            field_type,
                            options,
                        });
                        return;
                    }
                    self.out
                        .warnings
                        .push(format!("field decorator on unnamed member: {}", self.text(decorator)));
                    break;
                }
                FieldCall::Malformed(reason) => {
                    self.out.warnings.push(format!(
                        "field '{}' ignored: {}",
                        name.as_deref().unwrap_or("?"),
                        reason
                    ));
                    break;
                }
            }
        }

        self.out.behaviors.push(BehaviorMember {
            name,
            span: start..member.end_byte(),
            origin: MemberOrigin::ClassBody,
            is_class_field: true,
        });
    }

    fn collect_object_members(&mut self, object: &Node) {
        let mut pending_start: Option<usize> = None;
        let mut cursor = object.walk();
        for member in object.named_children(&mut cursor) {
            if member.kind() == "comment" {
                pending_start.get_or_insert(member.start_byte());
                continue;
            }
            let start = pending_start.take().unwrap_or(member.start_byte());

            let mut name = None;
            if member.kind() == "pair" {
                let key = member.child_by_field_name("key");
                name = key.map(|k| unquote(self.text(&k)).to_string());
                if let (Some(field_name), Some(value)) =
                    (name.clone(), member.child_by_field_name("value"))
                {
                    match self.decode_field_call(&value) {
                        FieldCall::Field {
                            kind,
                            field_type,
                            options,
                        } => {
                            self.out.fields.push(FieldInfo {
                                kind,
                                name: field_name,
                                field_type,
                                options,
                            });
                            continue;
                        }
                        FieldCall::Malformed(reason) => {
                            self.out
                                .warnings
                                .push(format!("field '{}' ignored: {}", field_name, reason));
                        }
                        FieldCall::NotAField => {}
                    }
                }
            } else if let Some(n) = member.child_by_field_name("name") {
                name = Some(self.text(&n).to_string());
            } else if member.kind() == "shorthand_property_identifier" {
                name = Some(self.text(&member).to_string());
            }

            self.out.behaviors.push(BehaviorMember {
                name,
                span: start..member.end_byte(),
                origin: MemberOrigin::ObjectLiteral,
                is_class_field: false,
            });
        }
    }

    /// Decode `attr('string', {...})`, `@belongsTo('x')` or bare `@attr`.
    fn decode_field_call(&self, expr: &Node) -> FieldCall {
        let (callee, arguments) = match expr.kind() {
            "call_expression" => match expr.child_by_field_name("function") {
                Some(function) => (function, expr.child_by_field_name("arguments")),
                None => return FieldCall::NotAField,
            },
            "identifier" | "member_expression" => (*expr, None),
            _ => return FieldCall::NotAField,
        };

        let Some(kind) = self
            .callee_name(&callee)
            .and_then(|name| FieldKind::from_callee(&name))
        else {
            return FieldCall::NotAField;
        };

        let mut field_type = None;
        let mut options = FieldOptions::new();
        if let Some(arguments) = arguments {
            let mut cursor = arguments.walk();
            let args: Vec<Node> = arguments
                .named_children(&mut cursor)
                .filter(|a| a.kind() != "comment")
                .collect();
            for (index, arg) in args.iter().enumerate() {
                match (index, arg.kind()) {
                    (0, "string") => field_type = Some(unquote(self.text(arg)).to_string()),
                    (0, "template_string") if !self.text(arg).contains("${") => {
                        field_type = Some(unquote(self.text(arg)).to_string())
                    }
                    (0 | 1, "object") if options.is_empty() => {
                        match OptionValue::from_node(arg, self.source) {
                            OptionValue::Object(decoded) => options = decoded,
                            _ => {
                                return FieldCall::Malformed(format!(
                                    "options are not a plain object literal: {}",
                                    self.text(arg)
                                ))
                            }
                        }
                    }
                    _ => {
                        return FieldCall::Malformed(format!(
                            "unsupported argument {}: {}",
                            index + 1,
                            self.text(arg)
                        ))
                    }
                }
            }
        }

        FieldCall::Field {
            kind,
            field_type,
            options,
        }
    }

    /// Name of a callee after following import aliases.
    ///
    /// `attribute` bound by `import { attr as attribute }` yields `attr`;
    /// `DS.attr` yields `attr`.
    fn callee_name(&self, callee: &Node) -> Option<String> {
        match callee.kind() {
            "identifier" => {
                let local = self.text(callee);
                let imported = self.imports.iter().find_map(|import| {
                    import
                        .bindings
                        .iter()
                        .find(|b| b.local == local)
                        .map(|b| b.imported.clone())
                });
                match imported {
                    Some(ImportedName::Named(name)) => Some(name),
                    _ => Some(local.to_string()),
                }
            }
            "member_expression" => callee
                .child_by_field_name("property")
                .map(|p| self.text(&p).to_string()),
            _ => None,
        }
    }
}

/// The expression or declaration an `export default` statement exports.
fn exported_value<'t>(export: &Node<'t>) -> Option<Node<'t>> {
    export
        .child_by_field_name("declaration")
        .or_else(|| export.child_by_field_name("value"))
}

fn has_token(node: &Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Heritage expression of a class (`extends <expr>`), JS or TS grammar.
fn heritage_expression<'t>(class: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = class.walk();
    let heritage = class
        .named_children(&mut cursor)
        .find(|c| c.kind() == "class_heritage")?;

    let mut inner = heritage.walk();
    let first = heritage
        .named_children(&mut inner)
        .find(|c| c.kind() != "comment")?;
    if first.kind() == "extends_clause" {
        first.child_by_field_name("value")
    } else if first.kind() == "implements_clause" {
        None
    } else {
        Some(first)
    }
}

fn leftmost_identifier(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => node_text(node, source).map(str::to_string),
        "member_expression" => leftmost_identifier(&node.child_by_field_name("object")?, source),
        "call_expression" => leftmost_identifier(&node.child_by_field_name("function")?, source),
        "parenthesized_expression" => leftmost_identifier(&node.named_child(0)?, source),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::ingest::{parse, DeclarationKind, FieldKind, MemberOrigin, OptionValue};
    use std::path::Path;

    #[test]
    fn test_class_heritage_with_mixins() {
        let source = r#"import BaseModel from './base-model';
import Timestamped from '../mixins/timestamped';
import Auditable from '../mixins/auditable';
import { attr } from '@ember-data/model';

export default class Post extends BaseModel.extend(Timestamped, Auditable) {
  @attr title;
}
"#;
        let parsed = parse(Path::new("/p/app/models/post.js"), source).unwrap();
        let decl = parsed.declaration.unwrap();
        assert_eq!(decl.base.as_deref(), Some("BaseModel"));
        assert_eq!(decl.mixins, vec!["Timestamped", "Auditable"]);
        assert_eq!(parsed.fields.len(), 1);
        assert_eq!(parsed.fields[0].field_type, None);
        assert!(parsed.behaviors.is_empty());
    }

    #[test]
    fn test_mixin_create_through_const() {
        let source = r#"import Mixin from '@ember/object/mixin';
import { attr, belongsTo } from '@ember-data/model';
import Auditable from './auditable';

const Timestamped = Mixin.create(Auditable, {
  createdAt: attr('date'),
  owner: belongsTo('user', { async: false }),

  // Age in days
  age() {
    return 1;
  },
  label: 'ts'
});

export default Timestamped;
"#;
        let parsed = parse(Path::new("/p/app/mixins/timestamped.js"), source).unwrap();
        let decl = parsed.declaration.as_ref().unwrap();
        assert_eq!(decl.kind, DeclarationKind::MixinCreate);
        assert_eq!(decl.name.as_deref(), Some("Timestamped"));
        assert_eq!(decl.mixins, vec!["Auditable"]);
        assert_eq!(decl.statement_spans.len(), 2);
        assert!(parsed.retained_statements.is_empty());

        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[0].kind, FieldKind::Attribute);
        assert_eq!(parsed.fields[1].name, "owner");

        assert_eq!(parsed.behaviors.len(), 2);
        assert!(parsed
            .text(&parsed.behaviors[0].span)
            .unwrap()
            .starts_with("// Age in days"));
        assert_eq!(parsed.behaviors[0].origin, MemberOrigin::ObjectLiteral);
        assert_eq!(parsed.text(&parsed.behaviors[1].span), Some("label: 'ts'"));
    }

    #[test]
    fn test_classic_extend_model() {
        let source = r#"import DS from 'ember-data';

export default DS.Model.extend({
  name: DS.attr('string'),
  tags: DS.hasMany('tag')
});
"#;
        let parsed = parse(Path::new("/p/app/models/item.js"), source).unwrap();
        let decl = parsed.declaration.unwrap();
        assert_eq!(decl.kind, DeclarationKind::Extend);
        assert_eq!(decl.base.as_deref(), Some("DS"));
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[1].kind, FieldKind::HasMany);
        assert!(parsed.behaviors.is_empty());
    }

    #[test]
    fn test_aliased_field_import() {
        let source = r#"import { attr as attribute } from '@ember-data/model';
import Model from '@ember-data/model';
export default class Note extends Model {
  @attribute('string', { defaultValue: 'x' }) body;
}
"#;
        let parsed = parse(Path::new("/p/app/models/note.js"), source).unwrap();
        assert_eq!(parsed.fields.len(), 1);
        assert_eq!(parsed.fields[0].kind, FieldKind::Attribute);
        assert_eq!(
            parsed.fields[0].options.get("defaultValue"),
            Some(&OptionValue::String("x".to_string()))
        );
    }

    #[test]
    fn test_malformed_field_is_kept_as_behavior() {
        let source = r#"import Model, { attr } from '@ember-data/model';
const TRANSFORM = 'string';
export default class Odd extends Model {
  @attr(TRANSFORM) name;
}
"#;
        let parsed = parse(Path::new("/p/app/models/odd.js"), source).unwrap();
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("name"));
        assert_eq!(parsed.behaviors.len(), 1);
        assert!(parsed.behaviors[0].is_class_field);
        assert_eq!(
            parsed.text(&parsed.behaviors[0].span),
            Some("@attr(TRANSFORM) name")
        );
        assert_eq!(parsed.retained_statements.len(), 1);
    }

    #[test]
    fn test_typescript_members_and_retained_types() {
        let source = r#"import Model, { attr, hasMany } from '@ember-data/model';
import { service } from '@ember/service';

export interface UserMeta {
  score: number;
}

export default class User extends Model {
  @attr('string') declare name: string;
  @hasMany('post', { async: true, inverse: 'author' }) declare posts: unknown;
  @service declare store: unknown;

  @action
  refresh(): void {}
}
"#;
        let parsed = parse(Path::new("/p/app/models/user.ts"), source).unwrap();
        let names: Vec<&str> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "posts"]);
        assert_eq!(parsed.behaviors.len(), 2);
        assert!(parsed.behaviors[0].is_class_field);
        assert_eq!(parsed.behaviors[0].name.as_deref(), Some("store"));
        let method = parsed.text(&parsed.behaviors[1].span).unwrap();
        assert!(method.starts_with("@action"));
        assert!(method.ends_with("refresh(): void {}"));
        assert_eq!(parsed.retained_statements.len(), 1);
        assert!(parsed
            .text(&parsed.retained_statements[0])
            .unwrap()
            .starts_with("export interface UserMeta"));
    }
}
