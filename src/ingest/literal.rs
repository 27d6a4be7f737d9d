//! Literal values captured from field options.
//!
//! Options such as `{ async: false, inverse: 'owner' }` are decoded once into
//! a closed value tree. Anything that is not a plain literal is kept as the
//! verbatim source text of the expression.

use serde::{Deserialize, Serialize};

use crate::common::{node_text, unquote};

/// A JavaScript literal (or verbatim expression) from a field call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    Null,
    Bool(bool),
    /// Number kept as written (`1`, `0.5`, `1e3`)
    Number(String),
    /// String contents without quotes, escapes left as written
    String(String),
    Array(Vec<OptionValue>),
    Object(FieldOptions),
    /// Any other expression, as source text
    Raw(String),
}

impl OptionValue {
    /// Decode a tree-sitter expression node.
    pub fn from_node(node: &tree_sitter::Node, source: &str) -> OptionValue {
        let text = node_text(node, source).unwrap_or_default();
        match node.kind() {
            "null" => OptionValue::Null,
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            "number" => OptionValue::Number(text.to_string()),
            "string" => OptionValue::String(unquote(text).to_string()),
            "template_string" if !text.contains("${") => {
                OptionValue::String(unquote(text).to_string())
            }
            "array" => {
                let mut cursor = node.walk();
                let items = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .map(|child| OptionValue::from_node(&child, source))
                    .collect();
                OptionValue::Array(items)
            }
            "object" => match FieldOptions::from_object_node(node, source) {
                Some(options) => OptionValue::Object(options),
                None => OptionValue::Raw(text.to_string()),
            },
            "parenthesized_expression" => match node.named_child(0) {
                Some(inner) => OptionValue::from_node(&inner, source),
                None => OptionValue::Raw(text.to_string()),
            },
            _ => OptionValue::Raw(text.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array of plain strings
    pub fn strings<I, S>(items: I) -> OptionValue
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionValue::Array(items.into_iter().map(|s| OptionValue::String(s.into())).collect())
    }
}

/// Ordered key → value map of field options.
///
/// Insertion order is the source order, which keeps generated descriptors
/// stable and diff-friendly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions(Vec<(String, OptionValue)>);

impl FieldOptions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode an `object` node. Returns None when the object contains
    /// members that are not plain `key: value` pairs (spread, methods,
    /// shorthand, computed keys); the caller keeps those verbatim.
    pub fn from_object_node(node: &tree_sitter::Node, source: &str) -> Option<FieldOptions> {
        let mut options = FieldOptions::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "comment" => continue,
                "pair" => {
                    let key_node = child.child_by_field_name("key")?;
                    let key = match key_node.kind() {
                        "property_identifier" | "number" => node_text(&key_node, source)?,
                        "string" => unquote(node_text(&key_node, source)?),
                        _ => return None,
                    };
                    let value_node = child.child_by_field_name("value")?;
                    options.insert(key, OptionValue::from_node(&value_node, source));
                }
                _ => return None,
            }
        }
        Some(options)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Layer `overrides` on top of `self`; explicit keys win.
    pub fn merged_with(mut self, overrides: &FieldOptions) -> FieldOptions {
        for (key, value) in overrides.iter() {
            self.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, OptionValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
