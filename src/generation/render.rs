//! JavaScript literal rendering for generated descriptors.
//!
//! Output is deterministic: keys keep insertion order, scalar arrays stay on
//! one line, nested objects are indented two spaces per level.

use crate::ingest::{FieldOptions, OptionValue};

const INDENT: &str = "  ";

/// Render a value as JavaScript source at the given nesting depth.
pub fn render_value(value: &OptionValue, depth: usize) -> String {
    match value {
        OptionValue::Null => "null".to_string(),
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Number(n) => n.clone(),
        OptionValue::String(s) => quote(s),
        OptionValue::Raw(text) => text.clone(),
        OptionValue::Array(items) => render_array(items, depth),
        OptionValue::Object(options) => render_object(options, depth),
    }
}

/// Render an ordered object literal.
pub fn render_object(options: &FieldOptions, depth: usize) -> String {
    if options.is_empty() {
        return "{}".to_string();
    }
    let inner = INDENT.repeat(depth + 1);
    let mut out = String::from("{\n");
    for (key, value) in options.iter() {
        out.push_str(&inner);
        out.push_str(&render_key(key));
        out.push_str(": ");
        out.push_str(&render_value(value, depth + 1));
        out.push_str(",\n");
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
    out
}

fn render_array(items: &[OptionValue], depth: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let nested = items
        .iter()
        .any(|item| matches!(item, OptionValue::Object(_) | OptionValue::Array(_)));
    if !nested {
        let parts: Vec<String> = items.iter().map(|item| render_value(item, depth)).collect();
        return format!("[{}]", parts.join(", "));
    }
    let inner = INDENT.repeat(depth + 1);
    let mut out = String::from("[\n");
    for item in items {
        out.push_str(&inner);
        out.push_str(&render_value(item, depth + 1));
        out.push_str(",\n");
    }
    out.push_str(&INDENT.repeat(depth));
    out.push(']');
    out
}

/// Object key, quoted only when it is not a plain identifier
pub fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Quote string contents that were captured with escapes left as written.
pub fn quote(contents: &str) -> String {
    if !contents.contains('\'') {
        return format!("'{}'", contents);
    }
    if !contents.contains('"') {
        return format!("\"{}\"", contents);
    }
    let mut out = String::with_capacity(contents.len() + 4);
    out.push('\'');
    let mut escaped = false;
    for c in contents.chars() {
        if c == '\'' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out.push('\'');
    out
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
