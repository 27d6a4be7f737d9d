//! Common utility functions shared across the pipeline stages
//!
//! Bounds-checked slicing over tree-sitter byte offsets and the small set of
//! naming conversions used to derive schema, trait and extension names.

/// Safely extract a UTF-8 string slice with bounds checking
///
/// Returns None if the slice range is invalid, exceeds source length,
/// or does not fall on UTF-8 character boundaries.
pub fn safe_str_slice(source: &str, start: usize, end: usize) -> Option<&str> {
    if start <= end && end <= source.len() {
        source.get(start..end)
    } else {
        None
    }
}

/// Text of a tree-sitter node, or None when the span is not valid UTF-8
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> Option<&'a str> {
    safe_str_slice(source, node.start_byte(), node.end_byte())
}

/// Convert an identifier or file stem into dasherized lower case
///
/// - "UserProfile" → "user-profile"
/// - "userProfile" → "user-profile"
/// - "user_profile" → "user-profile"
/// - "HTTPRequest" → "http-request"
pub fn dasherize(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = if i > 0 { chars.get(i - 1).copied() } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('-') && !out.ends_with('/') {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out.trim_matches('-').to_string()
}

/// Convert a dasherized (optionally slash-nested) name into PascalCase
///
/// - "user-profile" → "UserProfile"
/// - "admin/user" → "AdminUser"
pub fn pascal_case(input: &str) -> String {
    input
        .split(|c: char| c == '-' || c == '_' || c == '/' || c == '.' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Strip the surrounding quotes from a JavaScript string literal
pub fn unquote(literal: &str) -> &str {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' || first == b'"' || first == b'`') && first == last {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}

/// Whether `text` contains `ident` as a whole JavaScript identifier
///
/// Used to decide whether an import binding is still referenced by
/// retained code. Property accesses (`this.ident`) count as references,
/// which keeps the check conservative.
pub fn contains_identifier(text: &str, ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    let is_ident_char = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(ident) {
        let start = search_from + pos;
        let end = start + ident.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map(|c| !is_ident_char(c))
            .unwrap_or(true);
        let after_ok = text[end..]
            .chars()
            .next()
            .map(|c| !is_ident_char(c))
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        search_from = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dasherize() {
        assert_eq!(dasherize("UserProfile"), "user-profile");
        assert_eq!(dasherize("userProfile"), "user-profile");
        assert_eq!(dasherize("user_profile"), "user-profile");
        assert_eq!(dasherize("user-profile"), "user-profile");
        assert_eq!(dasherize("HTTPRequest"), "http-request");
        assert_eq!(dasherize("timestamped"), "timestamped");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("user-profile"), "UserProfile");
        assert_eq!(pascal_case("admin/user"), "AdminUser");
        assert_eq!(pascal_case("user"), "User");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("abc"), "abc");
        assert_eq!(unquote("'"), "'");
    }

    #[test]
    fn test_contains_identifier_respects_word_boundaries() {
        assert!(contains_identifier("return formatDate(x);", "formatDate"));
        assert!(!contains_identifier("return formatDateTime(x);", "formatDate"));
        assert!(!contains_identifier("return myformatDate(x);", "formatDate"));
        assert!(contains_identifier("computed('a', fn)", "computed"));
        assert!(!contains_identifier("", "x"));
    }

    #[test]
    fn test_safe_str_slice_rejects_char_boundary() {
        let s = "a🚀b";
        assert_eq!(safe_str_slice(s, 0, 1), Some("a"));
        assert_eq!(safe_str_slice(s, 1, 2), None);
        assert_eq!(safe_str_slice(s, 0, 100), None);
    }
}
