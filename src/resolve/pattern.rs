//! One-wildcard specifier patterns for additional source mappings.
//!
//! A pattern such as `shared/*/models` matches `shared/billing/models/invoice`
//! with capture `billing` and remainder `invoice`. A pattern without a
//! wildcard is a plain prefix that must end on a segment boundary.

use std::path::{Path, PathBuf};

/// Result of matching a specifier against a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Text captured by the wildcard (a single path segment)
    pub capture: Option<String>,
    /// Specifier text after the matched portion, without leading `/`
    pub rest: String,
}

/// Match `specifier` against `pattern`.
pub fn match_pattern(pattern: &str, specifier: &str) -> Option<PatternMatch> {
    let pattern = pattern.trim_end_matches('/');
    match pattern.split_once('*') {
        None => {
            let rest = strip_segment_prefix(specifier, pattern)?;
            Some(PatternMatch {
                capture: None,
                rest: rest.to_string(),
            })
        }
        Some((prefix, suffix)) => {
            let tail = specifier.strip_prefix(prefix)?;
            // Wildcard captures exactly one non-empty segment
            let segment_end = tail.find('/').unwrap_or(tail.len());
            let capture = &tail[..segment_end];
            if capture.is_empty() {
                return None;
            }
            let after = &tail[segment_end..];
            let rest = if suffix.is_empty() {
                after.trim_start_matches('/')
            } else {
                strip_segment_prefix(after, suffix)?
            };
            Some(PatternMatch {
                capture: Some(capture.to_string()),
                rest: rest.to_string(),
            })
        }
    }
}

/// Apply a match to a directory template.
///
/// The capture replaces the template's `*`; a template without `*` receives
/// the capture as an extra trailing segment. The remainder is joined last.
pub fn expand_template(template: &Path, matched: &PatternMatch) -> PathBuf {
    let text = template.to_string_lossy();
    let mut base = match (&matched.capture, text.contains('*')) {
        (Some(capture), true) => PathBuf::from(text.replacen('*', capture, 1)),
        (Some(capture), false) => template.join(capture),
        (None, _) => template.to_path_buf(),
    };
    if !matched.rest.is_empty() {
        base.push(&matched.rest);
    }
    base
}

/// `text` minus `prefix`, only when `prefix` ends on a `/` boundary.
fn strip_segment_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let tail = text.strip_prefix(prefix)?;
    if tail.is_empty() {
        Some(tail)
    } else {
        tail.strip_prefix('/')
    }
}
