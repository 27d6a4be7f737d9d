//! Thread-local parser pool for reusing tree-sitter Parser instances.
//!
//! The parse-all stage may run on a rayon pool; each worker thread lazily
//! creates one parser per grammar and reuses it for every file it handles.
//! RefCell provides single-threaded mutable access, so no locks are taken.

use crate::ingest::Language;
use anyhow::Result;
use std::cell::RefCell;

thread_local! {
    static JAVASCRIPT_PARSER: RefCell<Option<tree_sitter::Parser>> = RefCell::new(None);
    static TYPESCRIPT_PARSER: RefCell<Option<tree_sitter::Parser>> = RefCell::new(None);
}

fn grammar(language: Language) -> tree_sitter::Language {
    match language {
        Language::JavaScript => tree_sitter_javascript::language(),
        Language::TypeScript => tree_sitter_typescript::language_typescript(),
    }
}

fn with_pooled_parser<F, R>(
    cell: &'static std::thread::LocalKey<RefCell<Option<tree_sitter::Parser>>>,
    language: Language,
    f: F,
) -> Result<R>
where
    F: FnOnce(&mut tree_sitter::Parser) -> R,
{
    cell.with(|parser_cell| {
        let mut parser_ref = parser_cell.borrow_mut();
        if parser_ref.is_none() {
            let mut parser = tree_sitter::Parser::new();
            parser.set_language(&grammar(language))?;
            *parser_ref = Some(parser);
        }
        let parser = parser_ref
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("{} parser failed to initialize", language))?;
        Ok(f(parser))
    })
}

/// Execute a function with a thread-local parser for the given language.
///
/// # Example
///
/// ```rust
/// use schema_migrate::ingest::pool::with_parser;
/// use schema_migrate::ingest::Language;
///
/// let has_tree = with_parser(Language::JavaScript, |parser| {
///     parser.parse("export default {};", None).is_some()
/// }).unwrap();
/// assert!(has_tree);
/// ```
pub fn with_parser<F, R>(language: Language, f: F) -> Result<R>
where
    F: FnOnce(&mut tree_sitter::Parser) -> R,
{
    match language {
        Language::JavaScript => with_pooled_parser(&JAVASCRIPT_PARSER, language, f),
        Language::TypeScript => with_pooled_parser(&TYPESCRIPT_PARSER, language, f),
    }
}
