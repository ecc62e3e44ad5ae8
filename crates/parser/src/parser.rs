use crate::language::Language;
use crate::parsed::ParsedFile;
use crate::strategies::{
    LineScanStrategy, PythonStrategy, RustStrategy, SpanStrategy, TypeScriptStrategy,
};
use std::path::Path;

/// Entry point of the parsing collaborator.
///
/// Stateless: a fresh tree-sitter parser is created per file, so the type
/// is cheap to construct and freely shareable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl SourceParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Detect the language for a path, `None` for unsupported files.
    #[must_use]
    pub fn detect_language(&self, path: impl AsRef<Path>) -> Option<Language> {
        Language::from_path(path)
    }

    /// Parse one file into raw spans, imports and exports.
    ///
    /// Parsing never fails hard: grammar problems are reported through
    /// `ParsedFile::errors` and yield an otherwise empty result.
    #[must_use]
    pub fn parse_file(&self, path: &str, content: &str, language: Language) -> ParsedFile {
        let mut out = ParsedFile::empty(path, language.as_str());

        match language {
            Language::TypeScript | Language::JavaScript => {
                TypeScriptStrategy::new(language).extract(content, &mut out);
            }
            Language::Python => PythonStrategy.extract(content, &mut out),
            Language::Rust => RustStrategy.extract(content, &mut out),
            Language::Go | Language::Java => {
                LineScanStrategy::new(language).extract(content, &mut out);
            }
        }

        if !out.errors.is_empty() {
            log::warn!(
                "parsed {path} with {} issue(s): {}",
                out.errors.len(),
                out.errors[0].message
            );
        }
        out
    }
}
