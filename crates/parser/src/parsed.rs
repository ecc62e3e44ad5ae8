use serde::{Deserialize, Serialize};

/// One raw entity span: the text of a top-level definition plus its line
/// range (1-based, inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// An import statement as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Module path string, e.g. `./auth` or `lodash`.
    pub source: String,
    /// Imported names, empty for side-effect imports.
    #[serde(default)]
    pub specifiers: Vec<String>,
    /// The full statement text, kept for path-shape matching downstream.
    pub statement: String,
    #[serde(default)]
    pub type_only: bool,
}

/// An export marker: names this file makes visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(default)]
    pub names: Vec<String>,
    /// Re-export source, if any (`export { x } from './other'`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Non-fatal problem encountered while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Result of parsing one file.
///
/// Entities are raw text spans; extracting structure from them is the
/// graph builder's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub file_path: String,
    pub language: String,
    pub entities: Vec<EntitySpan>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
    pub errors: Vec<ParseIssue>,
}

impl ParsedFile {
    #[must_use]
    pub fn empty(file_path: impl Into<String>, language: &'static str) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.to_string(),
            entities: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            errors: Vec::new(),
        }
    }
}
