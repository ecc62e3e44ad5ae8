//! # Atlas Parser
//!
//! Turns source text into raw entity spans, imports and exports.
//!
//! ## Pipeline position
//!
//! ```text
//! file content
//!     │
//!     ├──> Language detection (extension table)
//!     │
//!     └──> SpanStrategy (per language)
//!            ├─ Tree-sitter grammars: TypeScript, JavaScript, Python, Rust
//!            ├─ Line scan fallback: Go, Java
//!            └─> ParsedFile { entity spans, imports, exports, errors }
//! ```
//!
//! Spans are raw text with line ranges, not structured ASTs. Inferring
//! entity kind, names and relationships from them is the graph builder's
//! job, which keeps this crate swappable for a real AST extractor.

mod language;
mod parsed;
mod parser;
mod strategies;

pub use language::Language;
pub use parsed::{EntitySpan, ExportRecord, ImportRecord, ParseIssue, ParsedFile};
pub use parser::SourceParser;
