//! Per-language span extraction strategies.
//!
//! Each strategy turns file content into raw [`EntitySpan`]s plus
//! import/export records. Tree-sitter backed strategies exist for the
//! grammars the workspace carries; everything else goes through the
//! line-scan fallback.

mod line_scan;
mod python;
mod rust_lang;
mod typescript;

pub(crate) use line_scan::LineScanStrategy;
pub(crate) use python::PythonStrategy;
pub(crate) use rust_lang::RustStrategy;
pub(crate) use typescript::TypeScriptStrategy;

use crate::parsed::{EntitySpan, ParsedFile};
use tree_sitter::Node;

/// Extraction seam: swap an implementation without touching the
/// graph-building orchestration.
pub(crate) trait SpanStrategy {
    fn extract(&self, content: &str, out: &mut ParsedFile);
}

pub(crate) fn node_text(node: Node, content: &str) -> String {
    node.utf8_text(content.as_bytes())
        .unwrap_or_default()
        .to_string()
}

/// Span covering the node, with 1-based inclusive line numbers.
pub(crate) fn span_of(node: Node, content: &str) -> EntitySpan {
    EntitySpan {
        text: node_text(node, content),
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
    }
}

pub(crate) fn strip_quotes(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '\'' || c == '"' || c == '`')
        .to_string()
}
