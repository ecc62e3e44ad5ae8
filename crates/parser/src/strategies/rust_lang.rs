use super::{node_text, span_of, SpanStrategy};
use crate::language::Language;
use crate::parsed::{ExportRecord, ImportRecord, ParseIssue, ParsedFile};
use tree_sitter::Node;

/// Rust span extraction: items, impl-block functions, use declarations.
/// `pub` items are reported as exports.
pub(crate) struct RustStrategy;

const ITEM_KINDS: &[&str] = &[
    "function_item",
    "struct_item",
    "enum_item",
    "trait_item",
    "union_item",
    "const_item",
    "static_item",
    "type_item",
];

impl RustStrategy {
    fn collect_item(node: Node, content: &str, out: &mut ParsedFile) {
        out.entities.push(span_of(node, content));

        if is_public(node) {
            if let Some(name) = node.child_by_field_name("name") {
                out.exports.push(ExportRecord {
                    names: vec![node_text(name, content)],
                    source: None,
                });
            }
        }
    }

    fn collect_impl(node: Node, content: &str, out: &mut ParsedFile) {
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() == "function_item" {
                    out.entities.push(span_of(member, content));
                }
            }
        }
    }

    fn collect_use(node: Node, content: &str, out: &mut ParsedFile) {
        let statement = node_text(node, content);
        if let Some(argument) = node.child_by_field_name("argument") {
            out.imports.push(ImportRecord {
                source: node_text(argument, content),
                specifiers: Vec::new(),
                statement,
                type_only: false,
            });
        }
    }
}

fn is_public(node: Node) -> bool {
    let mut cursor = node.walk();
    let has_visibility = node
        .children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier");
    has_visibility
}

impl SpanStrategy for RustStrategy {
    fn extract(&self, content: &str, out: &mut ParsedFile) {
        let Some(rust_lang) = Language::Rust.tree_sitter_language() else {
            return;
        };
        let mut parser = tree_sitter::Parser::new();
        if parser.set_language(&rust_lang).is_err() {
            out.errors.push(ParseIssue {
                message: "failed to load rust grammar".into(),
                line: None,
            });
            return;
        }
        let Some(tree) = parser.parse(content, None) else {
            out.errors.push(ParseIssue {
                message: "tree-sitter returned no tree".into(),
                line: None,
            });
            return;
        };

        let root = tree.root_node();
        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            match node.kind() {
                kind if ITEM_KINDS.contains(&kind) => Self::collect_item(node, content, out),
                "impl_item" => Self::collect_impl(node, content, out),
                "use_declaration" => Self::collect_use(node, content, out),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedFile {
        let mut out = ParsedFile::empty("test.rs", "rust");
        RustStrategy.extract(content, &mut out);
        out
    }

    #[test]
    fn extracts_items_and_impl_functions() {
        let out = parse(
            "pub struct Widget { id: u32 }\n\n\
             impl Widget {\n    fn render(&self) -> u32 { self.id }\n}\n\n\
             fn helper() {}\n",
        );

        let texts: Vec<&str> = out.entities.iter().map(|e| e.text.as_str()).collect();
        assert!(texts.iter().any(|t| t.starts_with("pub struct Widget")));
        assert!(texts.iter().any(|t| t.starts_with("fn render")));
        assert!(texts.iter().any(|t| t.starts_with("fn helper")));
    }

    #[test]
    fn pub_items_are_exported() {
        let out = parse("pub fn api() {}\nfn private() {}\n");
        let exported: Vec<&str> = out
            .exports
            .iter()
            .flat_map(|e| e.names.iter().map(String::as_str))
            .collect();
        assert_eq!(exported, vec!["api"]);
    }

    #[test]
    fn use_declarations_become_imports() {
        let out = parse("use std::collections::HashMap;\nuse crate::auth::login;\n");
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.imports[0].source, "std::collections::HashMap");
        assert_eq!(out.imports[1].source, "crate::auth::login");
    }
}
