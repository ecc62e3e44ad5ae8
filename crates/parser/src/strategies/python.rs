use super::{node_text, span_of, SpanStrategy};
use crate::language::Language;
use crate::parsed::{ImportRecord, ParseIssue, ParsedFile};
use tree_sitter::Node;

/// Python span extraction: top-level defs, classes with their methods,
/// module-level assignments and both import statement forms.
pub(crate) struct PythonStrategy;

impl PythonStrategy {
    fn collect_definition(node: Node, content: &str, out: &mut ParsedFile) {
        out.entities.push(span_of(node, content));

        if node.kind() == "class_definition" {
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for member in body.children(&mut cursor) {
                    let target = unwrap_decorated(member);
                    if target.kind() == "function_definition" {
                        out.entities.push(span_of(target, content));
                    }
                }
            }
        }
    }

    fn collect_import(node: Node, content: &str, out: &mut ParsedFile) {
        let statement = node_text(node, content);

        match node.kind() {
            "import_from_statement" => {
                let Some(module) = node.child_by_field_name("module_name") else {
                    return;
                };
                let source = node_text(module, content);
                let mut specifiers = Vec::new();
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "dotted_name" && child.id() != module.id() {
                        specifiers.push(node_text(child, content));
                    }
                    if child.kind() == "aliased_import" {
                        if let Some(name) = child.child_by_field_name("name") {
                            specifiers.push(node_text(name, content));
                        }
                    }
                }
                out.imports.push(ImportRecord {
                    source,
                    specifiers,
                    statement,
                    type_only: false,
                });
            }
            "import_statement" => {
                // `import os, sys` carries one record per module.
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    let module = match child.kind() {
                        "dotted_name" => Some(child),
                        "aliased_import" => child.child_by_field_name("name"),
                        _ => None,
                    };
                    if let Some(module) = module {
                        out.imports.push(ImportRecord {
                            source: node_text(module, content),
                            specifiers: Vec::new(),
                            statement: statement.clone(),
                            type_only: false,
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn unwrap_decorated(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        if let Some(definition) = node.child_by_field_name("definition") {
            return definition;
        }
    }
    node
}

impl SpanStrategy for PythonStrategy {
    fn extract(&self, content: &str, out: &mut ParsedFile) {
        let Some(py_lang) = Language::Python.tree_sitter_language() else {
            return;
        };
        let mut parser = tree_sitter::Parser::new();
        if parser.set_language(&py_lang).is_err() {
            out.errors.push(ParseIssue {
                message: "failed to load python grammar".into(),
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
        for child in root.children(&mut cursor) {
            let node = unwrap_decorated(child);
            match node.kind() {
                "function_definition" | "class_definition" => {
                    Self::collect_definition(node, content, out);
                }
                "import_statement" | "import_from_statement" => {
                    Self::collect_import(node, content, out);
                }
                "expression_statement" => {
                    // Module-level assignment, e.g. `DEFAULTS = {...}`.
                    let mut inner = node.walk();
                    if node
                        .children(&mut inner)
                        .any(|c| c.kind() == "assignment")
                    {
                        out.entities.push(span_of(node, content));
                    }
                }
                _ => {}
            }
        }
    }
}
