use super::{node_text, span_of, strip_quotes, SpanStrategy};
use crate::language::Language;
use crate::parsed::{ExportRecord, ImportRecord, ParseIssue, ParsedFile};
use tree_sitter::Node;

/// TypeScript/JavaScript span extraction.
///
/// Collects top-level declarations, class methods, import statements and
/// export markers. The grammar is picked by the language this strategy is
/// constructed for.
pub(crate) struct TypeScriptStrategy {
    language: Language,
}

const DECLARATION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "lexical_declaration",
    "variable_declaration",
];

impl TypeScriptStrategy {
    pub(crate) fn new(language: Language) -> Self {
        Self { language }
    }

    fn collect_declaration(node: Node, content: &str, out: &mut ParsedFile) {
        out.entities.push(span_of(node, content));

        // Class methods become their own spans so call extraction can see
        // their bodies individually.
        if matches!(node.kind(), "class_declaration" | "abstract_class_declaration") {
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for member in body.children(&mut cursor) {
                    if member.kind() == "method_definition" {
                        out.entities.push(span_of(member, content));
                    }
                }
            }
        }
    }

    fn collect_import(node: Node, content: &str, out: &mut ParsedFile) {
        let statement = node_text(node, content);
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let source = strip_quotes(&node_text(source, content));

        let mut specifiers = Vec::new();
        collect_identifiers(node, content, &mut specifiers, &["import_clause"]);

        out.imports.push(ImportRecord {
            source,
            specifiers,
            type_only: statement.trim_start().starts_with("import type"),
            statement,
        });
    }

    fn collect_export(node: Node, content: &str, out: &mut ParsedFile) {
        let mut names = Vec::new();

        if let Some(declaration) = node.child_by_field_name("declaration") {
            Self::collect_declaration(declaration, content, out);
            if let Some(name) = declaration.child_by_field_name("name") {
                names.push(node_text(name, content));
            } else {
                // const/let declarations hold names one level down.
                let mut cursor = declaration.walk();
                for declarator in declaration.children(&mut cursor) {
                    if declarator.kind() == "variable_declarator" {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            names.push(node_text(name, content));
                        }
                    }
                }
            }
        } else {
            collect_identifiers(node, content, &mut names, &["export_clause"]);
        }

        let source = node
            .child_by_field_name("source")
            .map(|source| strip_quotes(&node_text(source, content)));

        out.exports.push(ExportRecord { names, source });
    }
}

/// Gather identifier-like leaves under the given container kinds.
fn collect_identifiers(node: Node, content: &str, names: &mut Vec<String>, containers: &[&str]) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if containers.contains(&child.kind()) {
            gather_identifier_leaves(child, content, names);
        } else {
            collect_identifiers(child, content, names, containers);
        }
    }
}

fn gather_identifier_leaves(node: Node, content: &str, names: &mut Vec<String>) {
    if matches!(node.kind(), "identifier" | "type_identifier") {
        names.push(node_text(node, content));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        gather_identifier_leaves(child, content, names);
    }
}

impl SpanStrategy for TypeScriptStrategy {
    fn extract(&self, content: &str, out: &mut ParsedFile) {
        let Some(ts_lang) = self.language.tree_sitter_language() else {
            return;
        };
        let mut parser = tree_sitter::Parser::new();
        if parser.set_language(&ts_lang).is_err() {
            out.errors.push(ParseIssue {
                message: format!("failed to load {} grammar", self.language.as_str()),
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
                kind if DECLARATION_KINDS.contains(&kind) => {
                    Self::collect_declaration(node, content, out);
                }
                "import_statement" => Self::collect_import(node, content, out),
                "export_statement" => Self::collect_export(node, content, out),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedFile {
        let mut out = ParsedFile::empty("test.ts", "typescript");
        TypeScriptStrategy::new(Language::TypeScript).extract(content, &mut out);
        out
    }

    #[test]
    fn extracts_top_level_declarations() {
        let out = parse(
            "function foo() { return 1; }\n\
             class Widget {\n  render() { return foo(); }\n}\n\
             interface Shape { area(): number; }\n\
             const LIMIT = 10;\n",
        );

        assert!(out.errors.is_empty());
        let texts: Vec<&str> = out.entities.iter().map(|e| e.text.as_str()).collect();
        assert!(texts.iter().any(|t| t.starts_with("function foo")));
        assert!(texts.iter().any(|t| t.starts_with("class Widget")));
        assert!(texts.iter().any(|t| t.starts_with("render()")));
        assert!(texts.iter().any(|t| t.starts_with("interface Shape")));
        assert!(texts.iter().any(|t| t.starts_with("const LIMIT")));

        let foo = out
            .entities
            .iter()
            .find(|e| e.text.starts_with("function foo"))
            .unwrap();
        assert_eq!(foo.start_line, 1);
    }

    #[test]
    fn extracts_imports_with_specifiers() {
        let out = parse(
            "import { login, logout } from './auth';\n\
             import lodash from 'lodash';\n\
             import './side-effect';\n",
        );

        assert_eq!(out.imports.len(), 3);
        assert_eq!(out.imports[0].source, "./auth");
        assert_eq!(out.imports[0].specifiers, vec!["login", "logout"]);
        assert_eq!(out.imports[1].source, "lodash");
        assert_eq!(out.imports[2].source, "./side-effect");
        assert!(out.imports[2].specifiers.is_empty());
    }

    #[test]
    fn extracts_exported_declarations() {
        let out = parse("export function handler() {}\nexport { helper } from './util';\n");

        assert!(out
            .entities
            .iter()
            .any(|e| e.text.contains("function handler")));
        assert!(out
            .exports
            .iter()
            .any(|e| e.names.contains(&"handler".to_string())));
        assert!(out
            .exports
            .iter()
            .any(|e| e.source.as_deref() == Some("./util")));
    }
}
