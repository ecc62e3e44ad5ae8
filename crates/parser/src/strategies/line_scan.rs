use super::{strip_quotes, SpanStrategy};
use crate::language::Language;
use crate::parsed::{EntitySpan, ImportRecord, ParsedFile};

/// Keyword-prefix line scanner for languages without a wired grammar
/// (Go, Java). Spans run from a keyword line to the matching close brace.
pub(crate) struct LineScanStrategy {
    language: Language,
}

impl LineScanStrategy {
    pub(crate) fn new(language: Language) -> Self {
        Self { language }
    }

    fn starts_definition(&self, line: &str) -> bool {
        let prefixes: &[&str] = match self.language {
            Language::Go => &["func ", "type ", "const ", "var "],
            Language::Java => &[
                "public ",
                "private ",
                "protected ",
                "class ",
                "interface ",
                "enum ",
                "abstract ",
            ],
            _ => &[],
        };
        prefixes.iter().any(|p| line.starts_with(p))
    }

    fn starts_import(&self, line: &str) -> bool {
        line.starts_with("import ") || line.starts_with("import(")
    }
}

impl SpanStrategy for LineScanStrategy {
    fn extract(&self, content: &str, out: &mut ParsedFile) {
        let lines: Vec<&str> = content.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();

            if self.starts_import(trimmed) {
                // Go block imports span multiple lines: import ( ... )
                if trimmed.contains('(') && !trimmed.contains(')') {
                    let mut j = i + 1;
                    while j < lines.len() && !lines[j].contains(')') {
                        let entry = strip_quotes(lines[j].trim());
                        if !entry.is_empty() {
                            out.imports.push(ImportRecord {
                                source: entry,
                                specifiers: Vec::new(),
                                statement: lines[j].trim().to_string(),
                                type_only: false,
                            });
                        }
                        j += 1;
                    }
                    i = j + 1;
                    continue;
                }

                let rest = trimmed.trim_start_matches("import").trim();
                let source = strip_quotes(rest.trim_end_matches(';'));
                if !source.is_empty() {
                    out.imports.push(ImportRecord {
                        source,
                        specifiers: Vec::new(),
                        statement: trimmed.to_string(),
                        type_only: false,
                    });
                }
                i += 1;
                continue;
            }

            if self.starts_definition(trimmed) {
                let start = i;
                let mut depth = 0i32;
                let mut saw_brace = false;
                let mut end = i;

                for (j, line) in lines.iter().enumerate().skip(i) {
                    for ch in line.chars() {
                        match ch {
                            '{' => {
                                depth += 1;
                                saw_brace = true;
                            }
                            '}' => depth -= 1,
                            _ => {}
                        }
                    }
                    end = j;
                    if saw_brace && depth <= 0 {
                        break;
                    }
                    // Braceless definition (e.g. `var x = 1`) ends on its line.
                    if !saw_brace && j == i {
                        break;
                    }
                }

                out.entities.push(EntitySpan {
                    text: lines[start..=end].join("\n"),
                    start_line: start + 1,
                    end_line: end + 1,
                });
                i = end + 1;
                continue;
            }

            i += 1;
        }
    }
}
