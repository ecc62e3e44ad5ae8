use atlas_protocol::NodeKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// DEFINES property payloads keep at most this many characters of the
/// span text. Long signatures are truncated, by design, to bound
/// property size.
pub const SIGNATURE_SNIPPET_CHARS: usize = 200;

/// Candidate extensions tried when a relative import omits one. The first
/// guess is accepted without an existence check; a wrong guess yields an
/// inert dangling file node.
pub const IMPORT_EXTENSION_GUESSES: &[&str] = &["ts", "tsx", "js", "jsx", "py", "go", "rs", "java"];

/// Identifiers that look like calls but never are.
const CALL_DENYLIST: &[&str] = &[
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "return",
    "new",
    "synchronized",
];

/// Keywords that introduce a definition; an identifier right after one is
/// the entity's own name, not a call site.
const DEFINITION_KEYWORDS: &[&str] = &["function", "def", "func", "fn"];

/// Infer the entity kind of a raw span by keyword scan.
pub(crate) fn infer_entity_kind(span: &str) -> NodeKind {
    if span.contains("class ") || span.contains("struct ") || span.contains("enum ") {
        NodeKind::Class
    } else if span.contains("interface ") || span.contains("trait ") {
        NodeKind::Interface
    } else if span.contains("function ")
        || span.contains("def ")
        || span.contains("func ")
        || span.contains("fn ")
    {
        NodeKind::Function
    } else if span.contains("const ") || span.contains("let ") || span.contains("var ") {
        NodeKind::Variable
    } else {
        NodeKind::Method
    }
}

/// Name patterns per syntax family, tried in order; first match wins.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // TS/JS
        r"\bfunction\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)",
        r"\b(?:class|interface|enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        r"\b(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        // Python
        r"\bdef\s+([A-Za-z_][A-Za-z0-9_]*)",
        // Go (optional method receiver)
        r"\bfunc\s+(?:\([^)]*\)\s*)?([A-Za-z_][A-Za-z0-9_]*)",
        // Rust
        r"\bfn\s+([A-Za-z_][A-Za-z0-9_]*)",
        r"\b(?:struct|trait|union)\s+([A-Za-z_][A-Za-z0-9_]*)",
        r"\b(?:static|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
        // Java/TS methods and other `name(...)` heads, optional return type
        r"(?m)^\s*(?:(?:public|private|protected|static|final|abstract|async)\s+)*(?:[A-Za-z_$][A-Za-z0-9_$<>\[\]]*\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*\(",
        // Python module-level assignment
        r"(?m)^([A-Za-z_][A-Za-z0-9_]*)\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Extract the entity name from a raw span.
pub(crate) fn extract_entity_name(span: &str) -> Option<String> {
    NAME_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(span))
        .map(|caps| caps[1].to_string())
}

static CALL_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("static pattern"));

/// Distinct callee names inside a function/method span.
///
/// Name-matched only: an identifier immediately followed by `(`, minus the
/// control-keyword denylist and the span's own definition site.
pub(crate) fn extract_callees(span: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut callees = Vec::new();

    for caps in CALL_SITE.captures_iter(span) {
        let name = &caps[1];
        if CALL_DENYLIST.contains(&name) {
            continue;
        }
        let full = caps.get(0).expect("whole match");
        if is_definition_site(span, full.start()) {
            continue;
        }
        if seen.insert(name.to_string()) {
            callees.push(name.to_string());
        }
    }
    callees
}

fn is_definition_site(span: &str, match_start: usize) -> bool {
    let prefix = span[..match_start].trim_end();
    DEFINITION_KEYWORDS
        .iter()
        .any(|kw| prefix.ends_with(kw))
}

static EXTENDS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // TS/Java
        r"\bextends\s+([A-Za-z_$][A-Za-z0-9_$.]*)",
        // Python base class
        r"\bclass\s+[A-Za-z_][A-Za-z0-9_]*\s*\(\s*([A-Za-z_][A-Za-z0-9_.]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

pub(crate) fn extract_extends(span: &str) -> Option<String> {
    EXTENDS_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(span))
        .map(|caps| caps[1].to_string())
}

static IMPLEMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bimplements\s+([A-Za-z_$][A-Za-z0-9_$.]*(?:\s*,\s*[A-Za-z_$][A-Za-z0-9_$.]*)*)")
        .expect("static pattern")
});

pub(crate) fn extract_implements(span: &str) -> Vec<String> {
    IMPLEMENTS
        .captures(span)
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// First `max_chars` characters of a span, on a char boundary.
pub(crate) fn signature_snippet(span: &str, max_chars: usize) -> String {
    span.chars().take(max_chars).collect()
}

static IMPORT_PATH: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"from\s+['"]([^'"]+)['"]"#,
        r#"import\s*\(?\s*['"]([^'"]+)['"]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Pull the module path out of an import statement string.
pub(crate) fn parse_import_path(statement: &str) -> Option<String> {
    IMPORT_PATH
        .iter()
        .find_map(|pattern| pattern.captures(statement))
        .map(|caps| caps[1].to_string())
}

/// Where an import points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// A project-relative file path (possibly a guessed, non-existent one).
    File(String),
    /// A bare module specifier.
    Package(String),
}

/// Resolve an import source against the importing file's directory.
///
/// Relative paths are normalized and get the first candidate extension
/// when they carry none; bare specifiers become package targets.
pub(crate) fn resolve_import(importing_file: &str, source: &str) -> ImportTarget {
    if !source.starts_with("./") && !source.starts_with("../") {
        return ImportTarget::Package(source.to_string());
    }

    let dir = match importing_file.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(source.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let mut path = segments.join("/");

    let has_known_extension = std::path::Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMPORT_EXTENSION_GUESSES.contains(&ext));
    if !has_known_extension {
        path = format!("{path}.{}", IMPORT_EXTENSION_GUESSES[0]);
    }

    ImportTarget::File(path)
}
