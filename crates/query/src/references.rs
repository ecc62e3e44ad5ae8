use atlas_fact_store::FactStore;
use atlas_protocol::{Fact, FactFilter, NodeId, NodeKind, Predicate, Result};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Call,
    Import,
    Implementation,
    Extension,
    TypeUsage,
    Other,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Reference {
    pub from: String,
    pub predicate: Predicate,
    pub kind: ReferenceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FileReferences {
    pub file: String,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReferencesReport {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub total: usize,
    /// Grouped by file, sorted by per-file reference count descending.
    pub files: Vec<FileReferences>,
}

/// Aggregate references to a symbol from five independent queries.
///
/// The definition is resolved first (exact property lookup, then a linear
/// scan fallback); a missing definition yields an empty report, not an
/// error. Each collection strategy is isolated: one failing does not
/// abort the others.
pub async fn find_references<S: FactStore + ?Sized>(
    store: &S,
    symbol_name: &str,
    symbol_type: Option<NodeKind>,
) -> Result<ReferencesReport> {
    let Some(definition) = resolve_definition(store, symbol_name, symbol_type).await? else {
        return Ok(ReferencesReport {
            symbol: symbol_name.to_string(),
            definition: None,
            total: 0,
            files: Vec::new(),
        });
    };

    let defining_file = NodeId::parse(&definition)
        .ok()
        .and_then(|node| node.containing_file().map(str::to_string));

    let mut filters = vec![
        FactFilter::object(&definition).with_predicate(Predicate::Calls),
        FactFilter::object(&definition).with_predicate(Predicate::Implements),
        FactFilter::object(&definition).with_predicate(Predicate::Extends),
        FactFilter::object(&definition).with_predicate(Predicate::Uses),
    ];
    if let Some(file) = &defining_file {
        filters.push(
            FactFilter::object(NodeId::file(file).encode()).with_predicate(Predicate::Imports),
        );
    }

    let mut seen: HashSet<(String, Predicate, String)> = HashSet::new();
    let mut references = Vec::new();
    for filter in &filters {
        let facts = match store.find(filter).await {
            Ok(facts) => facts,
            Err(err) => {
                // One failed strategy contributes nothing.
                log::debug!("reference strategy failed for {symbol_name}: {err}");
                continue;
            }
        };
        for fact in facts {
            let key = (fact.subject.clone(), fact.predicate, fact.object.clone());
            if !seen.insert(key) {
                continue;
            }
            references.push(classify(fact));
        }
    }

    let total = references.len();
    let mut by_file: HashMap<String, Vec<Reference>> = HashMap::new();
    for reference in references {
        let file = reference
            .file
            .clone()
            .unwrap_or_else(|| "(unknown)".to_string());
        by_file.entry(file).or_default().push(reference);
    }

    let mut files: Vec<FileReferences> = by_file
        .into_iter()
        .map(|(file, references)| FileReferences { file, references })
        .collect();
    files.sort_by(|a, b| {
        b.references
            .len()
            .cmp(&a.references.len())
            .then_with(|| a.file.cmp(&b.file))
    });

    Ok(ReferencesReport {
        symbol: symbol_name.to_string(),
        definition: Some(definition),
        total,
        files,
    })
}

/// Exact name lookup over DEFINES facts, with a case-insensitive linear
/// scan as fallback.
async fn resolve_definition<S: FactStore + ?Sized>(
    store: &S,
    symbol_name: &str,
    symbol_type: Option<NodeKind>,
) -> Result<Option<String>> {
    let defines = store
        .find(&FactFilter::predicate(Predicate::Defines))
        .await?;

    let type_matches = |fact: &Fact| match symbol_type {
        None => true,
        Some(kind) => NodeId::parse(&fact.object)
            .map(|node| node.kind == kind)
            .unwrap_or(false),
    };
    let name_of = |fact: &Fact| -> Option<String> {
        fact.properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| NodeId::parse(&fact.object).ok().map(|node| node.name))
    };

    // Indexed-style exact pass first.
    for fact in &defines {
        if type_matches(fact) && name_of(fact).as_deref() == Some(symbol_name) {
            return Ok(Some(fact.object.clone()));
        }
    }
    // Fallback: linear scan, case-folded.
    for fact in &defines {
        if type_matches(fact)
            && name_of(fact).is_some_and(|name| name.eq_ignore_ascii_case(symbol_name))
        {
            return Ok(Some(fact.object.clone()));
        }
    }
    Ok(None)
}

fn classify(fact: Fact) -> Reference {
    let kind = match fact.predicate {
        Predicate::Calls => ReferenceKind::Call,
        Predicate::Imports | Predicate::ImportsFrom => ReferenceKind::Import,
        Predicate::Implements => ReferenceKind::Implementation,
        Predicate::Extends => ReferenceKind::Extension,
        Predicate::Uses => ReferenceKind::TypeUsage,
        _ => ReferenceKind::Other,
    };
    let file = NodeId::parse(&fact.subject)
        .ok()
        .and_then(|node| node.containing_file().map(str::to_string));
    Reference {
        from: fact.subject,
        predicate: fact.predicate,
        kind,
        file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_fact_store::MemoryFactStore;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value};

    fn defines(file: &str, kind: &str, name: &str) -> Fact {
        let mut props = Map::new();
        props.insert("name".into(), Value::String(name.into()));
        props.insert("type".into(), Value::String(kind.into()));
        Fact::new(
            format!("file:{file}"),
            Predicate::Defines,
            format!("{kind}:{file}#{name}"),
        )
        .with_properties(props)
    }

    fn seeded() -> MemoryFactStore {
        MemoryFactStore::with_facts(vec![
            defines("core.ts", "interface", "Render"),
            Fact::new(
                "class:widget.ts#Widget",
                Predicate::Implements,
                "interface:core.ts#Render",
            ),
            Fact::new(
                "function:app.ts#draw",
                Predicate::Calls,
                "interface:core.ts#Render",
            ),
            Fact::new("file:app.ts", Predicate::Imports, "file:core.ts"),
            Fact::new(
                "function:app.ts#paint",
                Predicate::Uses,
                "interface:core.ts#Render",
            ),
        ])
    }

    #[tokio::test]
    async fn gathers_and_classifies_all_strategies() {
        let store = seeded();
        let report = find_references(&store, "Render", None).await.unwrap();

        assert_eq!(report.definition.as_deref(), Some("interface:core.ts#Render"));
        assert_eq!(report.total, 4);

        let kinds: Vec<ReferenceKind> = report
            .files
            .iter()
            .flat_map(|f| f.references.iter().map(|r| r.kind))
            .collect();
        assert!(kinds.contains(&ReferenceKind::Implementation));
        assert!(kinds.contains(&ReferenceKind::Call));
        assert!(kinds.contains(&ReferenceKind::Import));
        assert!(kinds.contains(&ReferenceKind::TypeUsage));
    }

    #[tokio::test]
    async fn groups_by_file_sorted_by_count() {
        let store = seeded();
        let report = find_references(&store, "Render", None).await.unwrap();

        // app.ts contributes 3 references (call, import, type usage).
        assert_eq!(report.files[0].file, "app.ts");
        assert_eq!(report.files[0].references.len(), 3);
        assert_eq!(report.files[1].file, "widget.ts");
    }

    #[tokio::test]
    async fn duplicate_triples_are_collapsed() {
        let mut facts = vec![defines("a.ts", "function", "f")];
        for _ in 0..3 {
            facts.push(Fact::new(
                "function:b.ts#caller",
                Predicate::Calls,
                "function:a.ts#f",
            ));
        }
        let store = MemoryFactStore::with_facts(facts);

        let report = find_references(&store, "f", None).await.unwrap();
        assert_eq!(report.total, 1);
    }

    #[tokio::test]
    async fn missing_definition_yields_empty_report() {
        let store = MemoryFactStore::new();
        let report = find_references(&store, "ghost", None).await.unwrap();
        assert_eq!(report.definition, None);
        assert_eq!(report.total, 0);
        assert!(report.files.is_empty());
    }

    #[tokio::test]
    async fn fallback_scan_is_case_insensitive() {
        let store = MemoryFactStore::with_facts(vec![defines("a.ts", "function", "Handler")]);
        let report = find_references(&store, "handler", None).await.unwrap();
        assert_eq!(report.definition.as_deref(), Some("function:a.ts#Handler"));
    }

    #[tokio::test]
    async fn type_filter_narrows_resolution() {
        let store = MemoryFactStore::with_facts(vec![
            defines("a.ts", "function", "save"),
            defines("b.ts", "class", "save"),
        ]);

        let report = find_references(&store, "save", Some(NodeKind::Class))
            .await
            .unwrap();
        assert_eq!(report.definition.as_deref(), Some("class:b.ts#save"));
    }
}
