use crate::config::RelatedFilesConfig;
use atlas_fact_store::FactStore;
use atlas_protocol::{FactFilter, NodeId, Predicate, Result};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RelatedFile {
    pub file: String,
    /// Normalized by the maximum score of this run, so values are
    /// relative per query and not comparable across calls.
    pub score: f32,
    pub raw_score: f32,
}

/// Rank files related to `target_file` by accumulated edge weight.
///
/// Every direct edge touching the target's file node contributes its
/// predicate weight; optionally, files importing the same modules add a
/// shared-dependency bonus per shared module.
pub async fn score_related_files<S: FactStore + ?Sized>(
    store: &S,
    target_file: &str,
    config: &RelatedFilesConfig,
) -> Result<Vec<RelatedFile>> {
    let target_id = NodeId::file(target_file).encode();
    let mut raw_scores: HashMap<String, f32> = HashMap::new();

    let outgoing = store.find(&FactFilter::subject(&target_id)).await?;
    let incoming = store.find(&FactFilter::object(&target_id)).await?;

    for fact in outgoing.iter().chain(incoming.iter()) {
        let other = if fact.subject == target_id {
            &fact.object
        } else {
            &fact.subject
        };
        let Some(other_file) = containing_file(other) else {
            continue;
        };
        if other_file == target_file {
            continue;
        }
        *raw_scores.entry(other_file).or_insert(0.0) +=
            config.weights.weight_for(fact.predicate);
    }

    if config.include_shared_dependencies {
        let mut shared_counts: HashMap<String, usize> = HashMap::new();
        let imports = store
            .find(&FactFilter::subject(&target_id).with_predicate(Predicate::Imports))
            .await?;
        for module in imports {
            let importers = store
                .find(&FactFilter::object(&module.object).with_predicate(Predicate::Imports))
                .await?;
            for importer in importers {
                if importer.subject == target_id {
                    continue;
                }
                let Some(file) = containing_file(&importer.subject) else {
                    continue;
                };
                *shared_counts.entry(file).or_insert(0) += 1;
            }
        }
        for (file, count) in shared_counts {
            *raw_scores.entry(file).or_insert(0.0) +=
                config.shared_dependency_weight * count as f32;
        }
    }

    let max_score = raw_scores.values().fold(0.0f32, |acc, v| acc.max(*v));
    if max_score <= 0.0 {
        return Ok(Vec::new());
    }

    let mut related: Vec<RelatedFile> = raw_scores
        .into_iter()
        .map(|(file, raw_score)| RelatedFile {
            file,
            score: raw_score / max_score,
            raw_score,
        })
        .filter(|related| related.score >= config.min_score)
        .collect();

    related.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.file.cmp(&b.file))
    });
    Ok(related)
}

fn containing_file(id: &str) -> Option<String> {
    NodeId::parse(id)
        .ok()
        .and_then(|node| node.containing_file().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_fact_store::MemoryFactStore;
    use atlas_protocol::Fact;
    use pretty_assertions::assert_eq;

    fn imports(a: &str, b: &str) -> Fact {
        Fact::new(a, Predicate::Imports, b)
    }

    #[tokio::test]
    async fn direct_edges_accumulate_predicate_weights() {
        let store = MemoryFactStore::with_facts(vec![
            imports("file:a.ts", "file:b.ts"),
            Fact::new("function:c.ts#f", Predicate::Calls, "file:a.ts"),
        ]);

        let related = score_related_files(&store, "a.ts", &RelatedFilesConfig::default())
            .await
            .unwrap();

        assert_eq!(related.len(), 2);
        // IMPORTS (1.0) outranks CALLS (0.8).
        assert_eq!(related[0].file, "b.ts");
        assert_eq!(related[0].score, 1.0);
        assert_eq!(related[1].file, "c.ts");
        assert!((related[1].raw_score - 0.8).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn shared_dependencies_add_weight_per_module() {
        let store = MemoryFactStore::with_facts(vec![
            imports("file:a.ts", "package:lodash"),
            imports("file:a.ts", "package:react"),
            imports("file:peer.ts", "package:lodash"),
            imports("file:peer.ts", "package:react"),
        ]);

        let related = score_related_files(&store, "a.ts", &RelatedFilesConfig::default())
            .await
            .unwrap();

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].file, "peer.ts");
        // Two shared modules at 0.3 each.
        assert!((related[0].raw_score - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn adding_a_shared_importer_never_lowers_existing_raw_scores() {
        let base = vec![
            imports("file:a.ts", "file:b.ts"),
            imports("file:a.ts", "package:lodash"),
            imports("file:peer.ts", "package:lodash"),
        ];
        let store = MemoryFactStore::with_facts(base.clone());
        let before = score_related_files(&store, "a.ts", &RelatedFilesConfig::default())
            .await
            .unwrap();

        let mut grown = base;
        grown.push(imports("file:newcomer.ts", "package:lodash"));
        let store = MemoryFactStore::with_facts(grown);
        let after = score_related_files(&store, "a.ts", &RelatedFilesConfig::default())
            .await
            .unwrap();

        for old in &before {
            let new = after
                .iter()
                .find(|r| r.file == old.file)
                .expect("candidate survives");
            assert!(new.raw_score >= old.raw_score);
        }
    }

    #[tokio::test]
    async fn threshold_filters_weak_candidates() {
        let store = MemoryFactStore::with_facts(vec![
            imports("file:a.ts", "file:strong.ts"),
            Fact::new("file:a.ts", Predicate::Uses, "file:weak.ts"),
        ]);

        let config = RelatedFilesConfig {
            min_score: 0.5,
            ..RelatedFilesConfig::default()
        };
        let related = score_related_files(&store, "a.ts", &config).await.unwrap();

        // USES falls to the 0.2 fallback weight; 0.2/1.0 < 0.5.
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].file, "strong.ts");
    }

    #[tokio::test]
    async fn unknown_file_scores_nothing() {
        let store = MemoryFactStore::new();
        let related = score_related_files(&store, "ghost.ts", &RelatedFilesConfig::default())
            .await
            .unwrap();
        assert!(related.is_empty());
    }
}
