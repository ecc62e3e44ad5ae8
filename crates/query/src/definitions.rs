use crate::config::DefinitionConfig;
use atlas_fact_store::FactStore;
use atlas_protocol::{Fact, FactFilter, NodeId, NodeKind, Predicate, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Prefix,
    Contains,
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct DefinitionQuery {
    pub name: String,
    pub mode: MatchMode,
    pub case_sensitive: bool,
    pub entity_type: Option<NodeKind>,
    pub file_hint: Option<String>,
}

impl DefinitionQuery {
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: MatchMode::Exact,
            case_sensitive: true,
            entity_type: None,
            file_hint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DefinitionMatch {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u64>,
    pub confidence: f32,
}

/// Ranked definition lookup over DEFINES facts.
///
/// Confidence blends name-match quality with type, file-hint, signature
/// and line-range signals; components whose filter is absent award their
/// full weight. Results below `min_confidence` are dropped and the rest
/// capped at `max_results`.
pub async fn find_definitions<S: FactStore + ?Sized>(
    store: &S,
    query: &DefinitionQuery,
    config: &DefinitionConfig,
) -> Result<Vec<DefinitionMatch>> {
    let defines = store
        .find(&FactFilter::predicate(Predicate::Defines))
        .await?;

    let mut matches = Vec::new();
    for fact in &defines {
        let Some(candidate) = describe(fact) else {
            continue;
        };
        let Some(quality) = name_match_quality(query, &candidate.name) else {
            continue;
        };
        let confidence = blend_confidence(query, config, &candidate, quality);
        if confidence < config.min_confidence {
            continue;
        }
        matches.push(DefinitionMatch {
            confidence,
            ..candidate
        });
    }

    matches.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.file.cmp(&b.file))
    });
    matches.truncate(config.max_results);
    Ok(matches)
}

fn describe(fact: &Fact) -> Option<DefinitionMatch> {
    let node = NodeId::parse(&fact.object).ok()?;
    let file = node.containing_file()?.to_string();
    let props = fact.properties.as_ref();

    let name = props
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| node.name.clone());
    let entity_type = props
        .and_then(|p| p.get("type"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| node.kind.as_str().to_string());

    Some(DefinitionMatch {
        id: fact.object.clone(),
        name,
        entity_type,
        file,
        signature: props
            .and_then(|p| p.get("signature"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        start_line: props.and_then(|p| p.get("startLine")).and_then(|v| v.as_u64()),
        end_line: props.and_then(|p| p.get("endLine")).and_then(|v| v.as_u64()),
        confidence: 0.0,
    })
}

/// `None` means the candidate does not match at all in this mode.
fn name_match_quality(query: &DefinitionQuery, candidate: &str) -> Option<f32> {
    let (needle, hay) = if query.case_sensitive {
        (query.name.clone(), candidate.to_string())
    } else {
        (query.name.to_lowercase(), candidate.to_lowercase())
    };

    match query.mode {
        MatchMode::Exact => (needle == hay).then_some(1.0),
        MatchMode::Prefix => hay
            .starts_with(&needle)
            .then(|| needle.chars().count() as f32 / hay.chars().count().max(1) as f32),
        MatchMode::Contains => hay.contains(&needle).then_some(0.7),
        MatchMode::Fuzzy => {
            let similarity = levenshtein_similarity(&needle, &hay);
            (similarity > 0.0).then_some(similarity)
        }
    }
}

fn blend_confidence(
    query: &DefinitionQuery,
    config: &DefinitionConfig,
    candidate: &DefinitionMatch,
    quality: f32,
) -> f32 {
    let w = &config.weights;
    let mut confidence = quality * w.name;

    confidence += match query.entity_type {
        None => w.entity_type,
        Some(kind) if candidate.entity_type == kind.as_str() => {
            w.entity_type + w.exact_type_bonus
        }
        Some(kind) if kinds_compatible(kind, &candidate.entity_type) => w.entity_type,
        Some(_) => 0.0,
    };

    confidence += match &query.file_hint {
        None => w.file_hint_exact,
        Some(hint) if hint == &candidate.file => w.file_hint_exact,
        Some(hint) if candidate.file.contains(hint.as_str()) || hint.contains(&candidate.file) => {
            w.file_hint_partial
        }
        Some(_) => 0.0,
    };

    if candidate.signature.as_deref().is_some_and(|s| !s.is_empty()) {
        confidence += w.signature_presence;
    }
    if candidate.start_line.is_some() && candidate.end_line.is_some() {
        confidence += w.line_range_presence;
    }

    let exact_name = if query.case_sensitive {
        candidate.name == query.name
    } else {
        candidate.name.eq_ignore_ascii_case(&query.name)
    };
    if exact_name {
        confidence += w.exact_name_bonus;
    }

    confidence.clamp(0.0, 1.0)
}

/// Function and method definitions are close enough to satisfy each
/// other's type filter (without the exact bonus).
fn kinds_compatible(kind: NodeKind, entity_type: &str) -> bool {
    matches!(
        (kind, entity_type),
        (NodeKind::Function, "method") | (NodeKind::Method, "function")
    )
}

fn levenshtein_similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_distance(a, b);
    1.0 - distance as f32 / max_len as f32
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }
    matrix[a.len()][b.len()]
}
