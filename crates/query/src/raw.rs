use atlas_fact_store::FactStore;
use atlas_protocol::Result;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

/// Primitive node fields that survive the lossy projection. Bounding the
/// payload this way is deliberate; it is not a full node fetch.
const NODE_FIELD_ALLOWLIST: &[&str] = &[
    "id",
    "name",
    "type",
    "filePath",
    "language",
    "label",
    "kind",
    "signature",
];

/// Fields that mark a value as node-like.
const NODE_MARKER_FIELDS: &[&str] = &["id", "name", "type", "label"];

/// Best-effort normalization of one raw store record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct NormalizedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RawQueryResult {
    pub records: Vec<NormalizedRecord>,
    pub summary: String,
}

/// Execute an opaque query against the store in read-only mode and
/// normalize whatever comes back.
pub async fn run_raw_query<S: FactStore + ?Sized>(store: &S, query: &str) -> Result<RawQueryResult> {
    let output = store.raw_query(query, true).await?;
    let records = output.records.iter().map(normalize_record).collect();
    Ok(RawQueryResult {
        records,
        summary: output.summary,
    })
}

/// Normalization rules:
/// 1. A record with literal subject/predicate/object fields passes through.
/// 2. Otherwise the first column is taken; node-like values are projected
///    down to allow-listed primitive fields.
/// 3. Scalars are wrapped as a `value` property.
fn normalize_record(record: &Value) -> NormalizedRecord {
    if let Value::Object(map) = record {
        if let (Some(subject), Some(predicate), Some(object)) =
            (map.get("subject"), map.get("predicate"), map.get("object"))
        {
            let mut properties = map
                .get("properties")
                .and_then(Value::as_object)
                .cloned();
            if properties.as_ref().is_some_and(Map::is_empty) {
                properties = None;
            }
            return NormalizedRecord {
                subject: value_to_string(subject),
                predicate: value_to_string(predicate),
                object: value_to_string(object),
                properties,
            };
        }

        // No triple shape: fall through to first-column handling.
        if let Some((_, first)) = map.iter().next() {
            return normalize_column(first);
        }
        return NormalizedRecord::default();
    }

    normalize_column(record)
}

fn normalize_column(value: &Value) -> NormalizedRecord {
    match value {
        Value::Object(map) if looks_like_node(map) => {
            let mut projected = Map::new();
            for field in NODE_FIELD_ALLOWLIST {
                if let Some(v) = map.get(*field) {
                    if is_primitive(v) {
                        projected.insert((*field).to_string(), v.clone());
                    }
                }
            }
            NormalizedRecord {
                subject: map.get("id").or_else(|| map.get("name")).and_then(value_to_string),
                properties: Some(projected),
                ..NormalizedRecord::default()
            }
        }
        other => {
            let mut properties = Map::new();
            properties.insert("value".into(), other.clone());
            NormalizedRecord {
                properties: Some(properties),
                ..NormalizedRecord::default()
            }
        }
    }
}

fn looks_like_node(map: &Map<String, Value>) -> bool {
    NODE_MARKER_FIELDS.iter().any(|field| map.contains_key(*field))
}

fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
