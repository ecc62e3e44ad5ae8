use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// Lifecycle state of a published index.
///
/// Only completed builds are ever visible; an in-flight build lives in a
/// temporary directory until the atomic swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    Complete,
}

/// Version-control state of a working tree at build time.
///
/// `commit`/`branch` are absent outside version control; the derived
/// [`GitFingerprint::value`] is what staleness comparison uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GitFingerprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub dirty: bool,
    pub value: String,
}

impl GitFingerprint {
    #[must_use]
    pub fn new(commit: Option<String>, branch: Option<String>, dirty: bool) -> Self {
        let base = commit.as_deref().unwrap_or("filesystem");
        let value = if dirty {
            format!("{base}+dirty")
        } else {
            base.to_string()
        };
        Self {
            commit,
            branch,
            dirty,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexOutput {
    pub db_file: String,
}

/// Descriptor of one published graph, written exactly once per successful
/// build and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    pub schema_version: u32,
    pub state: IndexState,
    pub project_path: String,
    pub project_hash: String,
    pub indexed_at_unix_ms: u64,
    pub file_count: usize,
    pub fingerprint: GitFingerprint,
    pub output: IndexOutput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fingerprint_value_from_commit() {
        let clean = GitFingerprint::new(Some("abc123".into()), Some("main".into()), false);
        assert_eq!(clean.value, "abc123");

        let dirty = GitFingerprint::new(Some("abc123".into()), Some("main".into()), true);
        assert_eq!(dirty.value, "abc123+dirty");
    }

    #[test]
    fn fingerprint_value_outside_version_control() {
        let clean = GitFingerprint::new(None, None, false);
        assert_eq!(clean.value, "filesystem");

        let dirty = GitFingerprint::new(None, None, true);
        assert_eq!(dirty.value, "filesystem+dirty");
    }

    #[test]
    fn state_serializes_as_complete() {
        assert_eq!(
            serde_json::to_string(&IndexState::Complete).unwrap(),
            "\"complete\""
        );
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let metadata = IndexMetadata {
            schema_version: INDEX_SCHEMA_VERSION,
            state: IndexState::Complete,
            project_path: "/work/demo".into(),
            project_hash: "demo-3f9ac2d1".into(),
            indexed_at_unix_ms: 1_700_000_000_000,
            file_count: 12,
            fingerprint: GitFingerprint::new(Some("abc".into()), Some("main".into()), false),
            output: IndexOutput {
                db_file: "facts.jsonl".into(),
            },
        };

        let json = serde_json::to_string_pretty(&metadata).unwrap();
        assert!(json.contains("\"state\": \"complete\""));
        let back: IndexMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }
}
