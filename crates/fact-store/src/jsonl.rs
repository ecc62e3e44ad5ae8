use crate::store::{FactStore, RawQueryOutput, StoreOptions};
use async_trait::async_trait;
use atlas_protocol::{AtlasError, Fact, FactFilter, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Append-only JSONL fact store with in-memory triple indexes.
///
/// The backing file holds one fact per line; indexes are rebuilt at open.
/// Writes accumulate in memory until [`FactStore::flush`].
pub struct JsonlFactStore {
    path: PathBuf,
    read_only: bool,
    facts: Vec<Fact>,
    by_subject: HashMap<String, Vec<usize>>,
    by_object: HashMap<String, Vec<usize>>,
    pending: usize,
}

/// Query document accepted by [`FactStore::raw_query`].
///
/// A JSON filter plus optional projection, standing in for the query
/// language of a full graph store.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQueryDoc {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    predicate: Option<String>,
    #[serde(default)]
    object: Option<String>,
    #[serde(default, rename = "return")]
    projection: Option<Vec<String>>,
    #[serde(default)]
    limit: Option<usize>,
}

impl JsonlFactStore {
    pub async fn open(path: impl AsRef<Path>, opts: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let facts = if path.exists() {
            let raw = tokio::fs::read_to_string(&path).await?;
            let mut facts = Vec::new();
            for (line_no, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let fact: Fact = serde_json::from_str(line).map_err(|err| {
                    AtlasError::internal(format!(
                        "corrupt fact at {}:{}: {err}",
                        path.display(),
                        line_no + 1
                    ))
                })?;
                facts.push(fact);
            }
            facts
        } else if opts.create {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, b"").await?;
            Vec::new()
        } else {
            return Err(AtlasError::internal(format!(
                "fact store not found: {}",
                path.display()
            )));
        };

        let mut store = Self {
            path,
            read_only: opts.read_only,
            facts: Vec::new(),
            by_subject: HashMap::new(),
            by_object: HashMap::new(),
            pending: 0,
        };
        for fact in facts {
            store.index_fact(fact);
        }
        store.pending = 0;
        log::debug!(
            "opened fact store {} ({} facts)",
            store.path.display(),
            store.facts.len()
        );
        Ok(store)
    }

    fn index_fact(&mut self, fact: Fact) {
        let idx = self.facts.len();
        self.by_subject
            .entry(fact.subject.clone())
            .or_default()
            .push(idx);
        self.by_object
            .entry(fact.object.clone())
            .or_default()
            .push(idx);
        self.facts.push(fact);
        self.pending += 1;
    }

    fn candidate_indexes(&self, filter: &FactFilter) -> Vec<usize> {
        match (&filter.subject, &filter.object) {
            (Some(subject), _) => self
                .by_subject
                .get(subject)
                .cloned()
                .unwrap_or_default(),
            (None, Some(object)) => self.by_object.get(object).cloned().unwrap_or_default(),
            (None, None) => (0..self.facts.len()).collect(),
        }
    }

    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }
}

#[async_trait]
impl FactStore for JsonlFactStore {
    async fn add_fact(&mut self, fact: &Fact) -> Result<()> {
        if self.read_only {
            return Err(AtlasError::Validation(
                "fact store opened read-only".into(),
            ));
        }
        self.index_fact(fact.clone());
        Ok(())
    }

    async fn find(&self, filter: &FactFilter) -> Result<Vec<Fact>> {
        Ok(self
            .candidate_indexes(filter)
            .into_iter()
            .map(|idx| &self.facts[idx])
            .filter(|fact| filter.matches(fact))
            .cloned()
            .collect())
    }

    async fn raw_query(&self, query: &str, read_only: bool) -> Result<RawQueryOutput> {
        if !read_only {
            return Err(AtlasError::Validation(
                "raw queries must be read-only".into(),
            ));
        }
        let doc: RawQueryDoc = serde_json::from_str(query)
            .map_err(|err| AtlasError::Validation(format!("malformed raw query: {err}")))?;

        let filter = FactFilter {
            subject: doc.subject,
            predicate: match doc.predicate.as_deref() {
                Some(token) => Some(token.parse()?),
                None => None,
            },
            object: doc.object,
        };

        let mut matched = self.find(&filter).await?;
        let total = matched.len();
        if let Some(limit) = doc.limit {
            matched.truncate(limit);
        }

        let records = matched
            .into_iter()
            .map(|fact| {
                let value = serde_json::to_value(&fact)?;
                match &doc.projection {
                    None => Ok(value),
                    Some(fields) => {
                        let mut projected = serde_json::Map::new();
                        if let serde_json::Value::Object(map) = value {
                            for field in fields {
                                if let Some(v) = map.get(field) {
                                    projected.insert(field.clone(), v.clone());
                                }
                            }
                        }
                        Ok(serde_json::Value::Object(projected))
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryOutput {
            summary: format!("matched {total} facts, returned {}", records.len()),
            records,
        })
    }

    async fn flush(&mut self) -> Result<()> {
        if self.read_only || self.pending == 0 {
            return Ok(());
        }
        let start = self.facts.len() - self.pending;
        let mut buf = String::new();
        for fact in &self.facts[start..] {
            buf.push_str(&serde_json::to_string(fact)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        self.pending = 0;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.flush().await
    }
}
