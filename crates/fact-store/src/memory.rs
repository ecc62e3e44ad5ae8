use crate::store::{FactStore, RawQueryOutput, StoreOptions};
use async_trait::async_trait;
use atlas_protocol::{AtlasError, Fact, FactFilter, Result};

/// In-memory fact store for tests and small scratch graphs.
#[derive(Default)]
pub struct MemoryFactStore {
    facts: Vec<Fact>,
    read_only: bool,
    closed: bool,
}

impl MemoryFactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pre-seeded store, e.g. for traversal tests.
    #[must_use]
    pub fn with_facts(facts: Vec<Fact>) -> Self {
        Self {
            facts,
            read_only: false,
            closed: false,
        }
    }

    #[must_use]
    pub fn with_options(opts: StoreOptions) -> Self {
        Self {
            facts: Vec::new(),
            read_only: opts.read_only,
            closed: false,
        }
    }

    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn add_fact(&mut self, fact: &Fact) -> Result<()> {
        if self.read_only {
            return Err(AtlasError::Validation(
                "fact store opened read-only".into(),
            ));
        }
        if self.closed {
            return Err(AtlasError::internal("fact store already closed"));
        }
        self.facts.push(fact.clone());
        Ok(())
    }

    async fn find(&self, filter: &FactFilter) -> Result<Vec<Fact>> {
        Ok(self
            .facts
            .iter()
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
        // Same query document as the JSONL store, without projection.
        let filter: FactFilter = serde_json::from_str(query)
            .map_err(|err| AtlasError::Validation(format!("malformed raw query: {err}")))?;
        let matched = self.find(&filter).await?;
        let records = matched
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(RawQueryOutput {
            summary: format!("matched {} facts", records.len()),
            records,
        })
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
