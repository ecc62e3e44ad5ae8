use async_trait::async_trait;
use atlas_protocol::{Fact, FactFilter, Result};

/// File name of the reference store inside a published index directory.
pub const FACT_DB_FILE_NAME: &str = "facts.jsonl";

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Reject writes through this handle.
    pub read_only: bool,
    /// Create the backing file if it does not exist.
    pub create: bool,
}

impl StoreOptions {
    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            read_only: true,
            create: false,
        }
    }

    #[must_use]
    pub const fn create() -> Self {
        Self {
            read_only: false,
            create: true,
        }
    }
}

/// Result of a raw pass-through query.
#[derive(Debug, Clone, Default)]
pub struct RawQueryOutput {
    pub records: Vec<serde_json::Value>,
    pub summary: String,
}

/// Storage handle for fact graphs.
///
/// Implementations are append-only within a build; a published graph is
/// replaced wholesale on rebuild, never patched.
#[async_trait]
pub trait FactStore: Send {
    async fn add_fact(&mut self, fact: &Fact) -> Result<()>;

    async fn find(&self, filter: &FactFilter) -> Result<Vec<Fact>>;

    /// Execute an opaque query string. `read_only` must be honored by the
    /// implementation; the query layer always passes `true`.
    async fn raw_query(&self, query: &str, read_only: bool) -> Result<RawQueryOutput>;

    async fn flush(&mut self) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}
