use crate::config::QueryConfig;
use crate::definitions::{find_definitions, DefinitionMatch, DefinitionQuery};
use crate::facts::{find_facts, FactPage, Page};
use crate::hierarchy::{build_call_hierarchy, CallHierarchy, Direction};
use crate::impact::{analyze_impact, ImpactReport};
use crate::raw::{run_raw_query, RawQueryResult};
use crate::references::{find_references, ReferencesReport};
use crate::related::{score_related_files, RelatedFile};
use atlas_fact_store::{FactStore, JsonlFactStore, StoreOptions};
use atlas_indexer::{project_identity, FingerprintGate, IndexLayout};
use atlas_protocol::{FactFilter, NodeKind, Result};
use std::path::Path;

/// Entry point for all queries against a published graph.
///
/// Every call is gate-validated first (no query runs against a stale or
/// missing index) and opens its own read-only store handle, released on
/// every exit path. Handles are never shared or pooled across calls.
pub struct QueryEngine {
    layout: IndexLayout,
    gate: FingerprintGate,
    config: QueryConfig,
}

impl QueryEngine {
    #[must_use]
    pub fn new(layout: IndexLayout, config: QueryConfig) -> Self {
        let gate = FingerprintGate::new(layout.clone());
        Self {
            layout,
            gate,
            config,
        }
    }

    /// Use a pre-configured gate, e.g. one wired for auto rebuild.
    #[must_use]
    pub fn with_gate(layout: IndexLayout, gate: FingerprintGate, config: QueryConfig) -> Self {
        Self {
            layout,
            gate,
            config,
        }
    }

    async fn open_store(&self, project_root: &Path) -> Result<JsonlFactStore> {
        let metadata = self.gate.validate(project_root).await?;
        let identity = project_identity(project_root);
        let db_path = self
            .layout
            .project_dir(&identity)
            .join(&metadata.output.db_file);
        JsonlFactStore::open(db_path, StoreOptions::read_only()).await
    }

    pub async fn find_facts(
        &self,
        project_root: &Path,
        filter: &FactFilter,
        page: Page,
    ) -> Result<FactPage> {
        let mut store = self.open_store(project_root).await?;
        let result = find_facts(&store, filter, page).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn raw_query(&self, project_root: &Path, query: &str) -> Result<RawQueryResult> {
        let mut store = self.open_store(project_root).await?;
        let result = run_raw_query(&store, query).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn call_hierarchy(
        &self,
        project_root: &Path,
        entity_id: &str,
        direction: Direction,
        max_depth: usize,
    ) -> Result<CallHierarchy> {
        let mut store = self.open_store(project_root).await?;
        let result =
            build_call_hierarchy(&store, entity_id, direction, max_depth, &self.config.hierarchy)
                .await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn impact(
        &self,
        project_root: &Path,
        entity_id: &str,
        max_depth: usize,
    ) -> Result<ImpactReport> {
        let mut store = self.open_store(project_root).await?;
        let result = analyze_impact(&store, entity_id, max_depth, &self.config.impact).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn related_files(
        &self,
        project_root: &Path,
        target_file: &str,
    ) -> Result<Vec<RelatedFile>> {
        let mut store = self.open_store(project_root).await?;
        let result = score_related_files(&store, target_file, &self.config.related).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn definitions(
        &self,
        project_root: &Path,
        query: &DefinitionQuery,
    ) -> Result<Vec<DefinitionMatch>> {
        let mut store = self.open_store(project_root).await?;
        let result = find_definitions(&store, query, &self.config.definitions).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub async fn references(
        &self,
        project_root: &Path,
        symbol_name: &str,
        symbol_type: Option<NodeKind>,
    ) -> Result<ReferencesReport> {
        let mut store = self.open_store(project_root).await?;
        let result = find_references(&store, symbol_name, symbol_type).await;
        let closed = store.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }
}
