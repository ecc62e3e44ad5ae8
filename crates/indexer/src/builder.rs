use crate::collector::{collect_files, CollectedFiles, CollectorConfig};
use crate::extract::{
    extract_callees, extract_entity_name, extract_extends, extract_implements,
    infer_entity_kind, parse_import_path, resolve_import, signature_snippet, ImportTarget,
    SIGNATURE_SNIPPET_CHARS,
};
use crate::fingerprint::compute_fingerprint;
use crate::gate::IndexRebuilder;
use crate::layout::{project_identity, IndexLayout, METADATA_FILE_NAME};
use crate::metadata_io::write_metadata;
use async_trait::async_trait;
use atlas_fact_store::{FactStore, JsonlFactStore, StoreOptions, FACT_DB_FILE_NAME};
use atlas_parser::{Language, SourceParser};
use atlas_protocol::{
    AtlasError, Fact, IndexMetadata, IndexOutput, IndexState, NodeId, NodeKind, Predicate,
    Result, INDEX_SCHEMA_VERSION,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Top-level manifests that mark a project root.
const ROOT_MANIFESTS: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
    "pom.xml",
];

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub db_root: PathBuf,
    pub collector: CollectorConfig,
    pub signature_snippet_chars: usize,
}

impl BuildConfig {
    #[must_use]
    pub fn new(db_root: impl Into<PathBuf>) -> Self {
        Self {
            db_root: db_root.into(),
            collector: CollectorConfig::default(),
            signature_snippet_chars: SIGNATURE_SNIPPET_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub metadata: IndexMetadata,
    pub processed_file_count: usize,
}

/// Orchestrates one full graph build: collect, parse, extract, emit,
/// publish.
///
/// Every build runs in a shadow directory and replaces the published index
/// wholesale; a previously published graph is never mutated in place.
pub struct GraphBuilder {
    config: BuildConfig,
    parser: SourceParser,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            parser: SourceParser::new(),
        }
    }

    pub async fn build(&self, project_root: &Path) -> Result<BuildOutcome> {
        let project_root = project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.to_path_buf());
        let identity = project_identity(&project_root);
        log::info!("building graph for {} ({identity})", project_root.display());

        let collector_config = self.config.collector.clone();
        let root = project_root.clone();
        let collected =
            tokio::task::spawn_blocking(move || collect_files(&root, &collector_config))
                .await
                .map_err(|err| AtlasError::internal(format!("collector task failed: {err}")))??;

        let layout = IndexLayout::new(&self.config.db_root);
        let temp_dir = layout.temp_build_dir(&identity);
        tokio::fs::create_dir_all(&temp_dir).await?;

        let outcome = self
            .build_in_dir(&project_root, &identity, &temp_dir, &collected)
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                // Failed shadow builds leave the published index untouched.
                let _ = tokio::fs::remove_dir_all(&temp_dir).await;
                return Err(err);
            }
        };

        // Publish: remove the old index, then move the shadow build into
        // place. A crash between the two loses the index; this window is
        // accepted rather than papered over.
        let published = layout.project_dir(&identity);
        if published.exists() {
            tokio::fs::remove_dir_all(&published).await?;
        }
        tokio::fs::rename(&temp_dir, &published).await?;

        log::info!(
            "published graph for {identity}: {} files, fingerprint {}",
            outcome.metadata.file_count,
            outcome.metadata.fingerprint.value
        );
        Ok(outcome)
    }

    async fn build_in_dir(
        &self,
        project_root: &Path,
        identity: &str,
        temp_dir: &Path,
        collected: &CollectedFiles,
    ) -> Result<BuildOutcome> {
        let db_path = temp_dir.join(FACT_DB_FILE_NAME);
        let mut store = JsonlFactStore::open(&db_path, StoreOptions::create()).await?;

        let emit_result = self.emit_facts(&mut store, identity, collected).await;
        let close_result = store.close().await;
        emit_result?;
        close_result?;

        let fingerprint = compute_fingerprint(project_root).await;
        let metadata = IndexMetadata {
            schema_version: INDEX_SCHEMA_VERSION,
            state: IndexState::Complete,
            project_path: project_root.to_string_lossy().into_owned(),
            project_hash: identity.to_string(),
            indexed_at_unix_ms: unix_now_ms(),
            file_count: collected.processed.len(),
            fingerprint,
            output: IndexOutput {
                db_file: FACT_DB_FILE_NAME.to_string(),
            },
        };
        write_metadata(&temp_dir.join(METADATA_FILE_NAME), &metadata).await?;

        Ok(BuildOutcome {
            metadata,
            processed_file_count: collected.processed.len(),
        })
    }

    async fn emit_facts(
        &self,
        store: &mut JsonlFactStore,
        identity: &str,
        collected: &CollectedFiles,
    ) -> Result<()> {
        let project_id = NodeId::project(identity).encode();
        let mut depended_packages = HashSet::new();

        for path in &collected.safe_file_paths {
            let file_id = NodeId::file(path).encode();
            store
                .add_fact(&Fact::new(&project_id, Predicate::Contains, &file_id))
                .await?;
        }

        if let Some(manifest) = ROOT_MANIFESTS
            .iter()
            .find(|m| collected.safe_file_paths.iter().any(|p| p == *m))
        {
            store
                .add_fact(&Fact::new(
                    &project_id,
                    Predicate::HasRoot,
                    NodeId::file(*manifest).encode(),
                ))
                .await?;
        }

        for file in &collected.processed {
            let Some(language) = self.parser.detect_language(&file.path) else {
                continue;
            };
            self.emit_file_facts(store, &project_id, file.path.as_str(), &file.content, language, &mut depended_packages)
                .await?;
        }

        store.flush().await?;
        Ok(())
    }

    async fn emit_file_facts(
        &self,
        store: &mut JsonlFactStore,
        project_id: &str,
        path: &str,
        content: &str,
        language: Language,
        depended_packages: &mut HashSet<String>,
    ) -> Result<()> {
        let parsed = self.parser.parse_file(path, content, language);
        let file_id = NodeId::file(path).encode();

        // First pass: definitions, so calls and inheritance can resolve
        // against this file's own names.
        let mut defined: HashMap<String, NodeId> = HashMap::new();
        let mut entities = Vec::new();
        for span in &parsed.entities {
            let Some(name) = extract_entity_name(&span.text) else {
                log::debug!("no name extracted for a span in {path}");
                continue;
            };
            let kind = infer_entity_kind(&span.text);
            let id = NodeId::entity(kind, path, &name);

            let mut props = Map::new();
            props.insert("name".into(), Value::String(name.clone()));
            props.insert("type".into(), Value::String(kind.as_str().to_string()));
            props.insert("language".into(), Value::String(parsed.language.clone()));
            props.insert(
                "signature".into(),
                Value::String(signature_snippet(&span.text, self.config.signature_snippet_chars)),
            );
            props.insert("startLine".into(), Value::Number(span.start_line.into()));
            props.insert("endLine".into(), Value::Number(span.end_line.into()));

            store
                .add_fact(
                    &Fact::new(&file_id, Predicate::Defines, id.encode()).with_properties(props),
                )
                .await?;

            defined.entry(name).or_insert_with(|| id.clone());
            entities.push((id, kind, span));
        }

        // Second pass: relationships between the definitions.
        for (id, kind, span) in &entities {
            match kind {
                NodeKind::Function | NodeKind::Method => {
                    for callee in extract_callees(&span.text) {
                        // Same-file resolution only: calls into other files
                        // are indistinguishable by name and stay unlinked.
                        if let Some(target) = defined.get(&callee) {
                            store
                                .add_fact(&Fact::new(
                                    id.encode(),
                                    Predicate::Calls,
                                    target.encode(),
                                ))
                                .await?;
                        }
                    }
                }
                NodeKind::Class => {
                    if let Some(parent) = extract_extends(&span.text) {
                        let object = defined
                            .get(&parent)
                            .cloned()
                            .unwrap_or_else(|| NodeId::entity(NodeKind::Class, path, &parent));
                        store
                            .add_fact(&Fact::new(id.encode(), Predicate::Extends, object.encode()))
                            .await?;
                    }
                    for interface in extract_implements(&span.text) {
                        let object = defined.get(&interface).cloned().unwrap_or_else(|| {
                            NodeId::entity(NodeKind::Interface, path, &interface)
                        });
                        store
                            .add_fact(&Fact::new(
                                id.encode(),
                                Predicate::Implements,
                                object.encode(),
                            ))
                            .await?;
                    }
                }
                _ => {}
            }
        }

        for import in &parsed.imports {
            let source = parse_import_path(&import.statement)
                .unwrap_or_else(|| import.source.clone());
            match resolve_import(path, &source) {
                ImportTarget::File(target) => {
                    store
                        .add_fact(&Fact::new(
                            &file_id,
                            Predicate::Imports,
                            NodeId::file(target).encode(),
                        ))
                        .await?;
                }
                ImportTarget::Package(name) => {
                    let package_id = NodeId::package(&name).encode();
                    store
                        .add_fact(&Fact::new(&file_id, Predicate::Imports, &package_id))
                        .await?;
                    if depended_packages.insert(name) {
                        store
                            .add_fact(&Fact::new(project_id, Predicate::DependsOn, &package_id))
                            .await?;
                    }
                }
            }
        }

        for export in &parsed.exports {
            if export.source.is_some() {
                continue;
            }
            for name in &export.names {
                if let Some(entity) = defined.get(name) {
                    store
                        .add_fact(&Fact::new(&file_id, Predicate::Exports, entity.encode()))
                        .await?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl IndexRebuilder for GraphBuilder {
    async fn rebuild(&self, project_root: &Path) -> Result<IndexMetadata> {
        Ok(self.build(project_root).await?.metadata)
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
