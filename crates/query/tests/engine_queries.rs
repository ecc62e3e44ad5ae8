//! End-to-end query tests: build a real project graph, then drive every
//! engine operation through the fingerprint gate.

use atlas_indexer::{BuildConfig, FingerprintGate, GraphBuilder, IndexLayout};
use atlas_protocol::{AtlasError, FactFilter, Predicate};
use atlas_query::{
    DefinitionQuery, Direction, MatchMode, Page, QueryConfig, QueryEngine, RiskLevel,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn build_demo_project(project: &Path, db_root: &Path) {
    std::fs::write(
        project.join("auth.ts"),
        "import { hash } from './crypto';\n\
         export function login(user) {\n  return checkPassword(user);\n}\n\
         function checkPassword(user) {\n  return verify(user);\n}\n\
         function verify(user) {\n  return true;\n}\n",
    )
    .unwrap();
    std::fs::write(
        project.join("crypto.ts"),
        "export function hash(value) {\n  return value;\n}\n",
    )
    .unwrap();
    std::fs::write(
        project.join("auth.test.ts"),
        "import { login } from './auth';\n",
    )
    .unwrap();

    let builder = GraphBuilder::new(BuildConfig::new(db_root));
    builder.build(project).await.unwrap();
}

fn engine(db_root: &Path) -> QueryEngine {
    QueryEngine::new(IndexLayout::new(db_root), QueryConfig::default())
}

#[tokio::test]
async fn typed_queries_paginate_honestly() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let filter = FactFilter::predicate(Predicate::Defines);

    let page = engine
        .find_facts(project.path(), &filter, Page { offset: 0, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page.facts.len(), 2);
    assert!(page.has_more);

    let rest = engine
        .find_facts(project.path(), &filter, Page { offset: 2, limit: 50 })
        .await
        .unwrap();
    assert!(!rest.has_more);
}

#[tokio::test]
async fn empty_filter_is_a_validation_error() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let err = engine
        .find_facts(project.path(), &FactFilter::default(), Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::Validation(_)));
}

#[tokio::test]
async fn queries_refuse_a_missing_index() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();

    let engine = engine(db_root.path());
    let err = engine
        .find_facts(
            project.path(),
            &FactFilter::predicate(Predicate::Defines),
            Page::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::IndexNotFound(_)));
}

#[tokio::test]
async fn call_hierarchy_walks_same_file_chains() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let tree = engine
        .call_hierarchy(
            project.path(),
            "function:auth.ts#login",
            Direction::Callees,
            5,
        )
        .await
        .unwrap();

    assert_eq!(tree.root.name, "login");
    assert_eq!(tree.root.children.len(), 1);
    assert_eq!(tree.root.children[0].name, "checkPassword");
    assert_eq!(tree.root.children[0].children[0].name, "verify");
    assert_eq!(tree.max_depth_reached, 2);
}

#[tokio::test]
async fn impact_reports_callers_and_tests() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let report = engine
        .impact(project.path(), "function:auth.ts#verify", 5)
        .await
        .unwrap();

    assert_eq!(report.direct_callers, vec!["function:auth.ts#checkPassword"]);
    assert_eq!(report.indirect_callers, vec!["function:auth.ts#login"]);
    assert_eq!(report.affected_files, vec!["auth.ts"]);
    // auth.test.ts exists, so the affected file counts as covered.
    assert_eq!(report.test_files, vec!["auth.test.ts"]);
    assert_eq!(report.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn related_files_rank_imports_first() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let related = engine
        .related_files(project.path(), "auth.ts")
        .await
        .unwrap();

    assert!(!related.is_empty());
    assert_eq!(related[0].score, 1.0);
    let files: Vec<&str> = related.iter().map(|r| r.file.as_str()).collect();
    assert!(files.contains(&"crypto.ts"));
    assert!(files.contains(&"auth.test.ts"));
}

#[tokio::test]
async fn definitions_resolve_exactly() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let results = engine
        .definitions(project.path(), &DefinitionQuery::exact("login"))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "function:auth.ts#login");
    assert!(results[0].confidence >= 0.9);

    let fuzzy = engine
        .definitions(
            project.path(),
            &DefinitionQuery {
                mode: MatchMode::Fuzzy,
                case_sensitive: false,
                ..DefinitionQuery::exact("chekPassword")
            },
        )
        .await
        .unwrap();
    assert_eq!(fuzzy[0].name, "checkPassword");
}

#[tokio::test]
async fn references_group_by_file() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let report = engine
        .references(project.path(), "verify", None)
        .await
        .unwrap();

    assert_eq!(report.definition.as_deref(), Some("function:auth.ts#verify"));
    assert!(report.total >= 1);
    let auth = report
        .files
        .iter()
        .find(|f| f.file == "auth.ts")
        .expect("caller file grouped");
    assert!(auth
        .references
        .iter()
        .any(|r| r.from == "function:auth.ts#checkPassword"));
}

#[tokio::test]
async fn raw_queries_pass_through_read_only() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    let engine = engine(db_root.path());
    let result = engine
        .raw_query(project.path(), r#"{"predicate":"IMPORTS"}"#)
        .await
        .unwrap();
    assert!(!result.records.is_empty());
    assert!(result.records.iter().all(|r| r.predicate.as_deref() == Some("IMPORTS")));
}

#[tokio::test]
async fn stale_index_triggers_auto_rebuild_when_wired() {
    let project = TempDir::new().unwrap();
    let db_root = TempDir::new().unwrap();
    build_demo_project(project.path(), db_root.path()).await;

    // A stale graph: the stored metadata claims a different fingerprint.
    let layout = IndexLayout::new(db_root.path());
    let identity = atlas_indexer::project_identity(project.path());
    let metadata_path = layout.metadata_path(&identity);
    let mut metadata = atlas_indexer::read_metadata(&metadata_path)
        .await
        .unwrap()
        .unwrap();
    metadata.fingerprint.value = "stale-value".into();
    atlas_indexer::write_metadata(&metadata_path, &metadata)
        .await
        .unwrap();

    // Without auto rebuild: mismatch.
    let plain = engine(db_root.path());
    let err = plain
        .find_facts(
            project.path(),
            &FactFilter::predicate(Predicate::Defines),
            Page::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::FingerprintMismatch { .. }));

    // With a builder wired in, the gate rebuilds once and the query runs.
    let builder = Arc::new(GraphBuilder::new(BuildConfig::new(db_root.path())));
    let gate = FingerprintGate::new(layout.clone()).with_auto_rebuild(builder);
    let engine = QueryEngine::with_gate(layout, gate, QueryConfig::default());
    let page = engine
        .find_facts(
            project.path(),
            &FactFilter::predicate(Predicate::Defines),
            Page::default(),
        )
        .await
        .unwrap();
    assert!(!page.facts.is_empty());
}
