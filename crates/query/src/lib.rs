//! # Atlas Query
//!
//! Fact queries and the five traversal algorithms over a published graph.
//!
//! ## Architecture
//!
//! ```text
//! QueryEngine
//!     │   gate-validated, one store handle per call
//!     │
//!     ├──> Fact queries (typed filter + pagination, raw pass-through)
//!     │
//!     └──> Traversals
//!            ├─ CallHierarchy     callers/callees tree, cycle safe
//!            ├─ ImpactAnalysis    blast radius + risk heuristic
//!            ├─ RelatedFiles      weighted edge scoring
//!            ├─ Definitions      ranked symbol lookup
//!            └─ References       grouped usage aggregation
//! ```
//!
//! Algorithms are explicit worklists over store queries: no recursion, an
//! owned visited set per call, depth bounded by caller parameters. They
//! never touch the store directly from outside this crate's engine.

mod config;
mod definitions;
mod engine;
mod facts;
mod hierarchy;
mod impact;
mod raw;
mod references;
mod related;

pub use config::{
    ConfidenceWeights, DefinitionConfig, HierarchyConfig, ImpactConfig, QueryConfig,
    RelatedFilesConfig, RelationWeights, RiskCutoffs,
};
pub use definitions::{find_definitions, DefinitionMatch, DefinitionQuery, MatchMode};
pub use engine::QueryEngine;
pub use facts::{find_facts, FactPage, Page};
pub use hierarchy::{build_call_hierarchy, CallHierarchy, CallTreeNode, Direction};
pub use impact::{analyze_impact, ImpactReport, RiskLevel};
pub use raw::{run_raw_query, NormalizedRecord, RawQueryResult};
pub use references::{find_references, FileReferences, Reference, ReferenceKind, ReferencesReport};
pub use related::{score_related_files, RelatedFile};
