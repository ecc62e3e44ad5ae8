//! # Atlas Protocol
//!
//! Shared domain types for the code fact graph.
//!
//! ## Fact model
//!
//! ```text
//! NodeId ──(Predicate)──> NodeId      one Fact (edge), optional properties
//!     │
//!     ├─ project:my-app-3f9ac2d1      project/package scoped
//!     ├─ file:src/auth.ts
//!     ├─ package:lodash
//!     └─ function:src/auth.ts#login   file scoped entity
//! ```
//!
//! A published index is described by [`IndexMetadata`], stamped with the
//! [`GitFingerprint`] of the working tree it was built from. All crates in
//! the workspace share the [`AtlasError`] taxonomy.

mod error;
mod fact;
mod metadata;
mod node;

pub use error::{AtlasError, Result};
pub use fact::{Fact, FactFilter, Predicate};
pub use metadata::{
    GitFingerprint, IndexMetadata, IndexOutput, IndexState, INDEX_SCHEMA_VERSION,
};
pub use node::{NodeId, NodeKind};
