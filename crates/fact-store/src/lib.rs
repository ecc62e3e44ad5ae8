//! # Atlas Fact Store
//!
//! Storage contract for the fact graph, plus the embedded JSONL-backed
//! reference store the build pipeline publishes into.
//!
//! ## Contract
//!
//! ```text
//! open(path, opts) ─> handle
//!     ├─ add_fact(edge)           append-only within a build
//!     ├─ find(filter)             typed pattern query
//!     ├─ raw_query(query, ro)     opaque query, read-only pass-through
//!     ├─ flush()                  persist pending appends
//!     └─ close()                  release the handle
//! ```
//!
//! Handles are opened per top-level operation and never pooled; the store
//! does not provide concurrent-writer safety (callers serialize builds).

mod jsonl;
mod memory;
mod store;

pub use jsonl::JsonlFactStore;
pub use memory::MemoryFactStore;
pub use store::{FactStore, RawQueryOutput, StoreOptions, FACT_DB_FILE_NAME};
