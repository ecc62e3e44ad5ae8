//! # Atlas Indexer
//!
//! Graph build pipeline with a fingerprint-gated lifecycle.
//!
//! ## Pipeline
//!
//! ```text
//! Project directory
//!     │
//!     ├──> File collector (.gitignore aware)
//!     │      └─> {path, content} + size/token metrics
//!     │
//!     ├──> Language detection + span parsing
//!     │      └─> raw entity spans, imports, exports
//!     │
//!     ├──> Heuristic extraction
//!     │      ├─ entity kind + name
//!     │      ├─ call sites, extends/implements
//!     │      └─ import resolution
//!     │
//!     └──> Fact emission into a shadow directory
//!            └─> metadata write, then atomic publish
//! ```
//!
//! The [`FingerprintGate`] decides whether a published graph is still valid
//! for the current working tree and can trigger a single rebuild attempt.

mod builder;
mod collector;
mod extract;
mod fingerprint;
mod gate;
mod layout;
mod metadata_io;

pub use builder::{BuildConfig, BuildOutcome, GraphBuilder};
pub use collector::{collect_files, CollectedFile, CollectedFiles, CollectorConfig};
pub use extract::{ImportTarget, IMPORT_EXTENSION_GUESSES, SIGNATURE_SNIPPET_CHARS};
pub use fingerprint::compute_fingerprint;
pub use gate::{FingerprintGate, GateConfig, IndexRebuilder};
pub use layout::{project_identity, IndexLayout, METADATA_FILE_NAME};
pub use metadata_io::{read_metadata, write_metadata};
