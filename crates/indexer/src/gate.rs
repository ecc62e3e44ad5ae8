use crate::fingerprint::compute_fingerprint;
use crate::layout::{project_identity, IndexLayout};
use crate::metadata_io::read_metadata;
use async_trait::async_trait;
use atlas_protocol::{AtlasError, IndexMetadata, IndexState, Result};
use std::path::Path;
use std::sync::Arc;

/// Rebuild callback the gate may invoke on a fingerprint mismatch.
#[async_trait]
pub trait IndexRebuilder: Send + Sync {
    async fn rebuild(&self, project_root: &Path) -> Result<IndexMetadata>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GateConfig {
    pub auto_rebuild: bool,
}

/// Decides whether a published graph is still valid for the current tree.
///
/// State machine: `NoIndex → (build) → Fresh → (tree changes) → Stale →
/// (rebuild) → Fresh`. Failure states surface as errors, never as
/// persisted index state.
pub struct FingerprintGate {
    layout: IndexLayout,
    config: GateConfig,
    rebuilder: Option<Arc<dyn IndexRebuilder>>,
}

impl FingerprintGate {
    #[must_use]
    pub fn new(layout: IndexLayout) -> Self {
        Self {
            layout,
            config: GateConfig::default(),
            rebuilder: None,
        }
    }

    /// Enable the single-attempt auto rebuild path.
    #[must_use]
    pub fn with_auto_rebuild(mut self, rebuilder: Arc<dyn IndexRebuilder>) -> Self {
        self.config.auto_rebuild = true;
        self.rebuilder = Some(rebuilder);
        self
    }

    /// Validate the published index for `project_root`.
    ///
    /// Fails with [`AtlasError::IndexNotFound`] when no completed build
    /// exists, and [`AtlasError::FingerprintMismatch`] when the tree moved
    /// since the stored build. With auto rebuild enabled the rebuilder runs
    /// once; its failure is folded into the mismatch error (no retry loop).
    pub async fn validate(&self, project_root: &Path) -> Result<IndexMetadata> {
        let identity = project_identity(project_root);
        let metadata_path = self.layout.metadata_path(&identity);

        let metadata = read_metadata(&metadata_path)
            .await?
            .ok_or_else(|| AtlasError::IndexNotFound(identity.clone()))?;
        if metadata.state != IndexState::Complete {
            return Err(AtlasError::IndexNotFound(identity.clone()));
        }

        let current = compute_fingerprint(project_root).await;
        if current.value == metadata.fingerprint.value {
            return Ok(metadata);
        }

        log::info!(
            "index for {identity} is stale (stored {}, current {})",
            metadata.fingerprint.value,
            current.value
        );

        if self.config.auto_rebuild {
            if let Some(rebuilder) = &self.rebuilder {
                return match rebuilder.rebuild(project_root).await {
                    Ok(fresh) => Ok(fresh),
                    Err(err) => Err(AtlasError::FingerprintMismatch {
                        stored: metadata.fingerprint.value.clone(),
                        current: current.value,
                        rebuild_error: Some(err.to_string()),
                    }),
                };
            }
        }

        Err(AtlasError::FingerprintMismatch {
            stored: metadata.fingerprint.value.clone(),
            current: current.value,
            rebuild_error: None,
        })
    }
}
