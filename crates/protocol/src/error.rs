use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtlasError>;

/// Shared error taxonomy for the workspace.
///
/// Operational errors describe expected, client-facing conditions; anything
/// else is an internal failure wrapping its cause.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no completed index for {0}")]
    IndexNotFound(String),

    #[error("index fingerprint mismatch (stored {stored}, current {current})")]
    FingerprintMismatch {
        stored: String,
        current: String,
        /// Set when an auto-rebuild was attempted and failed.
        rebuild_error: Option<String>,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AtlasError {
    /// Expected condition the caller can act on, as opposed to a bug.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }
}

impl From<std::io::Error> for AtlasError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}
