use atlas_protocol::{IndexMetadata, Result};
use std::path::Path;

/// Read index metadata, `None` when it does not exist.
pub async fn read_metadata(path: &Path) -> Result<Option<IndexMetadata>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write index metadata atomically (tmp file + rename).
pub async fn write_metadata(path: &Path, metadata: &IndexMetadata) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(metadata)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
