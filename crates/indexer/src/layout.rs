use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const METADATA_FILE_NAME: &str = "metadata.json";

static BUILD_NONCE: AtomicU64 = AtomicU64::new(0);

/// Collision-resistant project identity: `<slug>-<hash8>`.
///
/// The slug is the lower-cased basename with non-alphanumerics collapsed
/// to `-` (human readable); the hash suffix comes from the canonicalized
/// absolute path, so two projects sharing a basename get distinct
/// identities.
#[must_use]
pub fn project_identity(project_root: &Path) -> String {
    let canonical = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.to_path_buf());

    let basename = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let mut slug = String::with_capacity(basename.len());
    let mut last_dash = true;
    for c in basename.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "project" } else { slug };

    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let hash8: String = digest
        .iter()
        .take(4)
        .map(|b| format!("{b:02x}"))
        .collect();

    format!("{slug}-{hash8}")
}

/// On-disk layout of published indexes under one database root.
///
/// ```text
/// <db_root>/
///   <identity>/              published index (metadata.json + store file)
///   tmp/<identity>-<nonce>/  in-flight shadow builds
/// ```
#[derive(Debug, Clone)]
pub struct IndexLayout {
    db_root: PathBuf,
}

impl IndexLayout {
    #[must_use]
    pub fn new(db_root: impl Into<PathBuf>) -> Self {
        Self {
            db_root: db_root.into(),
        }
    }

    #[must_use]
    pub fn db_root(&self) -> &Path {
        &self.db_root
    }

    #[must_use]
    pub fn project_dir(&self, identity: &str) -> PathBuf {
        self.db_root.join(identity)
    }

    #[must_use]
    pub fn metadata_path(&self, identity: &str) -> PathBuf {
        self.project_dir(identity).join(METADATA_FILE_NAME)
    }

    /// A unique directory for one shadow build.
    #[must_use]
    pub fn temp_build_dir(&self, identity: &str) -> PathBuf {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let nonce = BUILD_NONCE.fetch_add(1, Ordering::Relaxed);
        self.db_root
            .join("tmp")
            .join(format!("{identity}-{unix_ms}-{}-{nonce}", std::process::id()))
    }
}
