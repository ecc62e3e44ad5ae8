use atlas_protocol::GitFingerprint;
use std::path::Path;

/// Compute the version-control fingerprint of a working tree.
///
/// Outside version control (or when git is unavailable) the fingerprint
/// degrades to the `filesystem` value with `dirty = false`.
pub async fn compute_fingerprint(project_root: &Path) -> GitFingerprint {
    let Some(commit) = git_stdout(project_root, &["rev-parse", "HEAD"]).await else {
        return GitFingerprint::new(None, None, false);
    };

    let branch = git_stdout(project_root, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await
        .filter(|b| b != "HEAD");

    let dirty = match git_raw(project_root, &["status", "--porcelain"]).await {
        Some(stdout) => !stdout.trim().is_empty(),
        None => false,
    };

    GitFingerprint::new(Some(commit), branch, dirty)
}

async fn git_stdout(project_root: &Path, args: &[&str]) -> Option<String> {
    git_raw(project_root, args)
        .await
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

async fn git_raw(project_root: &Path, args: &[&str]) -> Option<String> {
    let output = tokio::process::Command::new("git")
        .arg("-C")
        .arg(project_root)
        .args(args)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
