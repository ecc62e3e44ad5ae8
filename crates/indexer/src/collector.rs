use atlas_protocol::Result;
use std::collections::HashMap;
use std::path::Path;

/// Limits applied while enumerating project files.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Files larger than this are listed but not read.
    pub max_file_bytes: u64,
    pub include_hidden: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// Project-relative path with `/` separators.
    pub path: String,
    pub content: String,
}

/// Everything the collector learned about a project tree.
#[derive(Debug, Clone, Default)]
pub struct CollectedFiles {
    /// Files that were read successfully, sorted by path.
    pub processed: Vec<CollectedFile>,
    /// Every enumerated file path, including skipped ones.
    pub safe_file_paths: Vec<String>,
    pub sizes: HashMap<String, u64>,
    pub token_counts: HashMap<String, usize>,
}

/// Enumerate and read project files, honoring `.gitignore`.
///
/// Oversized and non-UTF-8 files are skipped (but still enumerated); the
/// result is sorted for deterministic builds.
pub fn collect_files(root: &Path, config: &CollectorConfig) -> Result<CollectedFiles> {
    let mut out = CollectedFiles::default();

    let walker = ignore::WalkBuilder::new(root)
        .hidden(!config.include_hidden)
        .require_git(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let relative = normalize_path(root, entry.path());
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        out.safe_file_paths.push(relative.clone());
        out.sizes.insert(relative.clone(), size);

        if size > config.max_file_bytes {
            log::debug!("skipping oversized file {relative} ({size} bytes)");
            continue;
        }

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => {
                // Rough token estimate, enough for budget accounting.
                out.token_counts.insert(relative.clone(), content.len() / 4);
                out.processed.push(CollectedFile {
                    path: relative,
                    content,
                });
            }
            Err(err) => {
                log::debug!("skipping non-text file {relative}: {err}");
            }
        }
    }

    out.processed.sort_by(|a, b| a.path.cmp(&b.path));
    out.safe_file_paths.sort();
    Ok(out)
}

fn normalize_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collects_sorted_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/b.ts"), "export const b = 1;").unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const a = 1;").unwrap();

        let out = collect_files(dir.path(), &CollectorConfig::default()).unwrap();
        let paths: Vec<&str> = out.processed.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.ts", "src/b.ts"]);
        assert_eq!(out.sizes["a.ts"], 19);
        assert!(out.token_counts.contains_key("src/b.ts"));
    }

    #[test]
    fn oversized_files_are_enumerated_but_not_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("big.ts"), "x".repeat(64)).unwrap();

        let config = CollectorConfig {
            max_file_bytes: 16,
            ..CollectorConfig::default()
        };
        let out = collect_files(dir.path(), &config).unwrap();
        assert!(out.processed.is_empty());
        assert_eq!(out.safe_file_paths, vec!["big.ts"]);
    }

    #[test]
    fn respects_gitignore() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "ignored.ts\n").unwrap();
        std::fs::write(dir.path().join("ignored.ts"), "nope").unwrap();
        std::fs::write(dir.path().join("kept.ts"), "yes").unwrap();

        let out = collect_files(dir.path(), &CollectorConfig::default()).unwrap();
        let paths: Vec<&str> = out.processed.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"kept.ts"));
        assert!(!paths.contains(&"ignored.ts"));
    }
}
