//! Incremental build cache: `<outDir>/.air-cache/manifest.json`.
//!
//! A clean build must produce the same file set with or without this
//! cache — it only decides which files can be skipped because their
//! content hasn't changed since the last run. Writes are atomic
//! (temp file + rename) so a crash mid-write can never leave a
//! half-written manifest behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: u32 = 1;

/// `<outDir>/.air-cache/manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub source_hash: String,
    pub files: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// What changed between the previous manifest and this transpile's
/// output set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDiff {
    pub changed: Vec<String>,
    pub skipped: Vec<String>,
    pub removed: Vec<String>,
}

fn manifest_path(out_dir: &Path) -> PathBuf {
    out_dir.join(".air-cache").join("manifest.json")
}

/// Load the previous manifest from `<outDir>/.air-cache/manifest.json`,
/// if present and well-formed. A missing or corrupt manifest is treated
/// as "no prior cache" rather than an error — the cache is purely an
/// optimization.
#[must_use]
pub fn load(out_dir: &Path) -> Option<Manifest> {
    let path = manifest_path(out_dir);
    let contents = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "discarding unreadable cache manifest");
            None
        }
    }
}

/// Diff `new_files` (path → file contents) against the previous
/// manifest and build the manifest that should be written for this run.
///
/// A file is `skipped` when its path was present before with the same
/// `hash16`; otherwise it's `changed`. Paths present in the old
/// manifest but absent from `new_files` are `removed`.
#[must_use]
pub fn diff(
    previous: Option<&Manifest>,
    source_hash: &str,
    new_files: &[(String, String)],
) -> (Manifest, CacheDiff) {
    let mut files = BTreeMap::new();
    let mut report = CacheDiff::default();

    for (path, content) in new_files {
        let hash = air_diagnostics::hash16(content);
        let was_unchanged = previous
            .and_then(|m| m.files.get(path))
            .is_some_and(|prev_hash| prev_hash == &hash);
        if was_unchanged {
            report.skipped.push(path.clone());
        } else {
            report.changed.push(path.clone());
        }
        files.insert(path.clone(), hash);
    }

    if let Some(previous) = previous {
        for path in previous.files.keys() {
            if !files.contains_key(path) {
                report.removed.push(path.clone());
            }
        }
    }

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        source_hash: source_hash.to_string(),
        files,
        timestamp: Utc::now(),
    };
    (manifest, report)
}

/// Write the manifest atomically: write to a pid-suffixed temp file in
/// the same directory, then rename over the target path.
pub fn write_atomic(out_dir: &Path, manifest: &Manifest) -> io::Result<()> {
    let path = manifest_path(out_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let tmp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_has_no_skips() {
        let files = vec![("a.txt".to_string(), "hello".to_string())];
        let (_, report) = diff(None, "srchash", &files);
        assert_eq!(report.changed, vec!["a.txt".to_string()]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn unchanged_content_is_skipped_on_second_run() {
        let files = vec![("a.txt".to_string(), "hello".to_string())];
        let (first, _) = diff(None, "srchash", &files);
        let (_, report) = diff(Some(&first), "srchash", &files);
        assert_eq!(report.skipped, vec!["a.txt".to_string()]);
        assert!(report.changed.is_empty());
    }

    #[test]
    fn removed_file_is_reported() {
        let files = vec![("a.txt".to_string(), "hello".to_string())];
        let (first, _) = diff(None, "srchash", &files);
        let (_, report) = diff(Some(&first), "srchash", &[]);
        assert_eq!(report.removed, vec!["a.txt".to_string()]);
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![("a.txt".to_string(), "hello".to_string())];
        let (manifest, _) = diff(None, "srchash", &files);
        write_atomic(dir.path(), &manifest).unwrap();
        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.source_hash, "srchash");
        assert_eq!(loaded.files.get("a.txt"), manifest.files.get("a.txt"));
    }

    #[test]
    fn corrupt_manifest_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".air-cache")).unwrap();
        fs::write(dir.path().join(".air-cache/manifest.json"), "not json").unwrap();
        assert!(load(dir.path()).is_none());
    }
}
