//! `_airengine_manifest.json` generation (`spec.md` §4.6.7): one
//! content hash per output file, for the incremental cache and for
//! determinism verification. The manifest's `timestamp` field is the
//! only non-deterministic part of the whole output set; callers must
//! exclude it from determinism comparisons, never the manifest file
//! itself.

use crate::OutputFile;
use air_diagnostics::hash16;
use chrono::Utc;
use serde::Serialize;

const GENERATED_BY: &str = "AirEngine";
const MANIFEST_VERSION: &str = "1.0";
pub const MANIFEST_PATH: &str = "_airengine_manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub hash: String,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    #[serde(rename = "generatedBy")]
    pub generated_by: String,
    pub version: String,
    #[serde(rename = "sourceHash")]
    pub source_hash: String,
    pub files: Vec<ManifestEntry>,
    pub timestamp: String,
}

pub fn generate(files: &[OutputFile], source_hash: &str) -> OutputFile {
    let mut entries: Vec<ManifestEntry> = files
        .iter()
        .map(|f| ManifestEntry {
            path: f.path.clone(),
            hash: hash16(&f.content),
            lines: f.content.lines().count(),
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let manifest = Manifest {
        generated_by: GENERATED_BY.to_string(),
        version: MANIFEST_VERSION.to_string(),
        source_hash: source_hash.to_string(),
        files: entries,
        timestamp: Utc::now().to_rfc3339(),
    };

    let content = serde_json::to_string_pretty(&manifest)
        .unwrap_or_else(|_| "{}".to_string())
        + "\n";

    OutputFile {
        path: MANIFEST_PATH.to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_files_in_sorted_order() {
        let files = vec![
            OutputFile {
                path: "b.txt".into(),
                content: "b".into(),
            },
            OutputFile {
                path: "a.txt".into(),
                content: "a".into(),
            },
        ];
        let manifest = generate(&files, "deadbeef");
        let a_pos = manifest.content.find("a.txt").unwrap();
        let b_pos = manifest.content.find("b.txt").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn manifest_carries_source_hash_and_file_count() {
        let files = vec![OutputFile {
            path: "x.txt".into(),
            content: "hello\nworld".into(),
        }];
        let manifest = generate(&files, "abc123");
        assert!(manifest.content.contains("\"sourceHash\": \"abc123\""));
        assert!(manifest.content.contains("\"lines\": 2"));
    }
}
