//! Per-run audit artifact writer: `.air-artifacts/<iso-timestamp>/`
//! (`spec.md` §6, persisted state layout). Timestamp directories use
//! ISO-8601 with `:` and `.` replaced by `-` so the path is valid on
//! every target filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use air_diagnostics::DiagnosticResult;
use chrono::{DateTime, Utc};

use crate::retry::RepairLoopOutcome;
use crate::LoopResult;

#[must_use]
pub fn artifact_dir_name(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339().replace(':', "-").replace('.', "-")
}

pub fn write(
    artifacts_root: &Path,
    timestamp: DateTime<Utc>,
    before: &DiagnosticResult,
    after: &DiagnosticResult,
    repair_outcome: Option<&RepairLoopOutcome>,
    result: &LoopResult,
) -> io::Result<PathBuf> {
    let dir = artifacts_root.join(artifact_dir_name(timestamp));
    fs::create_dir_all(&dir)?;

    write_json(&dir.join("before_diagnostics.json"), before)?;
    write_json(&dir.join("after_diagnostics.json"), after)?;

    if let Some(outcome) = repair_outcome {
        write_json(&dir.join("repair_actions.json"), &outcome.attempts)?;
        if let Some(last) = &outcome.last_result {
            write_json(&dir.join("repair_result.json"), last)?;
        }
        fs::write(dir.join("repaired_source.air"), &outcome.final_source)?;
    }

    write_json(&dir.join("stage_report.json"), &result.stages)?;
    write_json(&dir.join("output_hashes.json"), &result.determinism_check)?;
    write_json(&dir.join("loop_result.json"), result)?;

    Ok(dir)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}
