//! The agent loop (`spec.md` §4.8): sequences validate → repair →
//! transpile → smoke → determinism over one AIR source, writes the
//! resulting files, and records an audit artifact per run.

mod artifacts;
mod retry;
mod stages;

pub use stages::{DeterminismCheck, LoopStage, LoopStageName, RepairAttempt, StageStatus, StopReason};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use air_config::{LoopOptions, RepairMode};
use air_diagnostics::{build_result, hash16, hash_source, DiagnosticResult};
use air_repair::{DeterministicAdapter, RepairAdapter};
use air_transpile::TranspileResult;
use serde::Serialize;

/// A condensed view of a [`TranspileResult`] suitable for embedding in
/// the audit artifact — file contents already live under `outputDir`,
/// so only paths and the backend flag are duplicated here.
#[derive(Debug, Clone, Serialize)]
pub struct TranspileSummary {
    #[serde(rename = "hasBackend")]
    pub has_backend: bool,
    pub files: Vec<String>,
}

impl From<&TranspileResult> for TranspileSummary {
    fn from(result: &TranspileResult) -> Self {
        Self {
            has_backend: result.has_backend,
            files: result.files.iter().map(|f| f.path.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoopResult {
    pub file: String,
    pub timestamp: String,
    pub stages: Vec<LoopStage>,
    pub diagnostics: DiagnosticResult,
    #[serde(rename = "transpileResult", skip_serializing_if = "Option::is_none")]
    pub transpile_result: Option<TranspileSummary>,
    #[serde(rename = "outputDir")]
    pub output_dir: String,
    #[serde(rename = "artifactDir", skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<String>,
    #[serde(rename = "determinismCheck")]
    pub determinism_check: DeterminismCheck,
    #[serde(rename = "repairResult", skip_serializing_if = "Option::is_none")]
    pub repair_result: Option<air_repair::RepairResult>,
    #[serde(rename = "repairAttempts", skip_serializing_if = "Option::is_none")]
    pub repair_attempts: Option<Vec<RepairAttempt>>,
}

fn adapter_for(mode: RepairMode, llm_adapter: Option<Arc<dyn RepairAdapter>>) -> Option<Arc<dyn RepairAdapter>> {
    match mode {
        RepairMode::None => None,
        RepairMode::Deterministic => Some(Arc::new(DeterministicAdapter)),
        RepairMode::Llm => llm_adapter.or_else(|| Some(Arc::new(DeterministicAdapter))),
    }
}

/// Run the full agent loop over `source`. `llm_adapter` is only
/// consulted when `opts.repair_mode == Llm`; the CLI layer is
/// responsible for building it from the environment (this crate never
/// reads env vars itself, keeping it hermetic per §6).
pub async fn run_loop(
    file: &str,
    source: &str,
    out_dir: &Path,
    opts: &LoopOptions,
    llm_adapter: Option<Arc<dyn RepairAdapter>>,
) -> LoopResult {
    let run_started = Instant::now();
    let timestamp = chrono::Utc::now();
    let mut stages = Vec::new();

    let source_hash = hash_source(source);

    // --- validate ---
    let validate_started = Instant::now();
    let (mut current_source, mut diagnostics) = match air_parser::parse(source) {
        Ok(ast) => (source.to_string(), air_validator::validate(&ast.app)),
        Err(err) => (source.to_string(), vec![air_parser::wrap_parse_error(&err)]),
    };
    let before_result = build_result(diagnostics.clone(), source_hash);
    stages.push(LoopStage::new(
        LoopStageName::Validate,
        if before_result.valid { StageStatus::Pass } else { StageStatus::Fail },
        validate_started.elapsed().as_millis() as u64,
    ));

    // --- repair ---
    let mut repair_outcome = None;
    let has_errors = before_result.summary.errors > 0;
    let repair_started = Instant::now();
    let adapter = if opts.repair_mode == RepairMode::None || !has_errors {
        None
    } else {
        adapter_for(opts.repair_mode, llm_adapter)
    };
    let repair_stage_status = if let Some(adapter) = adapter {
        let outcome = retry::run(adapter.as_ref(), &current_source, &diagnostics, opts.max_repair_attempts.max(1)).await;
        current_source = outcome.final_source.clone();
        diagnostics = outcome.final_diagnostics.clone();
        let ok = diagnostics
            .iter()
            .all(|d| d.severity != air_diagnostics::Severity::Error);
        let status = if ok { StageStatus::Pass } else { StageStatus::Fail };
        repair_outcome = Some(outcome);
        status
    } else {
        StageStatus::Skip
    };
    stages.push(LoopStage::new(
        LoopStageName::Repair,
        repair_stage_status,
        repair_started.elapsed().as_millis() as u64,
    ));

    let after_result = build_result(diagnostics.clone(), hash_source(&current_source));
    let validation_passes = after_result.valid;

    // --- transpile ---
    let transpile_started = Instant::now();
    let mut transpile_result = None;
    let transpile_status;
    if validation_passes {
        match air_parser::parse(&current_source) {
            Ok(ast) => {
                let result = air_transpile::transpile(&ast.app, &hash_source(&current_source));
                transpile_status = StageStatus::Pass;
                transpile_result = Some(result);
            }
            Err(_) => {
                transpile_status = StageStatus::Fail;
            }
        }
    } else {
        transpile_status = StageStatus::Skip;
    }
    stages.push(LoopStage::new(
        LoopStageName::Transpile,
        transpile_status,
        transpile_started.elapsed().as_millis() as u64,
    ));

    // --- smoke ---
    let smoke_started = Instant::now();
    let smoke_status = match &transpile_result {
        Some(result) => {
            if smoke_check(result) {
                StageStatus::Pass
            } else {
                StageStatus::Fail
            }
        }
        None => StageStatus::Skip,
    };
    stages.push(LoopStage::new(
        LoopStageName::Smoke,
        smoke_status,
        smoke_started.elapsed().as_millis() as u64,
    ));

    // --- determinism ---
    let determinism_started = Instant::now();
    let mut determinism_check = DeterminismCheck {
        source_hash: hash_source(&current_source),
        output_hashes: BTreeMap::new(),
        deterministic: false,
    };
    let determinism_status;
    if let (Some(first), Ok(ast)) = (&transpile_result, air_parser::parse(&current_source)) {
        let second = air_transpile::transpile(&ast.app, &hash_source(&current_source));
        let first_hashes = file_hashes_excluding_manifest(first);
        let second_hashes = file_hashes_excluding_manifest(&second);
        determinism_check.output_hashes = first_hashes.clone();
        determinism_check.deterministic = first_hashes == second_hashes;
        determinism_status = if determinism_check.deterministic {
            StageStatus::Pass
        } else {
            StageStatus::Fail
        };
    } else {
        determinism_status = StageStatus::Skip;
    }
    stages.push(LoopStage::new(
        LoopStageName::Determinism,
        determinism_status,
        determinism_started.elapsed().as_millis() as u64,
    ));

    let mut artifact_dir = None;
    if let Some(result) = &transpile_result {
        if let Err(err) = write_outputs(out_dir, result, opts.compile.incremental) {
            tracing::warn!(error = %err, "failed to write transpile output to out_dir");
        }
    }

    let mut loop_result = LoopResult {
        file: file.to_string(),
        timestamp: timestamp.to_rfc3339(),
        stages,
        diagnostics: after_result.clone(),
        transpile_result: transpile_result.as_ref().map(TranspileSummary::from),
        output_dir: out_dir.display().to_string(),
        artifact_dir: None,
        determinism_check,
        repair_result: repair_outcome.as_ref().and_then(|o| o.last_result.clone()),
        repair_attempts: repair_outcome.as_ref().map(|o| o.attempts.clone()),
    };

    if opts.write_artifacts {
        let artifacts_root = Path::new(".air-artifacts");
        match artifacts::write(
            artifacts_root,
            timestamp,
            &before_result,
            &after_result,
            repair_outcome.as_ref(),
            &loop_result,
        ) {
            Ok(dir) => artifact_dir = Some(dir.display().to_string()),
            Err(err) => tracing::warn!(error = %err, "failed to write audit artifacts"),
        }
    }
    loop_result.artifact_dir = artifact_dir;

    tracing::debug!(elapsed_ms = run_started.elapsed().as_millis() as u64, "loop run complete");
    loop_result
}

fn smoke_check(result: &TranspileResult) -> bool {
    if result.files.is_empty() {
        return false;
    }
    let has_entry = result
        .files
        .iter()
        .any(|f| f.path.ends_with("App.js") || f.path.ends_with("main.js") || f.path.ends_with("index.html"));
    let has_descriptor = result.files.iter().any(|f| f.path.ends_with("package.json"));
    let no_blank_files = result.files.iter().all(|f| !f.content.trim().is_empty());
    has_entry && has_descriptor && no_blank_files
}

fn file_hashes_excluding_manifest(result: &TranspileResult) -> BTreeMap<String, String> {
    result
        .files
        .iter()
        .filter(|f| f.path != air_transpile::MANIFEST_PATH)
        .map(|f| (f.path.clone(), hash16(&f.content)))
        .collect()
}

/// Write `result`'s files to `out_dir`, consulting `.air-cache/manifest.json`
/// when `incremental` is set so unchanged files are skipped and files no
/// longer produced are removed. Shared by the agent loop and the one-shot
/// `compile` entry point so both write outputs identically.
pub fn write_outputs(out_dir: &Path, result: &TranspileResult, incremental: bool) -> std::io::Result<()> {
    let new_files: Vec<(String, String)> = result
        .files
        .iter()
        .map(|f| (f.path.clone(), f.content.clone()))
        .collect();

    let previous = if incremental { air_cache::load(out_dir) } else { None };
    let source_hash = result
        .files
        .iter()
        .find(|f| f.path == air_transpile::MANIFEST_PATH)
        .map(|f| hash16(&f.content))
        .unwrap_or_default();
    let (manifest, diff) = air_cache::diff(previous.as_ref(), &source_hash, &new_files);

    for (path, content) in &new_files {
        if incremental && diff.skipped.contains(path) {
            continue;
        }
        let full_path = out_dir.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full_path, content)?;
    }

    for removed in &diff.removed {
        let full_path = out_dir.join(removed);
        let _ = fs::remove_file(full_path);
    }

    air_cache::write_atomic(out_dir, &manifest)?;
    Ok(())
}
