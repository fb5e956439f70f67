//! `airengine loop` — the full agent loop: validate → repair → transpile
//! → smoke → determinism.

use std::path::Path;
use std::sync::Arc;

use air_config::{CompileOptions, LoopOptions, RepairMode};
use air_error::ExitCode;
use air_loop::StageStatus;
use air_repair::RepairAdapter;
use anyhow::{bail, Context, Result};

use crate::cli::args::RepairModeArg;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    input: &Path,
    out_dir: &Path,
    repair_mode: RepairModeArg,
    max_repair_attempts: u32,
    max_adapter_retries: u32,
    incremental: bool,
    write_artifacts: bool,
) -> Result<ExitCode> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let repair_mode: RepairMode = repair_mode.into();

    let llm_adapter = build_llm_adapter(repair_mode, max_adapter_retries)?;

    let opts = LoopOptions {
        compile: CompileOptions {
            out_dir: out_dir.display().to_string(),
            incremental,
        },
        repair_mode,
        max_repair_attempts,
        max_adapter_retries,
        write_artifacts,
    };

    let file_name = input.display().to_string();
    let result = crate::run_loop(&file_name, &source, out_dir, &opts, llm_adapter).context("loop run failed")?;

    for stage in &result.stages {
        let label = match stage.status {
            StageStatus::Pass => "PASS",
            StageStatus::Fail => "FAIL",
            StageStatus::Skip => "SKIP",
        };
        println!("{label}  {:?} ({}ms)", stage.name, stage.duration_ms);
    }
    if let Some(dir) = &result.artifact_dir {
        println!("artifacts: {dir}");
    }

    let all_non_skip_pass = result
        .stages
        .iter()
        .all(|s| s.status != StageStatus::Fail);

    Ok(if all_non_skip_pass {
        ExitCode::Success
    } else {
        ExitCode::ValidationFailure
    })
}

/// Builds the LLM adapter from environment variables when `--repair-mode
/// llm` is selected. This crate's `air-loop`/`air-llm` layers never read
/// the environment themselves — resolving provider config is the CLI's
/// job, per `air-llm`'s own design note.
fn build_llm_adapter(mode: RepairMode, max_adapter_retries: u32) -> Result<Option<Arc<dyn RepairAdapter>>> {
    if mode != RepairMode::Llm {
        return Ok(None);
    }
    let endpoint = std::env::var("AIRENGINE_LLM_ENDPOINT")
        .context("--repair-mode llm requires AIRENGINE_LLM_ENDPOINT")?;
    let api_key =
        std::env::var("AIRENGINE_LLM_API_KEY").context("--repair-mode llm requires AIRENGINE_LLM_API_KEY")?;
    let model = std::env::var("AIRENGINE_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    if endpoint.is_empty() || api_key.is_empty() {
        bail!("AIRENGINE_LLM_ENDPOINT and AIRENGINE_LLM_API_KEY must be non-empty");
    }

    let client = Arc::new(air_llm::HttpLlmClient::new(endpoint, api_key, model));
    Ok(Some(Arc::new(air_llm::LlmRepairAdapter::new(
        client,
        max_adapter_retries,
    ))))
}
