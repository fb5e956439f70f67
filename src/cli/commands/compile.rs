//! `airengine compile` — one-shot parse → validate → transpile → write.

use std::path::Path;

use air_config::CompileOptions;
use air_error::ExitCode;
use anyhow::{Context, Result};

pub fn execute(input: &Path, out_dir: &Path, incremental: bool) -> Result<ExitCode> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let opts = CompileOptions {
        out_dir: out_dir.display().to_string(),
        incremental,
    };
    let outcome = crate::compile(&source, out_dir, &opts).context("compile failed")?;

    for diagnostic in &outcome.diagnostics.diagnostics {
        eprintln!("{}", crate::format_diagnostic_cli(diagnostic));
    }

    if outcome.diagnostics.valid {
        println!("wrote {} files to {}", outcome.files_written, out_dir.display());
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::ValidationFailure)
    }
}
