//! AirEngine: compiles the AIR declarative-application language into a
//! deterministic multi-file project.
//!
//! This crate wires the pipeline crates (`air-parser`, `air-validator`,
//! `air-transpile`, `air-repair`, `air-loop`, ...) into two entry points:
//! [`compile`] for a one-shot parse→validate→transpile, and [`run_loop`]
//! for the full validate→repair→transpile→smoke→determinism agent loop.
//! `main.rs` only parses CLI args and dispatches into these.

pub mod cli;

use std::path::Path;
use std::sync::Arc;

use air_config::CompileOptions;
use air_diagnostics::{build_result, hash_source, DiagnosticResult};
use air_repair::RepairAdapter;

pub use air_config::{LoopOptions, RepairMode};
pub use air_diagnostics::format_diagnostic_cli;
pub use air_loop::LoopResult;

/// Result of a one-shot [`compile`]: the diagnostics produced by
/// validation, plus how many files were written (zero when invalid).
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub diagnostics: DiagnosticResult,
    pub files_written: usize,
}

/// Parse, validate, and — if valid — transpile and write `source` to
/// `out_dir`. Does not repair; a source with errors is reported and
/// nothing is written.
pub fn compile(source: &str, out_dir: &Path, opts: &CompileOptions) -> std::io::Result<CompileOutcome> {
    let source_hash = hash_source(source);
    let diagnostics = match air_parser::parse(source) {
        Ok(ast) => air_validator::validate(&ast.app),
        Err(err) => vec![air_parser::wrap_parse_error(&err)],
    };
    let result = build_result(diagnostics, source_hash);
    if !result.valid {
        return Ok(CompileOutcome {
            diagnostics: result,
            files_written: 0,
        });
    }

    let ast = air_parser::parse(source).expect("already validated as parseable");
    let transpiled = air_transpile::transpile(&ast.app, &result.source_hash);
    let files_written = transpiled.files.len();
    air_loop::write_outputs(out_dir, &transpiled, opts.incremental)?;
    Ok(CompileOutcome {
        diagnostics: result,
        files_written,
    })
}

/// Run the full agent loop over `source`, driving [`air_loop::run_loop`]'s
/// async signature from a single-threaded runtime built once per call —
/// the rest of the pipeline is synchronous, so only the LLM adapter (when
/// selected) actually awaits anything.
pub fn run_loop(
    file: &str,
    source: &str,
    out_dir: &Path,
    opts: &LoopOptions,
    llm_adapter: Option<Arc<dyn RepairAdapter>>,
) -> std::io::Result<LoopResult> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(runtime.block_on(air_loop::run_loop(file, source, out_dir, opts, llm_adapter)))
}
