//! `airengine validate` — parse + validate, report diagnostics.

use std::path::Path;

use air_diagnostics::{build_result, hash_source};
use air_error::ExitCode;
use anyhow::{Context, Result};

pub fn execute(input: &Path, json: bool) -> Result<ExitCode> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let source_hash = hash_source(&source);
    let diagnostics = match air_parser::parse(&source) {
        Ok(ast) => air_validator::validate(&ast.app),
        Err(err) => vec![air_parser::wrap_parse_error(&err)],
    };
    let result = build_result(diagnostics, source_hash);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for diagnostic in &result.diagnostics {
            println!("{}", crate::format_diagnostic_cli(diagnostic));
        }
        if result.valid {
            println!("valid ({} warnings, {} info)", result.summary.warnings, result.summary.info);
        }
    }

    Ok(if result.valid {
        ExitCode::Success
    } else {
        ExitCode::ValidationFailure
    })
}
