//! CLI entry point and dispatch.
//!
//! This function handles all output including errors. It returns
//! `Result<(), ExitCode>`: `main.rs` only maps the `Err` case onto
//! `std::process::exit`.

use air_error::ExitCode;
use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

pub fn run() -> Result<(), ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            out_dir,
            no_incremental,
        } => commands::compile::execute(&input, &out_dir, !no_incremental),
        Commands::Validate { input, json } => commands::validate::execute(&input, json),
        Commands::Loop {
            input,
            out_dir,
            repair_mode,
            max_repair_attempts,
            max_adapter_retries,
            no_incremental,
            no_artifacts,
        } => commands::loop_cmd::execute(
            &input,
            &out_dir,
            repair_mode,
            max_repair_attempts,
            max_adapter_retries,
            !no_incremental,
            !no_artifacts,
        ),
    };

    match result {
        Ok(code) => {
            if code == ExitCode::Success {
                Ok(())
            } else {
                Err(code)
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            Err(ExitCode::OperationalFailure)
        }
    }
}
