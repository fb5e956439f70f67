//! CLI argument definitions and parsing structures.
//!
//! This module defines the command-line interface structure using clap,
//! mirroring `spec.md` §6's `compile`/`loop`/`validate` surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// AirEngine — compiles AIR source into a deterministic multi-file project.
#[derive(Parser)]
#[command(name = "airengine")]
#[command(about = "Compiles the AIR declarative-application language into a deterministic multi-file project")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse, validate, and transpile one AIR source file.
    Compile {
        /// Path to the `.air` source file.
        input: PathBuf,

        /// Directory the generated project is written to.
        #[arg(short = 'o', long = "out")]
        out_dir: PathBuf,

        /// Force a full rewrite instead of consulting `<outDir>/.air-cache/manifest.json`.
        #[arg(long)]
        no_incremental: bool,
    },

    /// Print a formatted diagnostics report for one AIR source file.
    Validate {
        /// Path to the `.air` source file.
        input: PathBuf,

        /// Print the raw `DiagnosticResult` JSON instead of the human report.
        #[arg(long)]
        json: bool,
    },

    /// Run the full agent loop: validate → repair → transpile → smoke → determinism.
    Loop {
        /// Path to the `.air` source file.
        input: PathBuf,

        /// Directory the generated project is written to.
        #[arg(short = 'o', long = "out")]
        out_dir: PathBuf,

        /// How the repair stage behaves when validation reports errors.
        #[arg(long, value_enum, default_value_t = RepairModeArg::None)]
        repair_mode: RepairModeArg,

        /// Cap on sequential repair attempts.
        #[arg(long, default_value_t = 3)]
        max_repair_attempts: u32,

        /// Transport-layer retry budget for the LLM adapter (only used with `--repair-mode llm`).
        #[arg(long, default_value_t = 3)]
        max_adapter_retries: u32,

        /// Force a full rewrite instead of consulting `<outDir>/.air-cache/manifest.json`.
        #[arg(long)]
        no_incremental: bool,

        /// Skip writing `.air-artifacts/<timestamp>/` audit artifacts.
        #[arg(long)]
        no_artifacts: bool,
    },
}

/// Mirrors [`crate::RepairMode`] as a clap-friendly value enum.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RepairModeArg {
    None,
    Deterministic,
    Llm,
}

impl From<RepairModeArg> for crate::RepairMode {
    fn from(value: RepairModeArg) -> Self {
        match value {
            RepairModeArg::None => Self::None,
            RepairModeArg::Deterministic => Self::Deterministic,
            RepairModeArg::Llm => Self::Llm,
        }
    }
}
