//! Option structs threaded through the library and CLI surface.
//!
//! Nothing here reads the environment or the filesystem — option
//! resolution (flags > config file > these defaults) happens in the CLI
//! layer; this crate only defines the shapes and their defaults.

use serde::{Deserialize, Serialize};

/// How the agent loop's repair stage behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Repair stage is skipped entirely.
    None,
    /// Only the built-in deterministic rules run (no network calls).
    Deterministic,
    /// Deterministic rules first, then an LLM-backed adapter.
    Llm,
}

impl Default for RepairMode {
    fn default() -> Self {
        Self::None
    }
}

/// Options for a one-shot `compile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Directory output files are written under.
    pub out_dir: String,
    /// Whether to consult `.air-cache/manifest.json` and skip unchanged
    /// files, or force a full rewrite.
    pub incremental: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            out_dir: "dist".to_string(),
            incremental: true,
        }
    }
}

/// Options for `run_loop`'s agent orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopOptions {
    pub compile: CompileOptions,
    pub repair_mode: RepairMode,
    /// Cap on repair attempts when `repair_mode != none`. A value of `1`
    /// means "try once, don't retry".
    pub max_repair_attempts: u32,
    /// Transport-layer retry budget handed to the LLM adapter, when
    /// `repair_mode == llm`.
    pub max_adapter_retries: u32,
    /// Whether to write `.air-artifacts/<timestamp>/` audit artifacts.
    pub write_artifacts: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            repair_mode: RepairMode::default(),
            max_repair_attempts: 3,
            max_adapter_retries: 3,
            write_artifacts: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_options_default_matches_documented_cli_defaults() {
        let opts = CompileOptions::default();
        assert_eq!(opts.out_dir, "dist");
        assert!(opts.incremental);
    }

    #[test]
    fn loop_options_default_is_no_repair_with_bounded_attempts() {
        let opts = LoopOptions::default();
        assert_eq!(opts.repair_mode, RepairMode::None);
        assert!(opts.max_repair_attempts >= 1);
    }
}
