//! Shared exit-code mapping used by every AirEngine CLI command.
//!
//! Library crates (`air-parser`, `air-validator`, `air-repair`, ...) each
//! define their own `thiserror`-derived error enum scoped to their own
//! concerns. This crate holds only the one thing that needs to be shared
//! across all of them: how an error maps onto a process exit code, per
//! `spec.md` §6 ("Exit codes: 0 success, 1 operational failure (fatal
//! error), 2 validation failure when a dedicated validation command").

/// Process exit codes produced by the `airengine` CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Compilation/validation succeeded.
    Success = 0,
    /// A fatal, non-validation failure occurred (I/O error, generator bug,
    /// adapter transport failure that the loop could not route around).
    OperationalFailure = 1,
    /// `validate` ran to completion but the source is not valid AIR.
    ValidationFailure = 2,
}

impl ExitCode {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Implemented by every crate-local error enum so the CLI layer can map
/// any error it receives onto one of the three exit codes above without
/// needing to know which crate produced it.
pub trait ToExitCode {
    fn to_exit_code(&self) -> ExitCode;
}
