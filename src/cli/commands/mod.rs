//! Per-subcommand handlers.

pub mod compile;
pub mod loop_cmd;
pub mod validate;
