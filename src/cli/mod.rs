//! Command-line interface for AirEngine.
//!
//! - `args`: `Cli`/`Commands` clap definitions
//! - `commands`: per-subcommand handlers
//! - `run`: entry point and dispatch

pub mod args;
mod commands;
mod run;

pub use args::Cli;
pub use run::run;
