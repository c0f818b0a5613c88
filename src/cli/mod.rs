//! Command-line interface for sql-forge.
//!
//! Provides commands for generating practice sessions and for validating and
//! inspecting blueprint libraries.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
