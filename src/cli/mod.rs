//! CLI module
//!
//! Command-line interface for the tap.
//!
//! # Modes
//!
//! - `--discover` - print the stream catalog as JSON
//! - default - sync the streams selected in `--catalog`, resuming from
//!   `--state` when given

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
