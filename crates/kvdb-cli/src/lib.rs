//! kvdb CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations over the storage layer

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{execute, parse_pair, run, run_with_output};
