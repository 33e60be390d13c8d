//! kvdb command-line tool
//!
//! Inspect and edit a kvdb store from the shell.
//!
//! # Usage
//!
//! ```bash
//! kvdb --db-path ./data put greeting hello
//! kvdb --db-path ./data --table users- get alice
//! kvdb --db-path ./data --metrics import a=1 b=2 c=3
//! kvdb --db-path ./data stats --json
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/kvdb/config.toml)
//! 3. Environment variables (KVDB_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use kvdb_cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
