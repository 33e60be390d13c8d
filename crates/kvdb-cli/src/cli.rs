//! CLI argument parsing for kvdb.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// kvdb
///
/// Point reads, writes and batch imports against an embedded store.
#[derive(Parser, Debug)]
#[command(name = "kvdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/kvdb/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Operate inside the table with this key prefix
    #[arg(short, long, global = true)]
    pub table: Option<String>,

    /// Record operation metrics and print them on exit
    #[arg(short, long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Store commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the value stored under a key
    Get {
        key: String,
    },

    /// Store a value under a key
    Put {
        key: String,
        value: String,
    },

    /// Remove a key
    Delete {
        key: String,
    },

    /// Print whether a key exists
    Has {
        key: String,
    },

    /// Write key=value pairs through a batch
    Import {
        /// Commit the batch whenever this many payload bytes are buffered
        #[arg(long, default_value = "1048576")]
        flush_bytes: usize,

        /// Pairs in key=value form
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Show database statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["kvdb", "get", "alice"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { ref key } if key == "alice"));
        assert!(cli.table.is_none());
        assert!(!cli.metrics);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kvdb",
            "put",
            "k",
            "v",
            "--db-path",
            "/tmp/kvdb",
            "--table",
            "users-",
            "--metrics",
        ])
        .unwrap();
        assert_eq!(cli.db_path.as_deref(), Some("/tmp/kvdb"));
        assert_eq!(cli.table.as_deref(), Some("users-"));
        assert!(cli.metrics);
        assert!(matches!(cli.command, Commands::Put { .. }));
    }

    #[test]
    fn test_parse_import() {
        let cli =
            Cli::try_parse_from(["kvdb", "import", "--flush-bytes", "64", "a=1", "b=2"]).unwrap();
        match cli.command {
            Commands::Import { flush_bytes, pairs } => {
                assert_eq!(flush_bytes, 64);
                assert_eq!(pairs, vec!["a=1", "b=2"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_import_requires_pairs() {
        assert!(Cli::try_parse_from(["kvdb", "import"]).is_err());
    }

    #[test]
    fn test_parse_stats_json() {
        let cli = Cli::try_parse_from(["kvdb", "stats", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats { json: true }));
    }
}
