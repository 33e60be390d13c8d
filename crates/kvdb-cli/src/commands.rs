//! Command implementations for the kvdb CLI.
//!
//! Handles:
//! - get/put/delete/has: single operations, optionally inside a table
//! - import: batched writes flushed by payload size
//! - stats: key count and disk usage

use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use kvdb_storage::{
    Batch, Database, KeyValueStore, MetricsRegistry, StorageError, StorageOptions, Table,
};
use kvdb_types::{KvdbError, Settings};

use crate::cli::{Cli, Commands};

/// Split a `key=value` argument at the first `=`.
pub fn parse_pair(pair: &str) -> Result<(&str, &str), KvdbError> {
    match pair.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(KvdbError::InvalidInput(format!(
            "empty key in pair: {pair}"
        ))),
        Some((key, value)) => Ok((key, value)),
        None => Err(KvdbError::InvalidInput(format!(
            "expected key=value, got: {pair}"
        ))),
    }
}

/// Run a data command against any store.
///
/// `Stats` needs the concrete handle and is handled by [`run_with_output`].
pub fn execute<S: KeyValueStore, W: Write>(store: &S, command: &Commands, out: &mut W) -> Result<()> {
    match command {
        Commands::Get { key } => match store.get(key.as_bytes()) {
            Ok(value) => writeln!(out, "{}", String::from_utf8_lossy(&value))?,
            Err(StorageError::NotFound) => anyhow::bail!("Key not found: {key}"),
            Err(e) => return Err(e).context("Failed to read key"),
        },
        Commands::Put { key, value } => {
            store
                .put(key.as_bytes(), value.as_bytes())
                .context("Failed to write key")?;
            writeln!(out, "OK")?;
        }
        Commands::Delete { key } => {
            store.delete(key.as_bytes()).context("Failed to delete key")?;
            writeln!(out, "OK")?;
        }
        Commands::Has { key } => {
            let exists = store.has(key.as_bytes()).context("Failed to check key")?;
            writeln!(out, "{exists}")?;
        }
        Commands::Import { flush_bytes, pairs } => {
            let mut batch = store.new_batch();
            let mut total = 0usize;
            for pair in pairs {
                let (key, value) = parse_pair(pair)?;
                batch.put(key.as_bytes(), value.as_bytes());
                if batch.value_size() >= *flush_bytes {
                    total += batch.write().context("Failed to commit batch")?;
                    debug!(total, "Flushed import batch");
                }
            }
            if !batch.is_empty() {
                total += batch.write().context("Failed to commit batch")?;
            }
            writeln!(out, "Imported {} pairs ({} bytes)", pairs.len(), total)?;
        }
        Commands::Stats { .. } => anyhow::bail!("stats is not a per-table command"),
    }
    Ok(())
}

/// Load configuration, open the store and run `cli.command`, writing
/// results to `out`.
pub fn run_with_output<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(db_path) = cli.db_path {
        settings.db_path = db_path;
    }
    if let Some(log_level) = cli.log_level {
        settings.log_level = log_level;
    }
    if cli.metrics {
        settings.metrics_enabled = true;
    }

    init_logging(&settings.log_level);

    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let options = StorageOptions::new(settings.cache_mb, settings.max_open_files);
    let db = Database::open_with_options(&db_path, options).context("Failed to open storage")?;
    let registry = Arc::new(MetricsRegistry::new(settings.metrics_enabled));
    let db = db.meter(&settings.metrics_label, &registry);

    let result = match (&cli.command, cli.table.as_deref()) {
        (Commands::Stats { json }, _) => {
            let stats = db.inner().stats().context("Failed to read statistics")?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(out, "Database: {}", db.inner().path())?;
                writeln!(out, "Keys: {}", stats.key_count)?;
                writeln!(out, "Disk usage: {} bytes", stats.disk_usage_bytes)?;
            }
            Ok(())
        }
        (command, Some(prefix)) => execute(&Table::new(&db, prefix), command, out),
        (command, None) => execute(&db, command, out),
    };

    if settings.metrics_enabled {
        writeln!(out, "{}", serde_json::to_string_pretty(&registry.snapshot())?)?;
    }

    db.inner().close();
    info!("Done");
    result
}

/// Run with results printed to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, &mut out)
}

fn init_logging(log_level: &str) {
    // A subscriber may already be installed (tests, embedding callers).
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .try_init();
}
