//! RocksDB handle for kvdb.
//!
//! Provides:
//! - Database open/close with cache and file-descriptor budgets
//! - Point get/put/delete/has on the default column family
//! - Atomic write batches bound to the handle
//! - Flush and statistics for admin tooling

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rocksdb::{BlockBasedOptions, Cache, IteratorMode, Options, DB};
use tracing::{debug, info};

use crate::batch::DbBatch;
use crate::error::StorageError;
use crate::metered::Metered;
use crate::metrics::MetricsRegistry;
use crate::options::StorageOptions;
use crate::store::KeyValueStore;

/// Engine slot shared between a handle and its batches.
///
/// `None` once the handle is closed. Only [`Database::close`] takes the
/// engine out, so it is released exactly once.
pub(crate) type SharedDb = Arc<RwLock<Option<DB>>>;

/// Run `op` against the engine, or fail with [`StorageError::Closed`].
pub(crate) fn with_engine<T>(
    db: &SharedDb,
    op: impl FnOnce(&DB) -> Result<T, rocksdb::Error>,
) -> Result<T, StorageError> {
    let guard = db.read();
    let engine = guard.as_ref().ok_or(StorageError::Closed)?;
    Ok(op(engine)?)
}

/// An open connection to a RocksDB store at a filesystem path.
///
/// Safe to share across threads (wrap in `Arc`). Point operations are
/// atomic per key; concurrent writers to one key resolve last-writer-wins.
pub struct Database {
    path: String,
    options: StorageOptions,
    db: SharedDb,
}

impl Database {
    /// Open the store at `path`, creating it if necessary.
    ///
    /// Non-positive `cache_mb` or `max_open_files` select the defaults.
    pub fn open(
        path: impl AsRef<Path>,
        cache_mb: i64,
        max_open_files: i32,
    ) -> Result<Self, StorageError> {
        Self::open_with_options(path, StorageOptions::new(cache_mb, max_open_files))
    }

    /// Open the store at `path` with explicit tuning.
    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: StorageOptions,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let display = path.to_string_lossy().to_string();
        let options = options.normalized();
        info!(
            path = %display,
            cache_mb = options.cache_mb,
            max_open_files = options.max_open_files,
            "Opening database"
        );

        let cache = Cache::new_lru_cache(options.block_cache_bytes());
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.set_max_open_files(options.max_open_files);
        db_opts.set_write_buffer_size(options.write_buffer_bytes());
        db_opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&db_opts, path).map_err(|source| StorageError::Open {
            path: display.clone(),
            source,
        })?;

        Ok(Self {
            path: display,
            options,
            db: Arc::new(RwLock::new(Some(db))),
        })
    }

    /// The path given at open.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Effective tuning after defaults were applied.
    pub fn options(&self) -> StorageOptions {
        self.options
    }

    /// Release the engine handle.
    ///
    /// Idempotent: closing an already closed handle does nothing. Operations
    /// issued after close fail with [`StorageError::Closed`].
    pub fn close(&self) {
        let engine = self.db.write().take();
        match engine {
            Some(engine) => {
                drop(engine);
                info!(path = %self.path, "Closed database");
            }
            None => debug!(path = %self.path, "Database already closed"),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }

    /// Attach instrumentation, recording into `registry` under `label`.
    pub fn meter(self, label: &str, registry: &Arc<MetricsRegistry>) -> Metered<Self> {
        Metered::new(self, label, registry)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        with_engine(&self.db, |db| db.flush())
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let key_count = with_engine(&self.db, |db| {
            let mut count = 0u64;
            for item in db.iterator(IteratorMode::Start) {
                item?;
                count += 1;
            }
            Ok(count)
        })?;

        Ok(StorageStats {
            key_count,
            disk_usage_bytes: self.disk_usage(),
        })
    }

    fn disk_usage(&self) -> u64 {
        let mut total_size = 0u64;
        if let Ok(entries) = std::fs::read_dir(&self.path) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }
        total_size
    }
}

impl KeyValueStore for Database {
    type Batch = DbBatch;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        with_engine(&self.db, |db| db.put(key, value))
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        with_engine(&self.db, |db| db.get(key))?.ok_or(StorageError::NotFound)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        with_engine(&self.db, |db| Ok(db.get_pinned(key)?.is_some()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        with_engine(&self.db, |db| db.delete(key))
    }

    fn new_batch(&self) -> DbBatch {
        DbBatch::new(Arc::clone(&self.db))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Statistics about the storage.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct StorageStats {
    /// Number of live keys
    pub key_count: u64,
    /// Total size of files in the database directory
    pub disk_usage_bytes: u64,
}
