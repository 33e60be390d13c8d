//! Engine tuning for an open handle.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cache budget used when the caller passes a non-positive value (MB)
pub const DEFAULT_CACHE_MB: i64 = 16;

/// Open-file budget used when the caller passes a non-positive value
pub const DEFAULT_MAX_OPEN_FILES: i32 = 16;

const MB: usize = 1024 * 1024;

/// Memory and file-descriptor budget for a [`Database`](crate::Database).
///
/// Both fields accept zero or negative values, meaning "use the default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Combined block cache and write buffer budget, in MB
    pub cache_mb: i64,
    /// Maximum number of files RocksDB keeps open
    pub max_open_files: i32,
}

impl StorageOptions {
    pub fn new(cache_mb: i64, max_open_files: i32) -> Self {
        Self {
            cache_mb,
            max_open_files,
        }
    }

    /// Replace non-positive values with the defaults.
    pub fn normalized(self) -> Self {
        let cache_mb = if self.cache_mb <= 0 {
            debug!(requested = self.cache_mb, "Using default cache budget");
            DEFAULT_CACHE_MB
        } else {
            self.cache_mb
        };
        let max_open_files = if self.max_open_files <= 0 {
            debug!(
                requested = self.max_open_files,
                "Using default open file budget"
            );
            DEFAULT_MAX_OPEN_FILES
        } else {
            self.max_open_files
        };
        Self {
            cache_mb,
            max_open_files,
        }
    }

    /// Half of the budget goes to the LRU block cache.
    pub fn block_cache_bytes(&self) -> usize {
        self.cache_bytes() / 2
    }

    /// A quarter of the budget goes to the memtable.
    pub fn write_buffer_bytes(&self) -> usize {
        self.cache_bytes() / 4
    }

    fn cache_bytes(&self) -> usize {
        usize::try_from(self.cache_mb.max(0))
            .unwrap_or(usize::MAX / MB)
            .saturating_mul(MB)
    }
}
