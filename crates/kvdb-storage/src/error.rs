//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be opened (locked, unwritable, or unreadable)
    #[error("Failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rocksdb::Error,
    },

    /// Key does not exist
    #[error("Key not found")]
    NotFound,

    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Operation issued against a closed handle
    #[error("Database is closed")]
    Closed,
}

impl StorageError {
    /// True if this error only reports an absent key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}
