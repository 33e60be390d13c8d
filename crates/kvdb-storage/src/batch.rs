//! Atomic write batches bound to a [`Database`](crate::Database).

use rocksdb::WriteBatch;
use tracing::debug;

use crate::db::{with_engine, SharedDb};
use crate::error::StorageError;
use crate::store::Batch;

/// Buffered puts and deletes committed through a single RocksDB `WriteBatch`.
///
/// Owned by one writer; not meant for concurrent mutation. Holds a shared
/// reference to the engine slot but never releases the engine itself.
pub struct DbBatch {
    db: SharedDb,
    batch: WriteBatch,
    size: usize,
}

impl DbBatch {
    pub(crate) fn new(db: SharedDb) -> Self {
        Self {
            db,
            batch: WriteBatch::default(),
            size: 0,
        }
    }
}

impl Batch for DbBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.batch.put(key, value);
        self.size += value.len();
    }

    fn delete(&mut self, key: &[u8]) {
        self.batch.delete(key);
        self.size += key.len();
    }

    fn value_size(&self) -> usize {
        self.size
    }

    fn len(&self) -> usize {
        self.batch.len()
    }

    fn write(&mut self) -> Result<usize, StorageError> {
        let entries = self.batch.len();
        let batch = std::mem::take(&mut self.batch);
        with_engine(&self.db, |db| db.write(batch))?;

        let written = std::mem::take(&mut self.size);
        debug!(entries, bytes = written, "Committed write batch");
        Ok(written)
    }

    fn reset(&mut self) {
        self.batch.clear();
        self.size = 0;
    }
}

impl std::fmt::Debug for DbBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbBatch")
            .field("entries", &self.batch.len())
            .field("size", &self.size)
            .finish()
    }
}
