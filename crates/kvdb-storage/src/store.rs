//! Capability traits shared by every store in this crate.
//!
//! [`Database`](crate::Database), [`Table`](crate::Table) and
//! [`Metered`](crate::Metered) all implement [`KeyValueStore`], and each
//! hands out its own [`Batch`] type. The blanket impls for `&S` and `Arc<S>`
//! let a table borrow or share a handle without owning it.

use std::sync::Arc;

use crate::error::StorageError;

/// Point operations over an ordered byte-keyed store.
pub trait KeyValueStore {
    /// Batch type produced by [`KeyValueStore::new_batch`]
    type Batch: Batch;

    /// Write or overwrite the value for `key`.
    ///
    /// The value is visible to subsequent reads as soon as this returns.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Read the value last written for `key`.
    ///
    /// Returns [`StorageError::NotFound`] if the key is absent. An empty
    /// value is a stored value, not absence.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError>;

    /// Check whether `key` exists without copying its value out.
    fn has(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Remove `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Allocate an empty batch bound to this store.
    fn new_batch(&self) -> Self::Batch;
}

/// A buffered group of writes committed as one atomic unit.
///
/// Buffering never performs I/O. Nothing becomes visible to readers until
/// [`Batch::write`] succeeds, and then everything does.
pub trait Batch {
    /// Buffer a put of `value` under `key`.
    fn put(&mut self, key: &[u8], value: &[u8]);

    /// Buffer a delete of `key`.
    fn delete(&mut self, key: &[u8]);

    /// Total payload currently buffered, in bytes.
    ///
    /// Puts count their value length, deletes their key length. Callers use
    /// this to decide when to flush.
    fn value_size(&self) -> usize;

    /// Number of buffered entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commit the buffered entries and return the payload size committed.
    ///
    /// On success the batch is empty and may be reused. After a failure the
    /// buffered state is unspecified and the batch should be dropped.
    fn write(&mut self) -> Result<usize, StorageError>;

    /// Discard everything buffered so far.
    fn reset(&mut self);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    type Batch = S::Batch;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        (**self).get(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        (**self).has(key)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn new_batch(&self) -> Self::Batch {
        (**self).new_batch()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    type Batch = S::Batch;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        (**self).get(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        (**self).has(key)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn new_batch(&self) -> Self::Batch {
        (**self).new_batch()
    }
}
