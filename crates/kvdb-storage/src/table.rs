//! Key-prefix namespaces over a shared store.
//!
//! A [`Table`] prepends a fixed prefix to every key before delegating, so
//! several logical key spaces can live in one physical store. The prefix is
//! never visible to the table's callers.
//!
//! Prefixes are not checked against each other: two tables whose prefixes
//! overlap (one a proper prefix of the other) are not isolated.

use crate::error::StorageError;
use crate::store::{Batch, KeyValueStore};

fn prefixed(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(prefix.len() + key.len());
    full.extend_from_slice(prefix);
    full.extend_from_slice(key);
    full
}

/// A namespaced view over another store.
///
/// `S` is usually a reference or `Arc` to a [`Database`](crate::Database) or
/// [`Metered`](crate::Metered) handle. A table has no lifecycle of its own;
/// closing is the handle's job.
#[derive(Debug, Clone)]
pub struct Table<S> {
    store: S,
    prefix: Vec<u8>,
}

impl<S: KeyValueStore> Table<S> {
    pub fn new(store: S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// The store this table delegates to.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> KeyValueStore for Table<S> {
    type Batch = TableBatch<S::Batch>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.store.put(&prefixed(&self.prefix, key), value)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        self.store.get(&prefixed(&self.prefix, key))
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.store.has(&prefixed(&self.prefix, key))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.store.delete(&prefixed(&self.prefix, key))
    }

    fn new_batch(&self) -> Self::Batch {
        TableBatch {
            batch: self.store.new_batch(),
            prefix: self.prefix.clone(),
        }
    }
}

/// A batch that prefixes every key before buffering it in the wrapped batch.
#[derive(Debug)]
pub struct TableBatch<B> {
    batch: B,
    prefix: Vec<u8>,
}

impl<B: Batch> Batch for TableBatch<B> {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.batch.put(&prefixed(&self.prefix, key), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.batch.delete(&prefixed(&self.prefix, key));
    }

    fn value_size(&self) -> usize {
        self.batch.value_size()
    }

    fn len(&self) -> usize {
        self.batch.len()
    }

    fn write(&mut self) -> Result<usize, StorageError> {
        self.batch.write()
    }

    fn reset(&mut self) {
        self.batch.reset();
    }
}
