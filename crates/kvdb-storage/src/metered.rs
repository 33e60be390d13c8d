//! Instrumentation decorator for any [`KeyValueStore`].
//!
//! [`Metered`] forwards every call to the wrapped store unchanged and, while
//! its registry is enabled, records:
//! - `{label}/put`, `{label}/get`, `{label}/delete`: operation latency
//! - `{label}/bytes_written`: value bytes of successful puts
//! - `{label}/bytes_read`: value bytes of successful gets
//! - `{label}/misses`: gets that found no value
//!
//! Tables built on a metered store are measured through it.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::error::StorageError;
use crate::metrics::{Meter, MetricsRegistry, Timer};
use crate::store::KeyValueStore;

/// The instruments one metered store records into.
#[derive(Debug, Clone)]
pub struct DbMeters {
    registry: Arc<MetricsRegistry>,
    label: String,
    pub put_timer: Arc<Timer>,
    pub get_timer: Arc<Timer>,
    pub del_timer: Arc<Timer>,
    pub write_meter: Arc<Meter>,
    pub read_meter: Arc<Meter>,
    pub miss_meter: Arc<Meter>,
}

impl DbMeters {
    /// Register (or reuse) the instruments for `label` in `registry`.
    pub fn new(label: &str, registry: &Arc<MetricsRegistry>) -> Self {
        Self {
            registry: Arc::clone(registry),
            label: label.to_string(),
            put_timer: registry.timer(&format!("{label}/put")),
            get_timer: registry.timer(&format!("{label}/get")),
            del_timer: registry.timer(&format!("{label}/delete")),
            write_meter: registry.meter(&format!("{label}/bytes_written")),
            read_meter: registry.meter(&format!("{label}/bytes_read")),
            miss_meter: registry.meter(&format!("{label}/misses")),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.registry.is_enabled()
    }
}

/// A store that records timing and byte statistics for each operation.
///
/// Results, errors and ordering are exactly those of the wrapped store.
#[derive(Debug)]
pub struct Metered<S> {
    inner: S,
    meters: DbMeters,
}

impl<S: KeyValueStore> Metered<S> {
    pub fn new(inner: S, label: &str, registry: &Arc<MetricsRegistry>) -> Self {
        info!(label, enabled = registry.is_enabled(), "Attaching storage meters");
        Self {
            inner,
            meters: DbMeters::new(label, registry),
        }
    }

    pub fn meters(&self) -> &DbMeters {
        &self.meters
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KeyValueStore> KeyValueStore for Metered<S> {
    type Batch = S::Batch;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        if !self.meters.is_enabled() {
            return self.inner.put(key, value);
        }
        let start = Instant::now();
        let result = self.inner.put(key, value);
        self.meters.put_timer.update_since(start);
        if result.is_ok() {
            self.meters.write_meter.mark(value.len() as u64);
        }
        result
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        if !self.meters.is_enabled() {
            return self.inner.get(key);
        }
        let start = Instant::now();
        let result = self.inner.get(key);
        self.meters.get_timer.update_since(start);
        match &result {
            Ok(value) => self.meters.read_meter.mark(value.len() as u64),
            Err(StorageError::NotFound) => self.meters.miss_meter.mark(1),
            Err(_) => {}
        }
        result
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.inner.has(key)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        if !self.meters.is_enabled() {
            return self.inner.delete(key);
        }
        let start = Instant::now();
        let result = self.inner.delete(key);
        self.meters.del_timer.update_since(start);
        result
    }

    fn new_batch(&self) -> Self::Batch {
        self.inner.new_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Batch;
    use crate::{Database, Table};
    use std::time::Duration;
    use tempfile::TempDir;

    const KEY1: &[u8] = b"key-aaaaa";
    const VALUE1: &[u8] = b"value-aaaaa";
    const KEY2: &[u8] = b"key-bbbbb";
    const VALUE2: &[u8] = b"value-bbbbb";
    const UNKNOWN_KEY: &[u8] = b"unknow";

    fn create_metered_db(enabled: bool) -> (Metered<Database>, Arc<MetricsRegistry>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let registry = Arc::new(MetricsRegistry::new(enabled));
        let db = Database::open(temp_dir.path(), 0, 0)
            .unwrap()
            .meter("prefix", &registry);
        (db, registry, temp_dir)
    }

    fn assert_timer_positive(timer: &Timer) {
        assert!(timer.min() > Duration::ZERO);
        assert!(timer.mean() > Duration::ZERO);
        assert!(timer.max() > Duration::ZERO);
    }

    #[test]
    fn test_database_meter() {
        let (db, _registry, _temp) = create_metered_db(true);
        let meters = db.meters().clone();

        db.put(KEY1, VALUE1).unwrap();
        db.put(KEY2, VALUE2).unwrap();
        assert_eq!(meters.put_timer.count(), 2);
        assert_timer_positive(&meters.put_timer);
        assert_eq!(meters.write_meter.count(), (VALUE1.len() + VALUE2.len()) as u64);

        assert_eq!(db.get(KEY1).unwrap(), VALUE1.to_vec());
        assert!(db.get(UNKNOWN_KEY).unwrap_err().is_not_found());
        assert_eq!(meters.get_timer.count(), 2);
        assert_timer_positive(&meters.get_timer);
        assert_eq!(meters.miss_meter.count(), 1);
        assert_eq!(meters.read_meter.count(), VALUE1.len() as u64);

        db.delete(KEY1).unwrap();
        db.delete(KEY2).unwrap();
        assert_eq!(meters.del_timer.count(), 2);
        assert_timer_positive(&meters.del_timer);
    }

    #[test]
    fn test_disabled_registry_records_nothing() {
        let (db, _registry, _temp) = create_metered_db(false);

        db.put(KEY1, VALUE1).unwrap();
        assert_eq!(db.get(KEY1).unwrap(), VALUE1.to_vec());
        assert!(db.get(UNKNOWN_KEY).unwrap_err().is_not_found());
        db.delete(KEY1).unwrap();

        let meters = db.meters();
        assert_eq!(meters.put_timer.count(), 0);
        assert_eq!(meters.get_timer.count(), 0);
        assert_eq!(meters.del_timer.count(), 0);
        assert_eq!(meters.write_meter.count(), 0);
        assert_eq!(meters.miss_meter.count(), 0);
    }

    #[test]
    fn test_toggle_applies_to_existing_meters() {
        let (db, registry, _temp) = create_metered_db(false);

        db.put(KEY1, VALUE1).unwrap();
        registry.set_enabled(true);
        db.put(KEY2, VALUE2).unwrap();
        registry.set_enabled(false);
        db.put(KEY1, VALUE2).unwrap();

        assert_eq!(db.meters().put_timer.count(), 1);
        assert_eq!(db.meters().write_meter.count(), VALUE2.len() as u64);
    }

    #[test]
    fn test_tables_on_metered_store_are_measured() {
        let (db, _registry, _temp) = create_metered_db(true);
        let table = Table::new(&db, "prefix-");

        table.put(KEY1, VALUE1).unwrap();
        assert_eq!(table.get(KEY1).unwrap(), VALUE1.to_vec());
        assert!(table.get(UNKNOWN_KEY).unwrap_err().is_not_found());
        table.delete(KEY1).unwrap();

        let meters = db.meters();
        assert_eq!(meters.put_timer.count(), 1);
        assert_eq!(meters.write_meter.count(), VALUE1.len() as u64);
        assert_eq!(meters.get_timer.count(), 2);
        assert_eq!(meters.read_meter.count(), VALUE1.len() as u64);
        assert_eq!(meters.miss_meter.count(), 1);
        assert_eq!(meters.del_timer.count(), 1);
    }

    #[test]
    fn test_has_and_batches_pass_through() {
        let (db, _registry, _temp) = create_metered_db(true);

        let mut batch = db.new_batch();
        batch.put(KEY1, VALUE1);
        batch.write().unwrap();
        assert!(db.has(KEY1).unwrap());

        let meters = db.meters();
        assert_eq!(meters.put_timer.count(), 0);
        assert_eq!(meters.get_timer.count(), 0);
        assert_eq!(meters.write_meter.count(), 0);
    }

    #[test]
    fn test_failed_put_records_latency_only() {
        let (db, _registry, _temp) = create_metered_db(true);
        db.inner().close();

        assert!(matches!(db.put(KEY1, VALUE1), Err(StorageError::Closed)));
        assert!(matches!(db.get(KEY1), Err(StorageError::Closed)));

        let meters = db.meters();
        assert_eq!(meters.put_timer.count(), 1);
        assert_eq!(meters.write_meter.count(), 0);
        assert_eq!(meters.get_timer.count(), 1);
        assert_eq!(meters.miss_meter.count(), 0);
    }

    #[test]
    fn test_shared_label_shares_instruments() {
        let temp_a = TempDir::new().unwrap();
        let temp_b = TempDir::new().unwrap();
        let registry = Arc::new(MetricsRegistry::new(true));
        let a = Database::open(temp_a.path(), 0, 0).unwrap().meter("shared", &registry);
        let b = Database::open(temp_b.path(), 0, 0).unwrap().meter("shared", &registry);

        a.put(KEY1, VALUE1).unwrap();
        b.put(KEY2, VALUE2).unwrap();

        assert_eq!(registry.timer("shared/put").count(), 2);
        assert_eq!(a.meters().label(), "shared");
    }
}
