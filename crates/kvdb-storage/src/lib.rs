//! Storage layer for kvdb.
//!
//! A thin capability layer over an embedded RocksDB instance:
//! - Point reads and writes through [`Database`]
//! - Atomic grouped writes via [`DbBatch`]
//! - Key-prefix namespaces sharing one store via [`Table`]
//! - Opt-in latency and byte accounting via [`Metered`]
//!
//! Every store type implements [`KeyValueStore`], so tables and the metering
//! decorator compose freely:
//!
//! ```no_run
//! use std::sync::Arc;
//! use kvdb_storage::{Database, KeyValueStore, MetricsRegistry, Table};
//!
//! # fn main() -> Result<(), kvdb_storage::StorageError> {
//! let registry = Arc::new(MetricsRegistry::new(true));
//! let db = Database::open("/tmp/kvdb", 0, 0)?.meter("chain", &registry);
//! let headers = Table::new(&db, "h-");
//! headers.put(b"0001", b"genesis")?;
//! assert_eq!(db.get(b"h-0001")?, b"genesis".to_vec());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod db;
pub mod error;
pub mod metered;
pub mod metrics;
pub mod options;
pub mod store;
pub mod table;

pub use batch::DbBatch;
pub use db::{Database, StorageStats};
pub use error::StorageError;
pub use metered::{DbMeters, Metered};
pub use metrics::{Meter, MetricsRegistry, MetricsSnapshot, Timer, TimerSnapshot};
pub use options::StorageOptions;
pub use store::{Batch, KeyValueStore};
pub use table::{Table, TableBatch};
