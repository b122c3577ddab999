//! The live inventory and its durable snapshot.
//!
//! [`RecordStore`] owns the in-memory [`InventoryCollection`] behind a
//! `RwLock` and a [`SnapshotSink`] that knows how to read and write the
//! snapshot.  The store itself never touches the file system; the sink is
//! injected, so tests can swap in a mock that fails on demand.
//!
//! All mutation is in memory.  Persisting is a separate, explicit
//! [`RecordStore::snapshot`] call that writes the whole collection on
//! Tokio's blocking pool.  If it fails the memory state stays ahead of the
//! disk state; nothing is rolled back.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use inventory_core::{Field, InventoryCollection, InventoryError, InventoryRecord};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot content could not be parsed.
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    /// The collection could not be serialised.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),

    /// The blocking save task panicked or was cancelled.
    #[error("snapshot task did not finish: {0}")]
    Task(String),
}

/// Where the snapshot lives.
///
/// Infrastructure implements this with a TOML file; tests use the generated
/// `MockSnapshotSink`.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotSink: Send + Sync {
    /// Reads the snapshot.  `Ok(None)` means there is none yet.
    fn load(&self) -> Result<Option<InventoryCollection>, StorageError>;

    /// Overwrites the snapshot with `collection`.
    fn save(&self, collection: &InventoryCollection) -> Result<(), StorageError>;
}

/// In-memory records plus their snapshot sink.
pub struct RecordStore {
    records: RwLock<InventoryCollection>,
    sink: Arc<dyn SnapshotSink>,
}

impl RecordStore {
    /// Loads the snapshot through `sink` and wraps it in a store.
    ///
    /// A missing snapshot gives an empty store.  So does an unreadable or
    /// malformed one, with a warning; neither stops the server.
    pub fn open(sink: Box<dyn SnapshotSink>) -> Self {
        let records = match sink.load() {
            Ok(Some(collection)) => {
                info!("loaded {} record(s) from snapshot", collection.len());
                collection
            }
            Ok(None) => {
                info!("no snapshot found; starting with an empty inventory");
                InventoryCollection::new()
            }
            Err(e) => {
                warn!("ignoring unusable snapshot: {e}");
                InventoryCollection::new()
            }
        };
        Self::with_records(records, sink)
    }

    /// Builds a store around an existing collection without loading anything.
    pub fn with_records(records: InventoryCollection, sink: Box<dyn SnapshotSink>) -> Self {
        Self {
            records: RwLock::new(records),
            sink: Arc::from(sink),
        }
    }

    pub fn find(&self, name: &str) -> Option<InventoryRecord> {
        self.read().find(name).cloned()
    }

    /// A copy of every record, taken at one point in time.
    pub fn find_all(&self) -> Vec<InventoryRecord> {
        self.read().find_all().to_vec()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains(name)
    }

    /// Appends `record`, rejecting a duplicate name.
    ///
    /// # Errors
    ///
    /// [`InventoryError::DuplicateKey`] if the name is already present.
    pub fn append(&self, record: InventoryRecord) -> Result<(), InventoryError> {
        self.write().append(record)
    }

    /// Overwrites one field.  Returns `false` if `name` is absent.
    pub fn update_field(&self, name: &str, field: Field, value: &str) -> bool {
        self.write().update_field(name, field, value)
    }

    /// Writes a copy of the whole collection through the sink.
    ///
    /// The sink does file I/O, so it runs under `spawn_blocking` rather than
    /// on a runtime worker.
    ///
    /// # Errors
    ///
    /// Whatever the sink reports, or [`StorageError::Task`] if the blocking
    /// task dies; the in-memory state is left as it is.
    pub async fn snapshot(&self) -> Result<(), StorageError> {
        let copy = self.read().clone();
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || sink.save(&copy))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    // A panic while holding the lock cannot leave the Vec half-updated in a
    // way readers would notice, so a poisoned lock is simply reused.
    fn read(&self) -> RwLockReadGuard<'_, InventoryCollection> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InventoryCollection> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
