//! TOML snapshot of the inventory.
//!
//! The whole collection is one document, one `[[vegetable]]` table per record
//! in insertion order:
//!
//! ```toml
//! [[vegetable]]
//! name = "carrot"
//! unitPrice = "2.50"
//! stockKg = "100"
//! ```
//!
//! Every save rewrites the full document.  It is written to a temporary
//! sibling file first and then renamed over the target, so a crash mid-write
//! leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use inventory_core::InventoryCollection;
use tracing::warn;

use crate::application::record_store::{SnapshotSink, StorageError};

/// A [`SnapshotSink`] backed by a TOML file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SnapshotSink for SnapshotFile {
    fn load(&self) -> Result<Option<InventoryCollection>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let collection: InventoryCollection =
                    toml::from_str(&content).map_err(|e| StorageError::Malformed(e.to_string()))?;
                // Re-collect so a hand-edited file with repeated names still
                // yields unique keys.  Each dropped name is logged on the way.
                let unique = InventoryCollection::from(collection.find_all().to_vec());
                if unique.len() < collection.len() {
                    warn!(
                        "snapshot {} repeats {} name(s); kept the first of each",
                        self.path.display(),
                        collection.len() - unique.len()
                    );
                }
                Ok(Some(unique))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(&self.path, e)),
        }
    }

    fn save(&self, collection: &InventoryCollection) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(dir, e))?;
        }

        let content =
            toml::to_string_pretty(collection).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(|e| self.io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
