//! inventory-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::inventory_service::InventoryService;
pub use application::record_store::RecordStore;
pub use infrastructure::network::serve;
pub use infrastructure::storage::snapshot_file::SnapshotFile;
