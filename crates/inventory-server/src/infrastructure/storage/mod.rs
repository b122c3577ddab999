//! Storage infrastructure: the inventory snapshot and the server config file.
//!
//! - `snapshot_file` implements the application's `SnapshotSink` with a TOML
//!   document written via a temporary file and a rename.
//! - `config` reads the optional `--config` file and merges it with the
//!   command-line settings.

pub mod config;
pub mod snapshot_file;
