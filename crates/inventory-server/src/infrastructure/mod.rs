//! Infrastructure layer for the inventory server.
//!
//! Contains the OS-facing adapters: the TCP listener and its three codecs,
//! the TOML snapshot and config files, and the terminal menu.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `inventory_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod network;
pub mod storage;
