//! # inventory-core
//!
//! Shared library for Inventory-RPC containing the domain model, the wire
//! protocol for all three bindings, transport configuration and the
//! interactive menu.
//!
//! This crate is used by both the server and the client.  It never opens a
//! socket or a file; the async helpers in [`protocol`] work on any stream.
//!
//! # Architecture overview (for beginners)
//!
//! Inventory-RPC is a small remote inventory service.  A server keeps a list
//! of vegetables (name, unit price, stock) and lets clients show, add and
//! update them over one of three interchangeable wire encodings.
//!
//! - **`domain`** – What a record is, how a command line becomes a typed
//!   [`domain::Operation`], and the [`domain::Response`] every call returns.
//!
//! - **`protocol`** – How a call travels: 16-byte-header binary frames (raw or
//!   behind an HTTP CONNECT), or newline-delimited JSON-RPC.
//!
//! - **`config`** – Turns the port and the two binding flags into a validated
//!   [`config::Binding`].
//!
//! - **`console`** / **`render`** – The line menu both binaries run, and the
//!   tables it prints.

pub mod config;
pub mod console;
pub mod domain;
pub mod protocol;
pub mod render;

// Re-export the most-used types at the crate root so callers can write
// `inventory_core::Command` instead of `inventory_core::domain::command::Command`.
pub use config::{Binding, ConfigError, Transport, TransportConfig};
pub use domain::{
    Command, CommandError, Field, InventoryCollection, InventoryError, InventoryRecord, Operation,
    Response, Target, Verb, BUSY_MESSAGE,
};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
pub use protocol::messages::{Frame, Method};
pub use protocol::TransportError;
