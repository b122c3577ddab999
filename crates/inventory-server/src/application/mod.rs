//! Application layer of the inventory server.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules, in `inventory_core`) and the infrastructure
//! (sockets, files, terminals).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a request (e.g., "validate this
//!   add, take the writer slot, append, snapshot").
//! - **Depends on abstractions** (the `SnapshotSink` trait) rather than
//!   concrete implementations, so tests can inject failures.
//! - **Contains no network I/O and no file system access**.
//!
//! # Sub-modules
//!
//! - **`guard`** – The non-blocking single-writer flag.
//! - **`record_store`** – The live collection and its snapshot port.
//! - **`inventory_service`** – The show / add / update handlers every binding
//!   calls.

pub mod guard;
pub mod inventory_service;
pub mod record_store;
