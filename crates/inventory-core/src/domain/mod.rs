//! Domain entities for Inventory-RPC.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from sockets, file systems or terminals.
//! - Can be compiled and tested anywhere without external setup.
//!
//! Here that means: what an inventory record is, how the collection keeps names
//! unique, how a command line becomes a typed [`command::Operation`], and what a
//! [`response::Response`] looks like.  The server and the client both depend on
//! this module; it depends on neither.

pub mod command;
pub mod errors;
pub mod record;
pub mod response;

pub use command::{Command, Operation, Target, Verb};
pub use errors::{CommandError, InventoryError, BUSY_MESSAGE};
pub use record::{Field, InventoryCollection, InventoryRecord};
pub use response::Response;
