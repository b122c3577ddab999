//! Recoverable error taxonomy.
//!
//! Every error in this module ends up as a normal `Response { ok: false }`
//! sent back to the caller; none of them closes a connection.  The `Display`
//! text of each variant is exactly the message the user sees.

use thiserror::Error;

/// Message used for the busy rejection, exposed so callers can detect it.
pub const BUSY_MESSAGE: &str = "Server is busy! Please try again later!";

/// A command that could not be turned into an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Only the verb was supplied.
    #[error("Command should be specified!")]
    MissingTarget,

    /// The verb/target combination does not exist.  Carries the offending
    /// tokens for diagnostics.
    #[error("Unknown command format: '{0}'")]
    UnknownCommand(String),

    /// The right command with the wrong number of arguments.
    #[error("Invalid number of inputs for '{0}' command!")]
    InvalidArity(String),

    /// `add` with an empty vegetable name.
    #[error("Vegetable name must not be empty!")]
    EmptyName,
}

/// Business and contention errors raised while executing a valid operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Cannot add the vegetable! Vegetable '{0}' already exists!")]
    DuplicateKey(String),

    #[error("Vegetable '{0}' is not found!")]
    NotFound(String),

    /// Another mutating call holds the guard.  The caller may retry.
    #[error("{}", BUSY_MESSAGE)]
    Busy,

    /// The in-memory change was applied but the snapshot write failed.
    #[error("Vegetable '{name}' was changed in memory but could not be saved: {reason}")]
    Persistence { name: String, reason: String },
}
