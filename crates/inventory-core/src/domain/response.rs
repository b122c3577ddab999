//! The single result envelope returned by every operation.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{CommandError, InventoryError, BUSY_MESSAGE};
use crate::domain::record::InventoryRecord;

/// Message carried by a successful `show`.
pub const SHOW_OK_MESSAGE: &str = "Command executed successfully!";

/// Result of one remote call, identical on every binding.
///
/// `ok == false` is a normal outcome (not found, busy, bad arity, ...) and is
/// displayed to the user like any other response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    pub message: String,
    pub records: Vec<InventoryRecord>,
}

impl Response {
    /// A successful `show` carrying `records`.
    pub fn records(records: Vec<InventoryRecord>) -> Self {
        Self {
            ok: true,
            message: SHOW_OK_MESSAGE.to_string(),
            records,
        }
    }

    pub fn added(name: &str) -> Self {
        Self::success(format!("Vegetable '{name}' is added successfully!"))
    }

    pub fn updated(name: &str) -> Self {
        Self::success(format!("Vegetable '{name}' is updated successfully!"))
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            records: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            records: Vec::new(),
        }
    }

    /// `true` when the call was rejected because another write was in flight.
    pub fn is_busy(&self) -> bool {
        !self.ok && self.message == BUSY_MESSAGE
    }
}

impl From<CommandError> for Response {
    fn from(err: CommandError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<InventoryError> for Response {
    fn from(err: InventoryError) -> Self {
        Self::failure(err.to_string())
    }
}
