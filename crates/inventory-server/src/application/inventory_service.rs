//! The three remote operations: show, add and update.
//!
//! Every binding, and the server's own menu, ends up in one of the methods of
//! [`InventoryService`].  They always return a well-formed [`Response`]:
//! validation, business and contention failures become `ok == false` with a
//! message, never a transport error.
//!
//! # Write path
//!
//! ```text
//! validate ─▶ pre-check (duplicate / not found) ─▶ try_acquire ─▶ delay
//!          ─▶ mutate ─▶ snapshot ─▶ release (drop)
//! ```
//!
//! Everything before `try_acquire` is a pure read, so a malformed or doomed
//! write never occupies the slot.  Reads skip the guard entirely.

use std::time::Duration;

use inventory_core::{
    Command, CommandError, InventoryError, Method, Operation, Response, Verb,
};
use tracing::{debug, error, info, warn};

use crate::application::guard::BusyFlag;
use crate::application::record_store::RecordStore;

/// Operation handlers over one shared store and one busy flag.
///
/// Built once at startup and shared behind an `Arc` by every connection.
pub struct InventoryService {
    store: RecordStore,
    busy: BusyFlag,
    delay: Duration,
}

impl InventoryService {
    /// `delay` is an artificial latency applied to every operation.
    pub fn new(store: RecordStore, delay: Duration) -> Self {
        Self {
            store,
            busy: BusyFlag::new(),
            delay,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Routes `command` to the handler behind `method`.
    pub async fn dispatch(&self, method: Method, command: &Command) -> Response {
        debug!("{method}: {command}");
        match method {
            Method::ShowInventory => self.show_inventory(command).await,
            Method::AddInventory => self.add_inventory(command).await,
            Method::UpdateInventory => self.update_inventory(command).await,
        }
    }

    /// Routes `command` by its own verb.  Used by the server menu.
    pub async fn execute(&self, command: &Command) -> Response {
        self.dispatch(Method::for_verb(command.verb), command).await
    }

    pub async fn show_inventory(&self, command: &Command) -> Response {
        self.try_show(command).await.unwrap_or_else(|failure| failure)
    }

    pub async fn add_inventory(&self, command: &Command) -> Response {
        self.try_add(command).await.unwrap_or_else(|failure| failure)
    }

    pub async fn update_inventory(&self, command: &Command) -> Response {
        self.try_update(command).await.unwrap_or_else(|failure| failure)
    }

    // The `Err` side of these is itself a ready-made failure response, so
    // `?` turns any CommandError / InventoryError into the reply.

    async fn try_show(&self, command: &Command) -> Result<Response, Response> {
        let operation = operation_for(Verb::Show, command)?;
        self.pause().await;

        let records = match operation {
            Operation::ShowAll => self.store.find_all(),
            Operation::ShowOne { name } | Operation::ShowField { name, .. } => {
                let record = self
                    .store
                    .find(&name)
                    .ok_or(InventoryError::NotFound(name))?;
                vec![record]
            }
            Operation::Add(_) | Operation::Update { .. } => {
                return Err(unknown(command).into());
            }
        };
        Ok(Response::records(records))
    }

    async fn try_add(&self, command: &Command) -> Result<Response, Response> {
        let Operation::Add(record) = operation_for(Verb::Add, command)? else {
            return Err(unknown(command).into());
        };
        if self.store.contains(&record.name) {
            return Err(InventoryError::DuplicateKey(record.name).into());
        }

        let _slot = self.acquire()?;
        self.pause().await;

        let name = record.name.clone();
        // Re-checked under the write lock: another writer may have slipped in
        // between the pre-check and the acquire.
        self.store.append(record)?;
        self.persist(&name).await?;
        info!("added vegetable '{name}'");
        Ok(Response::added(&name))
    }

    async fn try_update(&self, command: &Command) -> Result<Response, Response> {
        let Operation::Update { name, field, value } = operation_for(Verb::Update, command)? else {
            return Err(unknown(command).into());
        };
        if !self.store.contains(&name) {
            return Err(InventoryError::NotFound(name).into());
        }

        let _slot = self.acquire()?;
        self.pause().await;

        if !self.store.update_field(&name, field, &value) {
            return Err(InventoryError::NotFound(name).into());
        }
        self.persist(&name).await?;
        info!("updated {field:?} of '{name}' to '{value}'");
        Ok(Response::updated(&name))
    }

    fn acquire(&self) -> Result<crate::application::guard::BusyGuard<'_>, InventoryError> {
        self.busy.try_acquire().ok_or_else(|| {
            warn!("rejecting write: another write is in progress");
            InventoryError::Busy
        })
    }

    async fn persist(&self, name: &str) -> Result<(), InventoryError> {
        self.store.snapshot().await.map_err(|e| {
            error!("snapshot failed after changing '{name}': {e}");
            InventoryError::Persistence {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Validates `command` for a handler that only accepts `expected`.
fn operation_for(expected: Verb, command: &Command) -> Result<Operation, CommandError> {
    if command.verb != expected {
        return Err(unknown(command));
    }
    command.validate()
}

fn unknown(command: &Command) -> CommandError {
    CommandError::UnknownCommand(command.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
