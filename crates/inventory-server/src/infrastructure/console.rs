//! The server's own menu.
//!
//! Commands typed on the server terminal go straight to the shared
//! [`InventoryService`]: same busy guard, same snapshot, same messages as a
//! remote call, just without the network.

use std::sync::Arc;

use async_trait::async_trait;
use inventory_core::console::CommandSink;
use inventory_core::render::render_response;
use inventory_core::{Command, Response, Verb};

use crate::application::inventory_service::InventoryService;

/// [`CommandSink`] that executes in-process.
pub struct ServerConsole {
    service: Arc<InventoryService>,
}

impl ServerConsole {
    pub fn new(service: Arc<InventoryService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CommandSink for ServerConsole {
    async fn execute(&mut self, verb: Verb, args: &[String]) -> Result<String, String> {
        let command = match Command::parse(verb, args) {
            Ok(command) => command,
            Err(e) => return Ok(format!("{}\n", Response::from(e).message)),
        };
        let response = self.service.execute(&command).await;
        Ok(render_response(&command, &response))
    }
}
