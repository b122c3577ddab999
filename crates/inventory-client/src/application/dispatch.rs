//! Use case: send a typed command to the server and render the reply.
//!
//! The [`Dispatcher`] knows nothing about sockets.  It talks to the server
//! through the [`RpcClient`] port, which the network infrastructure
//! implements once per binding (binary, HTTP-tunnelled binary, JSON-RPC).
//!
//! # Two kinds of failure
//!
//! A `Response` with `ok == false` (not found, busy, bad arity) is an
//! ordinary outcome: it is rendered and the menu carries on.  A
//! [`ClientError`] means the call itself did not complete; the menu stops
//! and the process exits with that error.

use async_trait::async_trait;
use inventory_core::console::CommandSink;
use inventory_core::render::render_response;
use inventory_core::{Command, Method, Response, TransportError, Verb};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a client-side codec.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The stream failed, or carried something the codec could not read.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with an error instead of a response.
    #[error("server rejected the call: {0}")]
    Remote(String),

    /// The reply does not belong to the request that was just sent.
    #[error("reply {got} does not match request {expected}")]
    ReplyMismatch { expected: String, got: String },
}

/// One connection to the server, whatever the binding.
///
/// Calls are strictly sequential: one request, then its reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcClient: Send {
    async fn call(&mut self, method: Method, command: &Command) -> Result<Response, ClientError>;
}

/// Turns menu input into remote calls.
pub struct Dispatcher {
    client: Box<dyn RpcClient>,
}

impl Dispatcher {
    pub fn new(client: Box<dyn RpcClient>) -> Self {
        Self { client }
    }

    /// Sends `command` through the method that matches its verb.
    ///
    /// # Errors
    ///
    /// Returns the codec's [`ClientError`] if the call did not complete.
    pub async fn send(&mut self, command: &Command) -> Result<Response, ClientError> {
        let method = Method::for_verb(command.verb);
        debug!("calling {method} with '{command}'");
        self.client.call(method, command).await
    }
}

#[async_trait]
impl CommandSink for Dispatcher {
    async fn execute(&mut self, verb: Verb, args: &[String]) -> Result<String, String> {
        // An unrecognised target never reaches the server.
        let command = match Command::parse(verb, args) {
            Ok(command) => command,
            Err(e) => return Ok(format!("{}\n", Response::from(e).message)),
        };
        let response = self.send(&command).await.map_err(|e| e.to_string())?;
        Ok(render_response(&command, &response))
    }
}
