//! Network infrastructure for the client application.
//!
//! Opens one TCP connection to the server and wraps it in the codec that
//! matches the configured [`Transport`].  The codec must match the server's
//! binding exactly; a mismatch shows up as a [`ClientError`] on the first
//! call (or during the HTTP handshake), never as an `ok == false` response.
//!
//! # Sub-modules
//!
//! - **`binary`** – Binary frames, with or without the HTTP CONNECT preamble.
//! - **`json`** – Newline-delimited JSON-RPC.

pub mod binary;
pub mod json;

use std::time::Duration;

use inventory_core::{Binding, Transport};
use tokio::net::TcpStream;
use tracing::info;

use crate::application::dispatch::{ClientError, RpcClient};
use binary::BinaryClient;
use json::JsonClient;

/// Default server host when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bound on waiting for a reply (or the HTTP handshake answer).
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Connects to `host` on the binding's port and returns the matching codec.
///
/// Every reply read by the returned client is bounded by `reply_timeout`.
///
/// # Errors
///
/// Returns [`ClientError::ConnectFailed`] if the TCP connection cannot be
/// opened, or a transport error if the HTTP handshake is refused or times out.
pub async fn connect(
    binding: Binding,
    host: &str,
    reply_timeout: Duration,
) -> Result<Box<dyn RpcClient>, ClientError> {
    let addr = format!("{host}:{}", binding.port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::ConnectFailed {
            addr: addr.clone(),
            source,
        })?;
    info!("connected to {addr} ({})", binding.transport);

    let client: Box<dyn RpcClient> = match binding.transport {
        Transport::Tcp => Box::new(BinaryClient::new(stream, reply_timeout)),
        Transport::Http => Box::new(BinaryClient::over_http(stream, reply_timeout).await?),
        Transport::Json => Box::new(JsonClient::new(stream, reply_timeout)),
    };
    Ok(client)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
