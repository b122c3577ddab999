//! Network infrastructure: the transport multiplexer.
//!
//! One listener, one binding per server instance.  [`serve`] accepts
//! connections and hands each to the codec of the configured [`Transport`]
//! in its own Tokio task; all three codecs call the same
//! [`InventoryService`] handlers, so behaviour is identical on every binding.
//!
//! # Sub-modules
//!
//! - **`binary`** – Binary frames on raw TCP, and the same frames after an
//!   HTTP CONNECT handshake.
//! - **`json`** – Newline-delimited JSON-RPC on TCP.
//!
//! # Lifecycle
//!
//! `accept()` is polled with a short timeout so the loop notices a cleared
//! `running` flag within [`ACCEPT_POLL`].  When the loop returns the listener
//! is dropped and the port is released.  Connections already accepted finish
//! on their own tasks.

pub mod binary;
pub mod json;

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use inventory_core::{Transport, TransportError};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::inventory_service::InventoryService;

/// How often the accept loop re-checks the `running` flag.
pub const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Serves `transport` on an already bound listener until `running` is cleared.
///
/// Per-connection failures are logged, never returned.
pub async fn serve(
    listener: TcpListener,
    transport: Transport,
    service: Arc<InventoryService>,
    running: Arc<AtomicBool>,
) {
    match listener.local_addr() {
        Ok(addr) => info!("inventory server listening on {addr} ({transport})"),
        Err(_) => info!("inventory server listening ({transport})"),
    }

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    handle_connection(stream, peer, transport, service).await;
                });
            }
            Ok(Err(e)) => {
                // Transient (e.g. out of file descriptors); keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection within ACCEPT_POLL.
            }
        }
    }

    drop(listener);
    info!("listener released");
}

/// Runs one connection to completion and logs how it ended.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    transport: Transport,
    service: Arc<InventoryService>,
) {
    let id = Uuid::new_v4();
    info!("connection {id} accepted from {peer}");

    let result: Result<(), TransportError> = match transport {
        Transport::Tcp => binary::serve_frames(&mut stream, &service).await,
        Transport::Http => binary::serve_http(&mut stream, &service).await,
        Transport::Json => json::serve_json(stream, &service).await,
    };

    match result {
        Ok(()) => info!("connection {id} closed"),
        Err(e) => warn!("connection {id} from {peer} closed with error: {e}"),
    }
}
