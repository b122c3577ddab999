//! Server side of the binary bindings.
//!
//! Each request frame is answered with exactly one frame carrying the same
//! sequence number.  A request whose body cannot be decoded is answered with
//! an `Error` frame and the connection carries on, because the header told
//! us where the next frame starts.  A bad header ends the connection.

use inventory_core::protocol::codec::decode_body;
use inventory_core::protocol::http::server_handshake;
use inventory_core::protocol::{read_raw_frame, write_frame};
use inventory_core::{Frame, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::application::inventory_service::InventoryService;

/// Serves binary frames until the peer closes the stream.
///
/// # Errors
///
/// Returns [`TransportError`] on I/O failure or an undecodable header.
pub async fn serve_frames<S>(stream: &mut S, service: &InventoryService) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some((header, payload)) = read_raw_frame(stream).await? {
        let reply = match decode_body(header.message_type, &payload) {
            Ok(Frame::Request(request)) => {
                debug!("frame #{} {}", header.sequence_number, request.method);
                Frame::Response(service.dispatch(request.method, &request.command).await)
            }
            Ok(other) => {
                warn!("client sent a {:?} frame instead of a request", other.message_type());
                Frame::Error(format!("expected a request frame, got {:?}", other.message_type()))
            }
            Err(e) => {
                warn!("undecodable request body: {e}");
                Frame::Error(e.to_string())
            }
        };
        write_frame(stream, &reply, header.sequence_number).await?;
    }
    Ok(())
}

/// Completes the HTTP CONNECT handshake, then serves binary frames.
///
/// # Errors
///
/// Returns [`TransportError::Handshake`] for a refused handshake (the 404 or
/// 405 reply has already been sent), otherwise as [`serve_frames`].
pub async fn serve_http<S>(stream: &mut S, service: &InventoryService) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    server_handshake(stream).await?;
    serve_frames(stream, service).await
}
