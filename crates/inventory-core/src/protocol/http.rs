//! HTTP CONNECT handshake for the HTTP-tunnelled binary binding.
//!
//! The client opens a TCP connection, sends a single `CONNECT` request for
//! [`RPC_PATH`] and waits for the `200` status line.  After that exchange the
//! same socket carries ordinary binary frames; there is no further HTTP.
//!
//! The head is read one byte at a time up to the blank line so no byte of
//! the first frame is consumed by the handshake.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::protocol::framing::TransportError;

/// The only path the server accepts.
pub const RPC_PATH: &str = "/_inventoryRPC_";

/// Status line the server replies with on success.
pub const CONNECTED_STATUS: &str = "HTTP/1.0 200 Connected to Inventory RPC";

/// Upper bound on the size of a request or response head.
const MAX_HEAD: usize = 8 * 1024;

/// Sends the CONNECT request and checks the server's reply.
///
/// # Errors
///
/// Returns [`TransportError::Handshake`] if the server answers with anything
/// other than a `200` status, or an I/O error if the stream fails.
pub async fn client_handshake<S>(stream: &mut S) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = format!("CONNECT {RPC_PATH} HTTP/1.0\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let head = read_head(stream).await?;
    let status = head.lines().next().unwrap_or_default();
    let code = status.split_whitespace().nth(1);
    if code != Some("200") {
        return Err(TransportError::Handshake(format!("unexpected status: {status}")));
    }
    debug!("HTTP tunnel established: {status}");
    Ok(())
}

/// Reads the client's request head and answers it.
///
/// On success the `200` status line has been written and the stream is ready
/// for binary frames.
///
/// # Errors
///
/// A wrong method gets a `405` reply, a wrong path a `404`; both are then
/// reported as [`TransportError::Handshake`] so the caller closes the socket.
pub async fn server_handshake<S>(stream: &mut S) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let head = read_head(stream).await?;
    let request_line = head.lines().next().unwrap_or_default().to_string();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();

    if method != "CONNECT" {
        reply(stream, "405 Method Not Allowed", "405 must CONNECT\n").await?;
        return Err(TransportError::Handshake(format!("method not allowed: {method}")));
    }
    if path != RPC_PATH {
        reply(stream, "404 Not Found", "404 page not found\n").await?;
        return Err(TransportError::Handshake(format!("unknown path: {path}")));
    }

    stream
        .write_all(format!("{CONNECTED_STATUS}\r\n\r\n").as_bytes())
        .await?;
    stream.flush().await?;
    Ok(())
}

async fn reply<S>(stream: &mut S, status: &str, body: &str) -> Result<(), TransportError>
where
    S: AsyncWrite + Unpin,
{
    let response = format!(
        "HTTP/1.0 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Reads bytes up to and including the first blank line.
///
/// Gives up on the first byte if it cannot start an HTTP head, so a binary
/// or JSON peer is turned away at once instead of waiting for a blank line.
async fn read_head<S>(stream: &mut S) -> Result<String, TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut head = Vec::with_capacity(128);
    let mut byte = [0u8; 1];
    loop {
        if stream.read(&mut byte).await? == 0 {
            return Err(TransportError::Closed);
        }
        // Request and status lines both open with a letter (`CONNECT`, `HTTP/`).
        if head.is_empty() && !byte[0].is_ascii_alphabetic() {
            return Err(TransportError::WrongBinding(format!(
                "expected an HTTP head, first byte is {:#04x}",
                byte[0]
            )));
        }
        head.push(byte[0]);
        if head.ends_with(b"\r\n\r\n") || head.ends_with(b"\n\n") {
            break;
        }
        if head.len() > MAX_HEAD {
            return Err(TransportError::Handshake("HTTP head too large".to_string()));
        }
    }
    String::from_utf8(head).map_err(|_| TransportError::Handshake("HTTP head is not UTF-8".to_string()))
}
