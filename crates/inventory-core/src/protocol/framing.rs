//! Async framing of binary frames over any byte stream.
//!
//! Both binary bindings (raw TCP and HTTP-tunnelled) use these helpers once
//! the connection is established, so the server and client never touch the
//! header layout directly.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::codec::{decode_body, decode_header, encode_frame, FrameHeader, ProtocolError};
use crate::protocol::messages::{Frame, HEADER_SIZE};

/// Failures that end a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket failed.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A JSON-RPC line could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP CONNECT exchange was refused or malformed.
    #[error("HTTP handshake failed: {0}")]
    Handshake(String),

    /// The peer sent something that does not fit the conversation.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The first bytes on the stream belong to a different binding.
    #[error("not speaking this binding: {0}")]
    WrongBinding(String),

    /// No reply arrived within the client's reply timeout.
    #[error("no reply within {0:?}")]
    TimedOut(Duration),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,
}

/// Reads one frame's header and raw payload.
///
/// Returns `Ok(None)` when the peer closes the stream cleanly between frames.
/// The payload is left undecoded so a caller can answer a bad body without
/// losing its place in the stream.
///
/// # Errors
///
/// Returns [`TransportError`] on I/O failure, a stream closed mid-frame, or
/// an invalid header.
pub async fn read_raw_frame<R>(reader: &mut R) -> Result<Option<(FrameHeader, Vec<u8>)>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; HEADER_SIZE];

    // The first byte decides between a clean close and a frame.
    if reader.read(&mut header_buf[..1]).await? == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut header_buf[1..]).await?;

    let header = decode_header(&header_buf)?;
    let mut payload = vec![0u8; header.payload_len];
    if header.payload_len > 0 {
        reader.read_exact(&mut payload).await?;
    }
    Ok(Some((header, payload)))
}

/// Reads and decodes one frame, returning it with its sequence number.
///
/// # Errors
///
/// See [`read_raw_frame`]; additionally fails if the payload does not decode.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<(Frame, u64)>, TransportError>
where
    R: AsyncRead + Unpin,
{
    match read_raw_frame(reader).await? {
        Some((header, payload)) => {
            let frame = decode_body(header.message_type, &payload)?;
            Ok(Some((frame, header.sequence_number)))
        }
        None => Ok(None),
    }
}

/// Encodes `frame` and writes it in full, then flushes.
///
/// # Errors
///
/// Returns [`TransportError`] if encoding or the write fails.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame, sequence_number: u64) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode_frame(frame, sequence_number)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
