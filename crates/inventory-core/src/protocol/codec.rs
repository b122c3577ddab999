//! Binary codec for Inventory-RPC frames.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][reserved:2][payload_len:4][seq:8][payload:N]
//! ```
//! Total header size: 16 bytes. All multi-byte integers are big-endian.
//!
//! The payload is the `bincode` encoding of the frame body: an
//! [`RpcRequest`] for `Request`, a [`Response`] for `Response`, and a plain
//! string for `Error`.

use thiserror::Error;

use crate::domain::Response;
use crate::protocol::messages::{
    Frame, MessageType, RpcRequest, HEADER_SIZE, MAX_PAYLOAD, PROTOCOL_VERSION,
};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload could not be encoded or decoded.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The encoded payload length field does not match the actual data available.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// The declared payload exceeds [`MAX_PAYLOAD`].
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),
}

/// The fixed-size part of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub message_type: MessageType,
    pub payload_len: usize,
    pub sequence_number: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Frame`] into a byte vector including the 16-byte header.
///
/// The server echoes the request's `sequence_number` on its reply.
///
/// # Errors
///
/// Returns [`ProtocolError`] if serialization fails or the payload is too large.
///
/// # Examples
///
/// ```rust
/// use inventory_core::protocol::{decode_frame, encode_frame, Frame};
///
/// let frame = Frame::Error("bad request".to_string());
/// let bytes = encode_frame(&frame, 7).unwrap();
/// let (decoded, seq, consumed) = decode_frame(&bytes).unwrap();
/// assert_eq!(decoded, frame);
/// assert_eq!(seq, 7);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_frame(frame: &Frame, sequence_number: u64) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(frame)?;
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::FrameTooLarge(payload.len()));
    }
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.push(PROTOCOL_VERSION);
    buf.push(frame.message_type() as u8);
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.extend_from_slice(&sequence_number.to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Parses and validates the 16-byte header at the start of `bytes`.
///
/// # Errors
///
/// Returns [`ProtocolError`] for a short buffer, a wrong version, an unknown
/// type byte or an oversized payload length.
pub fn decode_header(bytes: &[u8]) -> Result<FrameHeader, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let type_byte = bytes[1];
    let message_type =
        MessageType::try_from(type_byte).map_err(|_| ProtocolError::UnknownMessageType(type_byte))?;

    // bytes[2..4] are reserved – ignored on decode

    let payload_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if payload_len > MAX_PAYLOAD {
        return Err(ProtocolError::FrameTooLarge(payload_len));
    }

    let mut seq = [0u8; 8];
    seq.copy_from_slice(&bytes[8..16]);

    Ok(FrameHeader {
        message_type,
        payload_len,
        sequence_number: u64::from_be_bytes(seq),
    })
}

/// Decodes the body of a frame whose header has already been read.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if `payload` is not a valid
/// encoding of the body `message_type` calls for.
pub fn decode_body(message_type: MessageType, payload: &[u8]) -> Result<Frame, ProtocolError> {
    match message_type {
        MessageType::Request => deserialize::<RpcRequest>(payload).map(Frame::Request),
        MessageType::Response => deserialize::<Response>(payload).map(Frame::Response),
        MessageType::Error => deserialize::<String>(payload).map(Frame::Error),
    }
}

/// Decodes one [`Frame`] from the beginning of `bytes`.
///
/// Returns the frame, its sequence number and the total number of bytes
/// consumed (header + payload).
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are malformed or incomplete.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, u64, usize), ProtocolError> {
    let header = decode_header(bytes)?;

    let total_needed = HEADER_SIZE + header.payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared: header.payload_len,
            available: bytes.len() - HEADER_SIZE,
        });
    }

    let frame = decode_body(header.message_type, &bytes[HEADER_SIZE..total_needed])?;
    Ok((frame, header.sequence_number, total_needed))
}

// ── Payload helpers ───────────────────────────────────────────────────────────

fn encode_payload(frame: &Frame) -> Result<Vec<u8>, ProtocolError> {
    let encoded = match frame {
        Frame::Request(request) => bincode::serialize(request),
        Frame::Response(response) => bincode::serialize(response),
        Frame::Error(message) => bincode::serialize(message),
    };
    encoded.map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

fn deserialize<T: serde::de::DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    bincode::deserialize(payload).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
