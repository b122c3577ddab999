//! JSON-RPC envelopes for the JSON binding.
//!
//! One JSON object per line in each direction.  A request names the method
//! and carries the [`Command`] as its single positional parameter; the reply
//! carries the [`Response`] in `result` or a transport-level complaint in
//! `error`, never both.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::domain::{Command, Response};
use crate::protocol::codec::ProtocolError;
use crate::protocol::framing::TransportError;
use crate::protocol::messages::Method;

/// A call as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Command>,
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    pub fn new(method: Method, command: Command, id: u64) -> Self {
        Self {
            method: method.as_str().to_string(),
            params: vec![command],
            id: Value::from(id),
        }
    }
}

/// A call as received by the server.
///
/// Parameters stay raw until the method is known, so a malformed command
/// can still be answered under the caller's `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingCall {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    pub id: Value,
}

/// The server's answer to one [`JsonRpcRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Value,
    pub result: Option<Response>,
    pub error: Option<String>,
}

impl JsonRpcResponse {
    pub fn result(id: Value, response: Response) -> Self {
        Self {
            id,
            result: Some(response),
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Reads the next non-blank JSON line, without its line ending.
///
/// Returns `Ok(None)` at end of stream.  Every line must open with `{`; the
/// first other non-blank byte ends the read at once, so a peer speaking
/// binary frames or HTTP is rejected without waiting for a newline.
///
/// # Errors
///
/// [`TransportError::WrongBinding`] for a line that does not open with `{`,
/// [`ProtocolError::FrameTooLarge`] once a line passes `max_len` bytes.
pub async fn read_json_line<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        let (used, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                // A last line without a newline still counts.
                return Ok(Some(line).filter(|l| !l.iter().all(u8::is_ascii_whitespace)));
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    line.extend_from_slice(&available[..end]);
                    (end + 1, true)
                }
                None => {
                    line.extend_from_slice(available);
                    (available.len(), false)
                }
            }
        };
        reader.consume(used);

        if let Some(&first) = line.iter().find(|b| !b.is_ascii_whitespace()) {
            if first != b'{' {
                return Err(TransportError::WrongBinding(format!(
                    "expected a JSON object, first byte is {first:#04x}"
                )));
            }
        }
        if line.len() > max_len {
            return Err(ProtocolError::FrameTooLarge(line.len()).into());
        }
        if complete {
            if line.iter().all(u8::is_ascii_whitespace) {
                line.clear();
                continue;
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            return Ok(Some(line));
        }
    }
}
