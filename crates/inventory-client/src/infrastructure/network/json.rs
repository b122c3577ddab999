//! Client side of the JSON-RPC binding.

use std::time::Duration;

use async_trait::async_trait;
use inventory_core::protocol::{read_json_line, JsonRpcRequest, JsonRpcResponse, MAX_PAYLOAD};
use inventory_core::{Command, Method, Response, TransportError};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::time::timeout;

use crate::application::dispatch::{ClientError, RpcClient};

/// Writes one request line per call and reads one reply line back.
///
/// A reply line must open with `{`, fit in [`MAX_PAYLOAD`] bytes and arrive
/// within `reply_timeout`.
pub struct JsonClient<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    next_id: u64,
    reply_timeout: Duration,
}

impl<S> JsonClient<S>
where
    S: AsyncRead + AsyncWrite,
{
    pub fn new(stream: S, reply_timeout: Duration) -> Self {
        let (read_half, writer) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer,
            next_id: 0,
            reply_timeout,
        }
    }
}

#[async_trait]
impl<S> RpcClient for JsonClient<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    async fn call(&mut self, method: Method, command: &Command) -> Result<Response, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = JsonRpcRequest::new(method, command.clone(), id);
        let mut line = serde_json::to_vec(&request).map_err(TransportError::from)?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .await
            .map_err(TransportError::from)?;
        self.writer.flush().await.map_err(TransportError::from)?;

        let reply = timeout(self.reply_timeout, read_json_line(&mut self.reader, MAX_PAYLOAD))
            .await
            .map_err(|_| TransportError::TimedOut(self.reply_timeout))??
            .ok_or(TransportError::Closed)?;
        let reply: JsonRpcResponse = serde_json::from_slice(&reply).map_err(TransportError::from)?;

        if reply.id != Value::from(id) {
            return Err(ClientError::ReplyMismatch {
                expected: id.to_string(),
                got: reply.id.to_string(),
            });
        }
        match (reply.result, reply.error) {
            (_, Some(error)) => Err(ClientError::Remote(error)),
            (Some(response), None) => Ok(response),
            (None, None) => Err(TransportError::UnexpectedReply(
                "reply has neither result nor error".to_string(),
            )
            .into()),
        }
    }
}
