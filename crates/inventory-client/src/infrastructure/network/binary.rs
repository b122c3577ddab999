//! Client side of the binary binding and its HTTP-tunnelled variant.

use std::time::Duration;

use async_trait::async_trait;
use inventory_core::protocol::http::client_handshake;
use inventory_core::protocol::{read_frame, write_frame, RpcRequest, SequenceCounter};
use inventory_core::{Command, Frame, Method, Response, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::debug;

use crate::application::dispatch::{ClientError, RpcClient};

/// Sends request frames and waits for the response with the same sequence number.
///
/// A reply that does not arrive within `reply_timeout` fails the call with
/// [`TransportError::TimedOut`].
pub struct BinaryClient<S> {
    stream: S,
    seq: SequenceCounter,
    reply_timeout: Duration,
}

impl<S> BinaryClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, reply_timeout: Duration) -> Self {
        Self {
            stream,
            seq: SequenceCounter::new(),
            reply_timeout,
        }
    }

    /// Performs the HTTP CONNECT handshake, then speaks binary frames.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the server does not answer `200`, or
    /// does not answer within `reply_timeout`.
    pub async fn over_http(mut stream: S, reply_timeout: Duration) -> Result<Self, ClientError> {
        timeout(reply_timeout, client_handshake(&mut stream))
            .await
            .map_err(|_| TransportError::TimedOut(reply_timeout))??;
        Ok(Self::new(stream, reply_timeout))
    }
}

#[async_trait]
impl<S> RpcClient for BinaryClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn call(&mut self, method: Method, command: &Command) -> Result<Response, ClientError> {
        let seq = self.seq.next();
        let request = Frame::Request(RpcRequest {
            method,
            command: command.clone(),
        });
        write_frame(&mut self.stream, &request, seq).await?;

        let (frame, reply_seq) = timeout(self.reply_timeout, read_frame(&mut self.stream))
            .await
            .map_err(|_| TransportError::TimedOut(self.reply_timeout))??
            .ok_or(TransportError::Closed)?;
        debug!("reply #{reply_seq} to request #{seq}");
        if reply_seq != seq {
            return Err(ClientError::ReplyMismatch {
                expected: seq.to_string(),
                got: reply_seq.to_string(),
            });
        }

        match frame {
            Frame::Response(response) => Ok(response),
            Frame::Error(message) => Err(ClientError::Remote(message)),
            Frame::Request(_) => Err(TransportError::UnexpectedReply(
                "server sent a request frame".to_string(),
            )
            .into()),
        }
    }
}
