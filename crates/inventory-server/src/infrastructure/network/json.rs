//! Server side of the JSON-RPC binding.
//!
//! One request object per line, one reply object per line.  A request the
//! server cannot run (unknown method, bad parameters) gets a reply with
//! `error` set and the connection stays open.  A line that is not a JSON-RPC
//! envelope at all ends the connection: there is no `id` to answer to.  So
//! does input from a peer on the wrong binding, whose first byte is not `{`,
//! and any line longer than [`MAX_PAYLOAD`].

use inventory_core::protocol::{read_json_line, IncomingCall, JsonRpcResponse, MAX_PAYLOAD};
use inventory_core::{Command, Method, TransportError};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::application::inventory_service::InventoryService;

/// Serves JSON-RPC lines until the peer closes the stream.
///
/// # Errors
///
/// Returns [`TransportError::Json`] for an unparsable envelope,
/// [`TransportError::WrongBinding`] or an oversized-line protocol error for
/// input from another binding, or an I/O error.
pub async fn serve_json<S>(stream: S, service: &InventoryService) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    while let Some(line) = read_json_line(&mut reader, MAX_PAYLOAD).await? {
        let call: IncomingCall = serde_json::from_slice(&line)?;
        let reply = answer(call, service).await;

        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        write_half.write_all(&out).await?;
        write_half.flush().await?;
    }
    Ok(())
}

async fn answer(call: IncomingCall, service: &InventoryService) -> JsonRpcResponse {
    let method = match call.method.parse::<Method>() {
        Ok(method) => method,
        Err(e) => {
            warn!("JSON-RPC call rejected: {e}");
            return JsonRpcResponse::error(call.id, e.to_string());
        }
    };

    let param = match <[serde_json::Value; 1]>::try_from(call.params) {
        Ok([param]) => param,
        Err(params) => {
            return JsonRpcResponse::error(
                call.id,
                format!("{method} takes exactly one parameter, got {}", params.len()),
            );
        }
    };
    let command: Command = match serde_json::from_value(param) {
        Ok(command) => command,
        Err(e) => {
            warn!("JSON-RPC {method} with a malformed command: {e}");
            return JsonRpcResponse::error(call.id, format!("invalid parameter for {method}: {e}"));
        }
    };

    debug!("json call {method}: {command}");
    JsonRpcResponse::result(call.id, service.dispatch(method, &command).await)
}
