//! Wire protocol: binary frames, the HTTP tunnel handshake and JSON-RPC envelopes.

pub mod codec;
pub mod framing;
pub mod http;
pub mod jsonrpc;
pub mod messages;
pub mod sequence;

pub use codec::{decode_frame, encode_frame, FrameHeader, ProtocolError};
pub use framing::{read_frame, read_raw_frame, write_frame, TransportError};
pub use jsonrpc::{read_json_line, IncomingCall, JsonRpcRequest, JsonRpcResponse};
pub use messages::*;
pub use sequence::SequenceCounter;
