//! Message types shared by every Inventory-RPC binding.
//!
//! The three remote methods and their argument/result types are the same on
//! all transports; only the framing differs.  The binary bindings (raw TCP and
//! HTTP-tunnelled) wrap them in a [`Frame`], the JSON binding wraps them in
//! [`crate::protocol::jsonrpc`] envelopes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Command, Response, Verb};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current binary protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of the binary frame header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Largest payload a peer will accept, in bytes.
pub const MAX_PAYLOAD: usize = 16 * 1024 * 1024;

// ── Message type codes ────────────────────────────────────────────────────────

/// Frame kind, carried in the second header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    Request = 0x01,
    Response = 0x02,
    Error = 0x03,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::Request),
            0x02 => Ok(MessageType::Response),
            0x03 => Ok(MessageType::Error),
            _ => Err(()),
        }
    }
}

// ── Remote methods ────────────────────────────────────────────────────────────

/// The three remotely callable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    ShowInventory,
    AddInventory,
    UpdateInventory,
}

impl Method {
    /// Wire name, as used in the JSON `method` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::ShowInventory => "ShowInventory",
            Method::AddInventory => "AddInventory",
            Method::UpdateInventory => "UpdateInventory",
        }
    }

    /// The method a command with this verb is sent through.
    pub fn for_verb(verb: Verb) -> Self {
        match verb {
            Verb::Show => Method::ShowInventory,
            Verb::Add => Method::AddInventory,
            Verb::Update => Method::UpdateInventory,
        }
    }

    /// The verb this method accepts.
    pub fn verb(self) -> Verb {
        match self {
            Method::ShowInventory => Verb::Show,
            Method::AddInventory => Verb::Add,
            Method::UpdateInventory => Verb::Update,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`Method::from_str`] for a name that is not one of the three methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A `Service.Method` prefix is tolerated so `Inventory.AddInventory` works too.
        let name = s.rsplit('.').next().unwrap_or(s);
        match name {
            "ShowInventory" => Ok(Method::ShowInventory),
            "AddInventory" => Ok(Method::AddInventory),
            "UpdateInventory" => Ok(Method::UpdateInventory),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

// ── Frames ────────────────────────────────────────────────────────────────────

/// One binary call: which method, with which command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: Method,
    pub command: Command,
}

impl RpcRequest {
    /// Builds the request that carries `command` through its verb's method.
    pub fn for_command(command: Command) -> Self {
        Self {
            method: Method::for_verb(command.verb),
            command,
        }
    }
}

/// A decoded binary frame.
///
/// `Error` is a transport-level complaint (undecodable request, wrong frame
/// kind).  Business failures always travel as `Response { ok: false }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Request(RpcRequest),
    Response(Response),
    Error(String),
}

impl Frame {
    /// Returns the wire type code for this frame.
    pub fn message_type(&self) -> MessageType {
        match self {
            Frame::Request(_) => MessageType::Request,
            Frame::Response(_) => MessageType::Response,
            Frame::Error(_) => MessageType::Error,
        }
    }
}
