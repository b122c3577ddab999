//! Transport selection shared by the server and the client.
//!
//! Both ends are configured with the same three settings: a port and the two
//! binding flags.  [`TransportConfig::resolve`] turns those raw settings into
//! a [`Binding`], failing fast on the combinations that cannot work.  A client
//! and server whose bindings differ cannot talk to each other; that shows up
//! as a connection failure, not as a protocol-level error.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems that prevent a process from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be set to a non-zero value")]
    MissingPort,

    #[error("use_http and use_json are mutually exclusive")]
    ConflictingTransports,

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("cannot read config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// The three wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Binary frames directly on TCP.
    Tcp,
    /// Binary frames after an HTTP CONNECT handshake.
    Http,
    /// Newline-delimited JSON-RPC on TCP.
    Json,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transport::Tcp => "binary/tcp",
            Transport::Http => "binary/http",
            Transport::Json => "json-rpc/tcp",
        };
        f.write_str(name)
    }
}

/// Raw transport settings, as collected from flags, environment or a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub port: Option<u16>,
    pub use_http: bool,
    pub use_json: bool,
}

/// A validated port + encoding pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub port: u16,
    pub transport: Transport,
}

impl TransportConfig {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingPort`] for an unset or zero port,
    /// [`ConfigError::ConflictingTransports`] when both flags are set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inventory_core::config::{Transport, TransportConfig};
    ///
    /// let cfg = TransportConfig { port: Some(1234), use_http: false, use_json: true };
    /// assert_eq!(cfg.resolve().unwrap().transport, Transport::Json);
    /// ```
    pub fn resolve(&self) -> Result<Binding, ConfigError> {
        let port = match self.port {
            Some(p) if p != 0 => p,
            _ => return Err(ConfigError::MissingPort),
        };
        let transport = match (self.use_http, self.use_json) {
            (true, true) => return Err(ConfigError::ConflictingTransports),
            (true, false) => Transport::Http,
            (false, true) => Transport::Json,
            (false, false) => Transport::Tcp,
        };
        Ok(Binding { port, transport })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
