//! Server settings: optional TOML file plus command-line overrides.
//!
//! # File format
//!
//! ```toml
//! [server]
//! port = 9000
//! bind_address = "0.0.0.0"
//! use_http = false
//! use_json = true
//! delay_ms = 0
//! db_path = "inventory.toml"
//! ```
//!
//! Every key is optional.  A value given on the command line (or through its
//! `INVENTORY_*` environment variable) wins over the file; anything set in
//! neither place falls back to the defaults below.
//!
//! | Key            | Default          |
//! |----------------|------------------|
//! | `port`         | none (required)  |
//! | `bind_address` | `0.0.0.0`        |
//! | `use_http`     | `false`          |
//! | `use_json`     | `false`          |
//! | `delay_ms`     | `0`              |
//! | `db_path`      | `inventory.toml` |

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use inventory_core::{Binding, ConfigError, TransportConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_DB_PATH: &str = "inventory.toml";

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level document of the `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

/// Raw, possibly partial server settings.  Used for both the file and the
/// command-line layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub use_http: Option<bool>,
    pub use_json: Option<bool>,
    pub delay_ms: Option<u64>,
    pub db_path: Option<PathBuf>,
}

impl ServerSection {
    /// Fills every unset field of `self` from `fallback`.
    pub fn or(self, fallback: ServerSection) -> ServerSection {
        ServerSection {
            port: self.port.or(fallback.port),
            bind_address: self.bind_address.or(fallback.bind_address),
            use_http: self.use_http.or(fallback.use_http),
            use_json: self.use_json.or(fallback.use_json),
            delay_ms: self.delay_ms.or(fallback.delay_ms),
            db_path: self.db_path.or(fallback.db_path),
        }
    }
}

/// Fully resolved, validated settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_address: IpAddr,
    pub binding: Binding,
    pub delay: Duration,
    pub db_path: PathBuf,
}

impl ServerSettings {
    /// Applies defaults to `section` and validates it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingPort`], [`ConfigError::ConflictingTransports`]
    /// or [`ConfigError::InvalidAddress`].
    pub fn resolve(section: ServerSection) -> Result<Self, ConfigError> {
        let binding = TransportConfig {
            port: section.port,
            use_http: section.use_http.unwrap_or(false),
            use_json: section.use_json.unwrap_or(false),
        }
        .resolve()?;

        let address = section
            .bind_address
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = address
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidAddress(address.clone()))?;

        Ok(Self {
            bind_address,
            binding,
            delay: Duration::from_millis(section.delay_ms.unwrap_or(0)),
            db_path: section
                .db_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.binding.port)
    }
}

// ── Config file ───────────────────────────────────────────────────────────────

/// Reads and parses the `--config` file.
///
/// # Errors
///
/// Returns [`ConfigError::File`] if the file cannot be read or parsed.  An
/// explicitly named config file that is missing is an error, unlike the
/// inventory snapshot.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let file_error = |reason: String| ConfigError::File {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    toml::from_str(&content).map_err(|e| file_error(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
