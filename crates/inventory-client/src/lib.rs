//! inventory-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does inventory-client do? (for beginners)
//!
//! The *client* is a thin terminal front end.  It holds no inventory of its
//! own; every `show`, `add` and `update` typed at its menu becomes one remote
//! call to the server, and the reply is printed as a table or a message.
//!
//! The client application:
//!
//! 1. Resolves the port and binding flags, which must match the server's.
//! 2. Opens one TCP connection and, for the HTTP binding, performs the
//!    CONNECT handshake.
//! 3. Reads menu lines (or a single command from the command line), parses
//!    each into a typed `Command` and sends it through the binding's codec.
//! 4. Renders the `Response`.  A transport failure ends the program.

/// Application layer: the dispatcher and the `RpcClient` port.
pub mod application;

/// Infrastructure layer: the three client-side codecs.
pub mod infrastructure;

pub use application::dispatch::{ClientError, Dispatcher, RpcClient};
pub use infrastructure::network::{connect, DEFAULT_REPLY_TIMEOUT};
