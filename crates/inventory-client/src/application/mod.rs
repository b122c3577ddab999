//! Application layer use cases for the client application.
//!
//! - **`dispatch`** – Parses menu input into a `Command`, sends it through
//!   whichever `RpcClient` the infrastructure connected, and renders the
//!   `Response`.  Unknown targets are answered locally.

pub mod dispatch;
