//! Infrastructure layer for the client application.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `inventory_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – Connects to the server and implements `RpcClient` for
//!   the binary, HTTP-tunnelled and JSON-RPC bindings.

pub mod network;
