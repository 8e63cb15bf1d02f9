//! JSON-RPC Dev Server
//!
//! Exposes a FunctionRuntime over JSON-RPC 2.0 on localhost so tooling can
//! invoke a function without a host runtime.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use error::ServerError;
pub use handler::DevHandler;
pub use server::{DevServer, DevServerConfig};

pub use jsonrpsee::server::ServerHandle;
