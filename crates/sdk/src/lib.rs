//! Functions SDK - Rust Client Library
//!
//! Talks to the local dev server started by `functions-dev`.
//!
//! # Example
//!
//! ```no_run
//! use functions_sdk::FunctionClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FunctionClient::connect("http://127.0.0.1:8787").await?;
//!
//!     let result = client.call("echo", vec![json!("hello")]).await?;
//!     println!("echo returned: {:?}", result.value);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::FunctionClient;
pub use error::{Result, SdkError};
pub use types::{CallRequest, CallResult, InvokeRequest, InvokeResponse, MethodsResponse};
