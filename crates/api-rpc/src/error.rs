//! RPC Error Types
//!
//! Maps dev-server failures to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
}

pub fn validation_error(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg.into(), None::<()>)
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

pub fn internal_error(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg.into(), None::<()>)
}

/// Failures while starting the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to build server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register method {method}: {reason}")]
    Register { method: String, reason: String },
}
