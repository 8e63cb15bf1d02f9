// Central Error Types for the Function SDK

use thiserror::Error;

/// Errors raised while building or serializing the invocation model
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Malformed body: {0}")]
    MalformedBody(String),

    #[error("Body encoding error: {0}")]
    BodyEncoding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Handler error: {0}")]
    Handler(String),
}

/// Result type alias using FunctionError
pub type Result<T> = std::result::Result<T, FunctionError>;

/// Dispatch failures. Rendered into the `error` field of an RPC envelope,
/// never returned to the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Method '{0}' not found")]
    MethodNotFound(String),

    #[error("'{0}' is not callable")]
    NotCallable(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    InvocationFailed(String),

    #[error("{0}")]
    Panicked(String),
}

impl DispatchError {
    /// Failure raised from inside a method body
    pub fn failed(message: impl Into<String>) -> Self {
        DispatchError::InvocationFailed(message.into())
    }
}

impl From<FunctionError> for DispatchError {
    fn from(err: FunctionError) -> Self {
        DispatchError::InvocationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::InvocationFailed(err.to_string())
    }
}
