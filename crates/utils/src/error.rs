// Error Types for the utility helpers

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Input that failed a validation rule
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Offending value, when one was supplied
    pub value: Option<Value>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Operation did not finish within its bound
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("Invalid ISO 8601 datetime: {0}")]
    Parse(String),
}
