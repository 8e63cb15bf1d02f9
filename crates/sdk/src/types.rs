//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to run one invocation mapping
#[derive(Debug, Clone, Serialize)]
pub struct InvokeRequest {
    pub invocation: Value,
}

/// Response from invoke operation
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeResponse {
    pub invocation_id: String,
    pub output: Value,
}

/// Request to call one RPC method
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallRequest {
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
    pub call_id: String,
}

/// RPC envelope: exactly one of `value` / `error` is set
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallResult {
    #[serde(rename = "callId", default)]
    pub call_id: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Response from methods operation
#[derive(Debug, Clone, Deserialize)]
pub struct MethodsResponse {
    pub methods: Vec<String>,
}
