//! RPC Request/Response Types
//!
//! Parameters and results of the dev-server methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// function.invoke.v1 - Run one invocation mapping through the runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// `{type, request|call|event, env}`
    pub invocation: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub invocation_id: String,
    pub output: Value,
}

/// function.call.v1 - Call one RPC method; the result is the RPC envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(default)]
    pub call_id: String,
}

/// function.methods.v1 - List callable methods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodsResponse {
    pub methods: Vec<String>,
}
