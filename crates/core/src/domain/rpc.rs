// RPC Domain Model (call + result envelope)

use crate::error::DispatchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One incoming RPC invocation
///
/// An empty method name is allowed; dispatch reports it as not found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcCall {
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub args: Vec<Value>,

    #[serde(default)]
    pub kwargs: Map<String, Value>,

    #[serde(default, rename = "callId")]
    pub call_id: String,

    /// Receive time in epoch ms, stamped by the runtime
    #[serde(skip)]
    pub timestamp: i64,
}

impl RpcCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            ..Default::default()
        }
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = call_id.into();
        self
    }

    /// Decode from the inbound mapping `{method, args, kwargs, callId}`
    pub fn from_value(data: Value) -> serde_json::Result<Self> {
        match data {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    /// Split into the bound argument view handed to a method
    pub fn arguments(&self) -> RpcArgs {
        RpcArgs {
            method: self.method.clone(),
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
        }
    }
}

/// Outcome carried by an RPC envelope: exactly one of value or error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcOutcome {
    Value(Value),
    Error(String),
}

/// RPC envelope: `{callId, value}` or `{callId, error}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult {
    #[serde(default, rename = "callId")]
    pub call_id: String,

    #[serde(flatten)]
    pub outcome: RpcOutcome,
}

impl RpcResult {
    pub fn success(value: Value, call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: RpcOutcome::Value(value),
        }
    }

    pub fn failure(error: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: RpcOutcome::Error(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RpcOutcome::Value(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.outcome {
            RpcOutcome::Value(v) => Some(v),
            RpcOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RpcOutcome::Value(_) => None,
            RpcOutcome::Error(e) => Some(e),
        }
    }

    /// Serialize to the reply mapping
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("callId".to_string(), Value::String(self.call_id.clone()));
        match &self.outcome {
            RpcOutcome::Value(v) => map.insert("value".to_string(), v.clone()),
            RpcOutcome::Error(e) => map.insert("error".to_string(), Value::String(e.clone())),
        };
        Value::Object(map)
    }
}

/// Positional and named arguments of one call, with typed binding helpers
#[derive(Debug, Clone, Default)]
pub struct RpcArgs {
    method: String,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl RpcArgs {
    pub fn new(method: impl Into<String>, args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            args,
            kwargs,
        }
    }

    pub fn positional(&self) -> &[Value] {
        &self.args
    }

    pub fn named(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    fn lookup(&self, index: usize, name: &str) -> std::result::Result<Option<&Value>, DispatchError> {
        match (self.args.get(index), self.kwargs.get(name)) {
            (Some(_), Some(_)) => Err(DispatchError::InvalidArguments(format!(
                "{}() got multiple values for argument '{}'",
                self.method, name
            ))),
            (Some(v), None) | (None, Some(v)) => Ok(Some(v)),
            (None, None) => Ok(None),
        }
    }

    fn decode<T: DeserializeOwned>(
        &self,
        name: &str,
        value: &Value,
    ) -> std::result::Result<T, DispatchError> {
        serde_json::from_value(value.clone()).map_err(|e| {
            DispatchError::InvalidArguments(format!(
                "{}() argument '{}' has the wrong type: {}",
                self.method, name, e
            ))
        })
    }

    /// Bind a required parameter by position or by name
    pub fn required<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> std::result::Result<T, DispatchError> {
        match self.lookup(index, name)? {
            Some(value) => self.decode(name, value),
            None => Err(DispatchError::InvalidArguments(format!(
                "{}() missing required argument: '{}'",
                self.method, name
            ))),
        }
    }

    /// Bind an optional parameter by position or by name
    pub fn optional<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> std::result::Result<Option<T>, DispatchError> {
        match self.lookup(index, name)? {
            Some(value) => self.decode(name, value).map(Some),
            None => Ok(None),
        }
    }

    /// Reject surplus positional arguments and unknown named ones
    pub fn expect_params(&self, params: &[&str]) -> std::result::Result<(), DispatchError> {
        if self.args.len() > params.len() {
            return Err(DispatchError::InvalidArguments(format!(
                "{}() takes {} positional arguments but {} were given",
                self.method,
                params.len(),
                self.args.len()
            )));
        }
        if let Some(unknown) = self.kwargs.keys().find(|k| !params.contains(&k.as_str())) {
            return Err(DispatchError::InvalidArguments(format!(
                "{}() got an unexpected keyword argument '{}'",
                self.method, unknown
            )));
        }
        Ok(())
    }
}
