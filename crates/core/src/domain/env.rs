// Environment Bindings

use serde_json::{Map, Value};

/// Bindings supplied by the host runtime (KV namespaces, buckets, secrets, ...)
///
/// Contents are opaque to the SDK; they are only looked up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    bindings: Map<String, Value>,
}

impl Env {
    pub fn new(bindings: Map<String, Value>) -> Self {
        Self { bindings }
    }

    /// Build from the `env` field of an invocation; non-objects yield no bindings
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::new(map.clone()),
            _ => Self::default(),
        }
    }

    /// Get a binding by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
