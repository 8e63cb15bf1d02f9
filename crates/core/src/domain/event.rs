// Scheduled Event Model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload of a cron trigger
///
/// The host's mapping is kept as-is; typed accessors read the well-known
/// fields and return `None` when a field is absent or has another shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduledEvent {
    raw: Value,
}

impl Default for ScheduledEvent {
    fn default() -> Self {
        Self {
            raw: Value::Object(Map::new()),
        }
    }
}

impl ScheduledEvent {
    /// Wrap the host payload; a missing (null) event becomes an empty mapping
    pub fn from_value(data: Value) -> Self {
        match data {
            Value::Null => Self::default(),
            raw => Self { raw },
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Field of an object payload
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn cron(&self) -> Option<&str> {
        self.get("cron").and_then(Value::as_str)
    }

    /// Scheduled fire time in epoch units as given by the host
    ///
    /// Float timestamps are truncated; strings and other shapes yield `None`.
    pub fn scheduled_time(&self) -> Option<i64> {
        let value = self.get("scheduledTime")?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|t| t.is_finite() && *t >= i64::MIN as f64 && *t <= i64::MAX as f64)
                .map(|t| t as i64)
        })
    }
}
