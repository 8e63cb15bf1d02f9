// Input validation helpers
//
// Each rule returns Ok(()) or a ValidationError naming the field.

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// JSON value kinds accepted by `validate_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    /// Any number, integer or float
    Number,
    Integer,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    /// Most specific kind of a value (integers report `Integer`)
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            JsonType::Number => value.is_number(),
            other => *other == JsonType::of(value),
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject null and blank strings; `0` and `false` pass
pub fn validate_required(value: &Value, field: &str) -> Result<(), ValidationError> {
    match value {
        Value::Null => Err(ValidationError::new(field, "is required")),
        Value::String(s) if s.trim().is_empty() => {
            Err(ValidationError::new(field, "cannot be empty").with_value(value.clone()))
        }
        _ => Ok(()),
    }
}

pub fn validate_type(value: &Value, field: &str, expected: JsonType) -> Result<(), ValidationError> {
    if expected.matches(value) {
        return Ok(());
    }
    Err(ValidationError::new(
        field,
        format!("expected {}, got {}", expected, JsonType::of(value)),
    )
    .with_value(value.clone()))
}

/// Check optional inclusive bounds
pub fn validate_range<T>(value: T, field: &str, min: Option<T>, max: Option<T>) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Display + Serialize,
{
    let offending = || serde_json::to_value(&value).unwrap_or(Value::Null);

    if let Some(min) = min {
        if value < min {
            return Err(ValidationError::new(field, format!("must be at least {}", min)).with_value(offending()));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::new(field, format!("must be at most {}", max)).with_value(offending()));
        }
    }
    Ok(())
}

/// Check the size of a string (in chars), array or object
pub fn validate_length(
    value: &Value,
    field: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    let length = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(ValidationError::new(
                field,
                format!("expected string, array or object, got {}", JsonType::of(other)),
            )
            .with_value(other.clone()))
        }
    };

    if let Some(min) = min {
        if length < min {
            return Err(ValidationError::new(field, format!("must have at least {} items", min))
                .with_value(value.clone()));
        }
    }
    if let Some(max) = max {
        if length > max {
            return Err(ValidationError::new(field, format!("must have at most {} items", max))
                .with_value(value.clone()));
        }
    }
    Ok(())
}

/// Require `pattern` to match at the start of `value`
pub fn validate_pattern(value: &str, field: &str, pattern: &str) -> Result<(), ValidationError> {
    let anchored = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
        ValidationError::new(field, format!("invalid pattern {}: {}", pattern, e))
    })?;

    if anchored.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, format!("does not match pattern {}", pattern))
            .with_value(Value::String(value.to_string())))
    }
}

pub fn validate_email(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::new(field, "is not a valid email address")
            .with_value(Value::String(value.to_string())));
    }
    Ok(())
}
