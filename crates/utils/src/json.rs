// JSON helpers and serde adapters for datetimes and bytes

use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn json_dumps<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

pub fn json_dumps_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn json_loads<T: DeserializeOwned>(input: impl AsRef<[u8]>) -> serde_json::Result<T> {
    serde_json::from_slice(input.as_ref())
}

/// Decode, falling back to `default` on any error
pub fn safe_json_loads<T: DeserializeOwned>(input: impl AsRef<[u8]>, default: T) -> T {
    json_loads(input).unwrap_or(default)
}

/// `#[serde(with = "iso_datetime")]` for `DateTime<Utc>` fields
pub mod iso_datetime {
    use crate::datetime::{format_iso_datetime, parse_iso_datetime};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso_datetime(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_datetime(&raw).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "base64_bytes")]` for `Vec<u8>` fields
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw.as_bytes()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Upload {
        #[serde(with = "iso_datetime")]
        created: DateTime<Utc>,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    }

    #[test]
    fn test_json_dumps_extended_types() {
        let upload = Upload {
            created: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            data: b"hello".to_vec(),
        };

        let encoded = json_dumps(&upload).unwrap();
        assert_eq!(encoded, r#"{"created":"2024-01-15T10:30:00Z","data":"aGVsbG8="}"#);

        let decoded: Upload = json_loads(&encoded).unwrap();
        assert_eq!(decoded, upload);
    }

    #[test]
    fn test_json_dumps_pretty() {
        let pretty = json_dumps_pretty(&json!({"a": 1})).unwrap();
        assert_eq!(pretty, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_json_loads() {
        let value: Value = json_loads(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value, json!({"key": "value"}));
        assert!(json_loads::<Value>("not json").is_err());
    }

    #[test]
    fn test_safe_json_loads() {
        let value: Value = safe_json_loads(r#"{"key": "value"}"#, Value::Null);
        assert_eq!(value["key"], "value");

        assert_eq!(safe_json_loads("not json", Value::Null), Value::Null);
        assert_eq!(safe_json_loads("not json", json!({})), json!({}));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let err = json_loads::<Upload>(r#"{"created":"2024-01-15T10:30:00Z","data":"!!"}"#);
        assert!(err.is_err());
    }
}
