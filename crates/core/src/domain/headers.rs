// Headers Domain Model

use crate::error::{FunctionError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Case-insensitive header bag
///
/// Names are lower-cased on every insert and lookup. Pairs keep insertion
/// order; overwriting a name keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a header value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header value, falling back to `default` when absent
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Set a header value, replacing any previous value for the same name
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a header, returning its value if it was present
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let idx = self.entries.iter().position(|(k, _)| *k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// All `(lower-cased name, value)` pairs
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to a plain JSON object keyed by lower-cased name
    pub fn to_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    /// Build from a plain JSON object
    ///
    /// Input names may use any case. Scalar values are stringified; nested
    /// arrays/objects are rejected.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut headers = Self::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(FunctionError::MalformedRequest(format!(
                        "header '{}' must be a scalar value",
                        name
                    )))
                }
            };
            headers.set(name, value);
        }
        Ok(headers)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_get() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut headers = Headers::new();
        headers.set("X-A", "1");
        headers.set("X-B", "2");
        headers.set("x-a", "3");

        let items: Vec<_> = headers.items().collect();
        assert_eq!(items, vec![("x-a", "3"), ("x-b", "2")]);
    }

    #[test]
    fn test_default_value() {
        let headers = Headers::new();
        assert_eq!(headers.get("missing"), None);
        assert_eq!(headers.get_or("missing", "default"), "default");
    }

    #[test]
    fn test_from_map_normalizes_names() {
        let map = json!({"Content-Type": "application/json", "X-Custom-Header": "value"});
        let headers = Headers::from_map(map.as_object().unwrap()).unwrap();

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("x-custom-header"), Some("value"));
        assert!(headers.to_map().contains_key("x-custom-header"));
    }

    #[test]
    fn test_from_map_stringifies_scalars_and_rejects_nested() {
        let map = json!({"X-Count": 3, "X-Flag": true});
        let headers = Headers::from_map(map.as_object().unwrap()).unwrap();
        assert_eq!(headers.get("x-count"), Some("3"));
        assert_eq!(headers.get("x-flag"), Some("true"));

        let nested = json!({"X-Bad": {"a": 1}});
        let err = Headers::from_map(nested.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("x-bad") || err.to_string().contains("X-Bad"));
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(headers.remove("a"), Some("1".to_string()));
        assert_eq!(headers.remove("a"), None);
        assert_eq!(headers.len(), 1);
    }
}
