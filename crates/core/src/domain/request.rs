// Request Domain Model

use crate::domain::Headers;
use crate::error::{FunctionError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

/// Base used to resolve relative request URLs such as "/" or "/api?x=1"
const RELATIVE_URL_BASE: &str = "http://localhost";

/// HTTP request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Head => "HEAD",
            RequestMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = FunctionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            "PATCH" => Ok(RequestMethod::Patch),
            "HEAD" => Ok(RequestMethod::Head),
            "OPTIONS" => Ok(RequestMethod::Options),
            other => Err(FunctionError::InvalidMethod(other.to_string())),
        }
    }
}

/// Incoming request to the function
///
/// Built once from the host's plain mapping and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    method: RequestMethod,
    url: String,
    headers: Headers,
    body: Option<Vec<u8>>,
    cf: Map<String, Value>,
}

impl Request {
    /// Create a request with no headers and no body
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            cf: Map::new(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_cf(mut self, cf: Map<String, Value>) -> Self {
        self.cf = cf;
        self
    }

    /// Build from the inbound mapping `{method, url, headers, body, cf}`
    ///
    /// Missing fields default to GET, "/", no headers, no body and an empty
    /// `cf` map. An empty string body is treated as absent.
    pub fn from_value(data: &Value) -> Result<Self> {
        let obj = match data {
            Value::Object(obj) => obj,
            Value::Null => return Ok(Self::new(RequestMethod::Get, "/")),
            _ => {
                return Err(FunctionError::MalformedRequest(
                    "request must be an object".to_string(),
                ))
            }
        };

        let method = match obj.get("method") {
            None | Some(Value::Null) => RequestMethod::Get,
            Some(Value::String(s)) => s.parse()?,
            Some(other) => return Err(FunctionError::InvalidMethod(other.to_string())),
        };

        let url = match obj.get("url") {
            None | Some(Value::Null) => "/".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(FunctionError::MalformedRequest(
                    "url must be a string".to_string(),
                ))
            }
        };

        let headers = match obj.get("headers") {
            None | Some(Value::Null) => Headers::new(),
            Some(Value::Object(map)) => Headers::from_map(map)?,
            Some(_) => {
                return Err(FunctionError::MalformedRequest(
                    "headers must be an object".to_string(),
                ))
            }
        };

        let body = match obj.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.as_bytes().to_vec()),
            Some(_) => {
                return Err(FunctionError::MalformedRequest(
                    "body must be a string".to_string(),
                ))
            }
        };

        let cf = match obj.get("cf") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
            cf,
        })
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Side-channel metadata supplied by the host (geo, tls, ...)
    pub fn cf(&self) -> &Map<String, Value> {
        &self.cf
    }

    fn parsed_url(&self) -> Option<Url> {
        match Url::parse(&self.url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_URL_BASE)
                .and_then(|base| base.join(&self.url))
                .ok(),
            Err(_) => None,
        }
    }

    /// Path component of the URL
    pub fn path(&self) -> String {
        self.parsed_url()
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    /// Query parameters; the first occurrence wins for repeated keys and
    /// blank values are omitted
    pub fn query(&self) -> HashMap<String, String> {
        let mut query = HashMap::new();
        if let Some(url) = self.parsed_url() {
            for (k, v) in url.query_pairs() {
                if v.is_empty() {
                    continue;
                }
                query.entry(k.into_owned()).or_insert_with(|| v.into_owned());
            }
        }
        query
    }

    /// Body decoded as UTF-8 text ("" when there is no body)
    pub fn text(&self) -> Result<String> {
        match &self.body {
            None => Ok(String::new()),
            Some(bytes) => String::from_utf8(bytes.clone())
                .map_err(|e| FunctionError::MalformedBody(e.to_string())),
        }
    }

    /// Body parsed as JSON (`Value::Null` when there is no body)
    pub fn json(&self) -> Result<Value> {
        if self.body.is_none() {
            return Ok(Value::Null);
        }
        let text = self.text()?;
        serde_json::from_str(&text).map_err(|e| FunctionError::MalformedBody(e.to_string()))
    }

    /// Body parsed as JSON into a typed value
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.json()?;
        serde_json::from_value(value).map_err(|e| FunctionError::MalformedBody(e.to_string()))
    }
}
