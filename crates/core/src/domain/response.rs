// Response Domain Model

use crate::domain::Headers;
use crate::error::{FunctionError, Result};
use serde::Serialize;
use serde_json::{json, Value};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Response body: text or raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Bytes(Vec<u8>),
}

/// Outgoing response from the function
#[derive(Debug, Clone)]
pub struct Response {
    body: Option<ResponseBody>,
    status: u16,
    headers: Headers,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            body: None,
            status: 200,
            headers: Headers::new(),
        }
    }
}

impl Response {
    pub fn new(body: Option<ResponseBody>, status: u16, headers: Headers) -> Self {
        Self {
            body,
            status,
            headers,
        }
    }

    fn with_content_type(body: String, content_type: &str) -> Self {
        let mut headers = Headers::new();
        headers.set("content-type", content_type);
        Self {
            body: Some(ResponseBody::Text(body)),
            status: 200,
            headers,
        }
    }

    /// JSON response from an already-built value
    pub fn json(data: Value) -> Self {
        Self::with_content_type(data.to_string(), CONTENT_TYPE_JSON)
    }

    /// JSON response from any serializable value
    pub fn json_of<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        let body = serde_json::to_string(data)?;
        Ok(Self::with_content_type(body, CONTENT_TYPE_JSON))
    }

    /// Plain text response
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content_type(text.into(), CONTENT_TYPE_TEXT)
    }

    /// HTML response
    pub fn html(html: impl Into<String>) -> Self {
        Self::with_content_type(html.into(), CONTENT_TYPE_HTML)
    }

    /// Redirect response (302 unless overridden with `with_status`)
    pub fn redirect(url: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.set("location", url);
        Self {
            body: None,
            status: 302,
            headers,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(ResponseBody::Bytes(bytes.into()));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&ResponseBody> {
        self.body.as_ref()
    }

    /// Body as text, if present and valid UTF-8
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Some(ResponseBody::Text(s)) => Some(s),
            Some(ResponseBody::Bytes(b)) => std::str::from_utf8(b).ok(),
            None => None,
        }
    }

    /// Serialize to the transport mapping `{body, status, headers}`
    ///
    /// Byte bodies are decoded as UTF-8; anything else is a `BodyEncoding`
    /// error.
    pub fn to_value(&self) -> Result<Value> {
        let body = match &self.body {
            None => Value::Null,
            Some(ResponseBody::Text(s)) => Value::String(s.clone()),
            Some(ResponseBody::Bytes(b)) => Value::String(
                String::from_utf8(b.clone())
                    .map_err(|e| FunctionError::BodyEncoding(e.to_string()))?,
            ),
        };

        Ok(json!({
            "body": body,
            "status": self.status,
            "headers": self.headers.to_map(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response() {
        let response = Response::json(json!({"message": "Hello"}));

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers().get("content-type"), Some(CONTENT_TYPE_JSON));
        let body: Value = serde_json::from_str(response.body_text().unwrap()).unwrap();
        assert_eq!(body, json!({"message": "Hello"}));
    }

    #[test]
    fn test_json_response_with_status() {
        let response = Response::json(json!({"error": "Not found"})).with_status(404);
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_json_of_struct() {
        #[derive(Serialize)]
        struct Greeting<'a> {
            hello: &'a str,
        }

        let response = Response::json_of(&Greeting { hello: "world" }).unwrap();
        assert_eq!(response.body_text(), Some(r#"{"hello":"world"}"#));
    }

    #[test]
    fn test_text_and_html_responses() {
        let text = Response::text("Hello, World!");
        assert_eq!(text.headers().get("content-type"), Some(CONTENT_TYPE_TEXT));
        assert_eq!(text.body_text(), Some("Hello, World!"));

        let html = Response::html("<h1>Hello</h1>");
        assert_eq!(html.headers().get("content-type"), Some(CONTENT_TYPE_HTML));
        assert_eq!(html.status(), 200);
    }

    #[test]
    fn test_redirect_response() {
        let response = Response::redirect("https://example.com/new");
        assert_eq!(response.status(), 302);
        assert_eq!(response.headers().get("location"), Some("https://example.com/new"));
        assert!(response.body().is_none());

        let moved = Response::redirect("https://example.com/new").with_status(301);
        assert_eq!(moved.status(), 301);
    }

    #[test]
    fn test_to_value() {
        let result = Response::json(json!({"test": true})).to_value().unwrap();

        assert_eq!(result["status"], 200);
        assert_eq!(result["body"], r#"{"test":true}"#);
        assert_eq!(result["headers"]["content-type"], "application/json");
    }

    #[test]
    fn test_to_value_bytes_body() {
        let ok = Response::default().with_bytes(b"raw".to_vec());
        assert_eq!(ok.to_value().unwrap()["body"], "raw");

        let bad = Response::default().with_bytes(vec![0xc3, 0x28]);
        assert!(matches!(
            bad.to_value().unwrap_err(),
            FunctionError::BodyEncoding(_)
        ));
    }

    #[test]
    fn test_redirect_to_value_has_null_body() {
        let value = Response::redirect("/login").to_value().unwrap();
        assert!(value["body"].is_null());
        assert_eq!(value["status"], 302);
    }
}
