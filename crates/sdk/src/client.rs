//! Dev Server Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{CallRequest, CallResult, InvokeRequest, InvokeResponse, MethodsResponse};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::{Map, Value};
use std::time::Duration;

/// Client for the functions dev server
///
/// # Example
///
/// ```no_run
/// use functions_sdk::FunctionClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FunctionClient::connect("http://127.0.0.1:8787").await?;
/// println!("{:?}", client.methods().await?);
/// # Ok(())
/// # }
/// ```
pub struct FunctionClient {
    client: HttpClient,
}

impl FunctionClient {
    /// Connect to the dev server
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:8787`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Run a raw invocation mapping (`{type, request|call|event, env}`)
    /// and return the runtime's output
    pub async fn invoke(&self, invocation: Value) -> Result<InvokeResponse> {
        let params = rpc_params![InvokeRequest { invocation }];
        let response: InvokeResponse = self.client.request("function.invoke.v1", params).await?;

        Ok(response)
    }

    /// Call an RPC method with positional arguments
    ///
    /// Method failures come back as an envelope with `error` set, not as an
    /// `Err`.
    pub async fn call(&self, method: impl Into<String>, args: Vec<Value>) -> Result<CallResult> {
        self.call_with(CallRequest {
            method: method.into(),
            args,
            ..Default::default()
        })
        .await
    }

    /// Call an RPC method with positional and named arguments
    pub async fn call_with_kwargs(
        &self,
        method: impl Into<String>,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<CallResult> {
        self.call_with(CallRequest {
            method: method.into(),
            args,
            kwargs,
            ..Default::default()
        })
        .await
    }

    pub async fn call_with(&self, request: CallRequest) -> Result<CallResult> {
        let params = rpc_params![request];
        let response: CallResult = self.client.request("function.call.v1", params).await?;

        Ok(response)
    }

    /// List the callable methods of the served function
    pub async fn methods(&self) -> Result<Vec<String>> {
        let response: MethodsResponse = self.client.request("function.methods.v1", rpc_params![]).await?;

        Ok(response.methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = FunctionClient::connect("not a url").await;
        assert!(matches!(result, Err(SdkError::Connection(_))));
    }

    #[test]
    fn test_call_result_decoding() {
        let ok: CallResult = serde_json::from_value(json!({"callId": "1", "value": 3})).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.value, Some(json!(3)));

        let failed: CallResult =
            serde_json::from_value(json!({"callId": "2", "error": "Method 'x' not found"})).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("Method 'x' not found"));
    }
}
