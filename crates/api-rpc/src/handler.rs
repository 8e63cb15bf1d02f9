//! RPC Method Handlers
//!
//! Every method consumes one rate-limit token before touching the runtime.

use crate::error::{internal_error, throttled, validation_error};
use crate::types::{CallRequest, InvokeRequest, InvokeResponse, MethodsResponse};
use functions_core::application::constants::KIND_RPC;
use functions_core::domain::RpcResult;
use functions_core::port::{IdProvider, UuidProvider};
use functions_core::{FunctionHandler, FunctionRuntime, RpcTarget};
use functions_utils::{RateLimitConfig, RateLimiter};
use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// RPC Handler with injected dependencies
pub struct DevHandler<H: ?Sized> {
    runtime: FunctionRuntime<H>,
    id_provider: Arc<dyn IdProvider>,
    rate_limiter: Arc<RateLimiter>,
}

impl<H> DevHandler<H>
where
    H: FunctionHandler + ?Sized + 'static,
{
    pub fn new(runtime: FunctionRuntime<H>, rate_limit: &RateLimitConfig) -> Self {
        Self::with_parts(
            runtime,
            Arc::new(UuidProvider),
            Arc::new(RateLimiter::from_config(rate_limit)),
        )
    }

    pub fn with_parts(
        runtime: FunctionRuntime<H>,
        id_provider: Arc<dyn IdProvider>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            runtime,
            id_provider,
            rate_limiter,
        }
    }

    fn check_rate_limit(&self) -> Result<(), ErrorObjectOwned> {
        if self.rate_limiter.allow() {
            Ok(())
        } else {
            warn!("Dev server request throttled");
            Err(throttled())
        }
    }

    /// function.invoke.v1
    pub async fn invoke(&self, params: InvokeRequest) -> Result<InvokeResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        if !params.invocation.is_object() {
            return Err(validation_error("invocation must be a JSON object"));
        }

        let invocation_id = self.id_provider.generate_id();
        let output = self
            .runtime
            .handle(params.invocation)
            .instrument(info_span!("dev_invoke", invocation_id = %invocation_id))
            .await;

        debug!(invocation_id = %invocation_id, "Invocation finished");
        Ok(InvokeResponse {
            invocation_id,
            output,
        })
    }

    /// function.call.v1
    pub async fn call(&self, params: CallRequest) -> Result<RpcResult, ErrorObjectOwned> {
        self.check_rate_limit()?;

        let invocation = json!({
            "type": KIND_RPC,
            "call": {
                "method": params.method,
                "args": params.args,
                "kwargs": params.kwargs,
                "callId": params.call_id,
            },
        });

        let output = self.runtime.handle(invocation).await;
        serde_json::from_value(output)
            .map_err(|e| internal_error(format!("Runtime returned a malformed envelope: {}", e)))
    }

    /// function.methods.v1
    pub async fn methods(&self) -> Result<MethodsResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        Ok(MethodsResponse {
            methods: self.runtime.handler().list_methods(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use functions_core::port::SequentialIdProvider;
    use functions_core::DefaultHandler;

    fn handler(burst: f64) -> DevHandler<DefaultHandler> {
        DevHandler::with_parts(
            FunctionRuntime::default(),
            Arc::new(SequentialIdProvider::new("inv")),
            Arc::new(RateLimiter::new(0.0, burst)),
        )
    }

    #[tokio::test]
    async fn test_invoke_assigns_ids() {
        let h = handler(10.0);
        let req = InvokeRequest {
            invocation: json!({"type": "rpc", "call": {"method": "ping"}}),
        };

        let first = h.invoke(req.clone()).await.unwrap();
        let second = h.invoke(req).await.unwrap();

        assert_eq!(first.invocation_id, "inv-1");
        assert_eq!(second.invocation_id, "inv-2");
        assert_eq!(first.output, json!({"callId": "", "value": "pong"}));
    }

    #[tokio::test]
    async fn test_invoke_rejects_non_object() {
        let err = handler(10.0)
            .invoke(InvokeRequest { invocation: json!("fetch") })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn test_call_returns_envelope() {
        let result = handler(10.0)
            .call(CallRequest {
                method: "echo".to_string(),
                args: vec![json!("hi")],
                kwargs: Default::default(),
                call_id: "c-9".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.call_id, "c-9");
        assert_eq!(result.value(), Some(&json!("hi")));
    }

    #[tokio::test]
    async fn test_call_unknown_method_is_envelope_not_rpc_error() {
        let result = handler(10.0)
            .call(CallRequest {
                method: "missing".to_string(),
                args: vec![],
                kwargs: Default::default(),
                call_id: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(result.error(), Some("Method 'missing' not found"));
    }

    #[tokio::test]
    async fn test_methods_and_throttle() {
        let h = handler(1.0);

        let listed = h.methods().await.unwrap();
        assert_eq!(listed.methods, vec!["echo", "info", "ping"]);

        let err = h.methods().await.unwrap_err();
        assert_eq!(err.code(), code::THROTTLED);
    }
}
