// Function Handlers
//
// A handler answers `fetch` and `scheduled` invocations and is itself an
// RPC target for `rpc` invocations.

use crate::application::constants::{
    DEFAULT_GREETING, RPC_CONTENT_TYPE, RPC_MARKER_HEADER, RPC_MARKER_VALUE,
};
use crate::application::dispatch::{MethodRegistry, RpcTarget};
use crate::domain::{ExecutionContext, Request, RequestMethod, Response, RpcCall, RpcResult, ScheduledEvent};
use crate::error::{FunctionError, Result};
use crate::port::{SystemTimeProvider, TimeProvider};
use crate::{RUNTIME, VERSION};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// User-implemented function logic
#[async_trait]
pub trait FunctionHandler: RpcTarget {
    /// Handle an HTTP request
    async fn fetch(&self, request: &Request, ctx: &ExecutionContext) -> Result<Response>;

    /// Handle a cron trigger (no-op by default)
    async fn scheduled(&self, _event: &ScheduledEvent, _ctx: &ExecutionContext) -> Result<()> {
        Ok(())
    }
}

fn is_rpc_request(request: &Request) -> bool {
    let headers = request.headers();
    request.method() == RequestMethod::Post
        && headers.get_or("content-type", "").starts_with(RPC_CONTENT_TYPE)
        && headers.get(RPC_MARKER_HEADER) == Some(RPC_MARKER_VALUE)
}

fn parse_rpc_body(request: &Request) -> Result<RpcCall> {
    let data = request.json()?;
    if !data.is_object() {
        return Err(FunctionError::MalformedBody(
            "RPC body must be a JSON object".to_string(),
        ));
    }
    Ok(RpcCall::from_value(data)?)
}

/// Dispatch an RPC-over-HTTP request inline
///
/// Applies to POST requests with a JSON content type and the
/// `x-capnweb-rpc: 1` marker. Returns `None` for every other request so the
/// caller can fall through to its own routing. A body that does not decode
/// into a call yields a failure envelope with status 500.
pub async fn rpc_over_http<T>(target: &T, request: &Request, now_millis: i64) -> Option<Response>
where
    T: RpcTarget + ?Sized,
{
    if !is_rpc_request(request) {
        return None;
    }

    let response = match parse_rpc_body(request) {
        Ok(mut call) => {
            call.timestamp = now_millis;
            debug!(method = %call.method, call_id = %call.call_id, "Dispatching RPC over HTTP");
            Response::json(target.invoke(call).await.to_value())
        }
        Err(e) => {
            warn!(error = %e, "Rejected RPC-over-HTTP body");
            Response::json(RpcResult::failure(e.to_string(), "").to_value()).with_status(500)
        }
    };
    Some(response)
}

/// Default handler: greeting on fetch, inline RPC, and the example methods
/// `ping`, `echo` and `info`
pub struct DefaultHandler {
    registry: MethodRegistry,
    time_provider: Arc<dyn TimeProvider>,
}

impl DefaultHandler {
    pub fn new() -> Self {
        Self::with_time_provider(Arc::new(SystemTimeProvider))
    }

    pub fn with_time_provider(time_provider: Arc<dyn TimeProvider>) -> Self {
        let mut registry = MethodRegistry::new();
        registry
            .register_method("ping", |args| {
                args.expect_params(&[])?;
                Ok(json!("pong"))
            })
            .register_method("echo", |args| {
                args.expect_params(&["message"])?;
                args.required::<Value>(0, "message")
            })
            .register_property("version", json!(VERSION));

        // `info` reports the surface as it stands once registration is done
        let mut methods = registry.list_methods();
        methods.push("info".to_string());
        methods.sort();
        registry.register_method("info", move |args| {
            args.expect_params(&[])?;
            Ok(json!({
                "methods": methods,
                "version": VERSION,
                "runtime": RUNTIME,
            }))
        });

        Self {
            registry,
            time_provider,
        }
    }

    fn timestamp(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.time_provider.now_millis())
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for DefaultHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcTarget for DefaultHandler {
    fn registry(&self) -> &MethodRegistry {
        &self.registry
    }
}

#[async_trait]
impl FunctionHandler for DefaultHandler {
    async fn fetch(&self, request: &Request, _ctx: &ExecutionContext) -> Result<Response> {
        if let Some(response) =
            rpc_over_http(self, request, self.time_provider.now_millis()).await
        {
            return Ok(response);
        }

        Ok(Response::json(json!({
            "message": DEFAULT_GREETING,
            "path": request.path(),
            "method": request.method().as_str(),
            "timestamp": self.timestamp(),
        })))
    }
}
