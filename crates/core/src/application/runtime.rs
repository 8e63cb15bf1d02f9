// Invocation Entry Point
//
// Routes a tagged invocation mapping `{type, ...}` to an explicitly
// constructed handler and returns a plain mapping. Nothing here raises:
// every failure becomes part of the returned value.

use crate::application::constants::{KIND_FETCH, KIND_RPC, KIND_SCHEDULED};
use crate::application::handler::{DefaultHandler, FunctionHandler};
use crate::domain::{Env, ExecutionContext, Request, Response, RpcCall, RpcResult, ScheduledEvent};
use crate::error::FunctionError;
use crate::port::{SystemTimeProvider, TimeProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument};

/// Entry point wrapping one handler instance
pub struct FunctionRuntime<H: ?Sized> {
    handler: Arc<H>,
    time_provider: Arc<dyn TimeProvider>,
}

impl<H: ?Sized> Clone for FunctionRuntime<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            time_provider: Arc::clone(&self.time_provider),
        }
    }
}

impl Default for FunctionRuntime<DefaultHandler> {
    fn default() -> Self {
        Self::new(Arc::new(DefaultHandler::new()))
    }
}

fn error_response(err: &FunctionError) -> Response {
    Response::json(json!({ "error": err.to_string() })).with_status(500)
}

/// Serialize a response, downgrading encoding failures to a 500 mapping
fn serialize_response(response: Response) -> Value {
    match response.to_value() {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "Response could not be serialized");
            json!({
                "body": json!({ "error": e.to_string() }).to_string(),
                "status": 500,
                "headers": { "content-type": "application/json" },
            })
        }
    }
}

fn invocation_kind(args: &Value) -> String {
    match args.get("type") {
        None => KIND_FETCH.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl<H> FunctionRuntime<H>
where
    H: FunctionHandler + ?Sized + 'static,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            time_provider: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Handle one invocation
    ///
    /// Background tasks registered through `wait_until` are spawned onto the
    /// current tokio runtime after the output is built; their outcome is
    /// never reported back.
    pub async fn handle(&self, args: Value) -> Value {
        let (output, ctx) = self.handle_with_context(args).await;
        spawn_background(ctx);
        output
    }

    /// Handle one invocation and hand the context back to the caller, who
    /// becomes responsible for draining its background tasks
    pub async fn handle_with_context(&self, args: Value) -> (Value, ExecutionContext) {
        let kind = invocation_kind(&args);
        let span = info_span!("invocation", kind = %kind);

        async move {
            match kind.as_str() {
                KIND_FETCH => {
                    let ctx = ExecutionContext::new(Env::from_value(args.get("env")));
                    let output = self.handle_fetch(&args, &ctx).await;
                    (output, ctx)
                }
                KIND_RPC => (self.handle_rpc(&args).await, ExecutionContext::default()),
                KIND_SCHEDULED => {
                    let ctx = ExecutionContext::new(Env::from_value(args.get("env")));
                    let output = self.handle_scheduled(&args, &ctx).await;
                    (output, ctx)
                }
                other => {
                    warn!(kind = %other, "Unknown request type");
                    (
                        json!({ "error": format!("Unknown request type: {}", other) }),
                        ExecutionContext::default(),
                    )
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn handle_fetch(&self, args: &Value, ctx: &ExecutionContext) -> Value {
        let request = match Request::from_value(args.get("request").unwrap_or(&Value::Null)) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejected malformed request");
                return serialize_response(error_response(&e));
            }
        };

        debug!(method = %request.method(), url = %request.url(), "Handling fetch");
        let response = match self.handler.fetch(&request, ctx).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Fetch handler failed");
                error_response(&e)
            }
        };
        serialize_response(response)
    }

    async fn handle_rpc(&self, args: &Value) -> Value {
        let raw = args.get("call").cloned().unwrap_or(Value::Null);
        let call_id = raw
            .get("callId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut call = match RpcCall::from_value(raw) {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, "Rejected malformed RPC call");
                return RpcResult::failure(format!("Invalid RPC call: {}", e), call_id).to_value();
            }
        };
        call.timestamp = self.time_provider.now_millis();

        debug!(method = %call.method, call_id = %call.call_id, "Handling rpc");
        self.handler.invoke(call).await.to_value()
    }

    async fn handle_scheduled(&self, args: &Value, ctx: &ExecutionContext) -> Value {
        let event = ScheduledEvent::from_value(args.get("event").cloned().unwrap_or(Value::Null));

        debug!(cron = ?event.cron(), scheduled_time = ?event.scheduled_time(), "Handling scheduled");
        match self.handler.scheduled(&event, ctx).await {
            Ok(()) => json!({ "success": true }),
            Err(e) => {
                error!(error = %e, "Scheduled handler failed");
                json!({ "success": false, "error": e.to_string() })
            }
        }
    }
}

/// Fire-and-forget the context's background tasks
fn spawn_background(ctx: ExecutionContext) {
    let tasks = ctx.take_pending();
    if tasks.is_empty() {
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            debug!(count = tasks.len(), "Spawning background tasks");
            for task in tasks {
                handle.spawn(task);
            }
        }
        Err(_) => warn!(
            count = tasks.len(),
            "No tokio runtime available, dropping background tasks"
        ),
    }
}
