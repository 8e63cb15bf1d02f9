//! Dev Server Round-Trip Tests
//!
//! Real JSON-RPC over HTTP: DevServer on an ephemeral port, FunctionClient
//! on the other end.

use functions_api_rpc::{DevHandler, DevServer, DevServerConfig, ServerHandle};
use functions_core::port::UuidProvider;
use functions_core::{DefaultHandler, FunctionRuntime};
use functions_sdk::{FunctionClient, SdkError};
use functions_utils::{RateLimitConfig, RateLimiter};
use serde_json::{json, Map};
use std::sync::Arc;

fn local_config() -> DevServerConfig {
    DevServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        rate_limit: RateLimitConfig::default(),
    }
}

async fn connect(server: DevServer<DefaultHandler>) -> (FunctionClient, ServerHandle) {
    let (addr, handle) = server.start().await.unwrap();
    let client = FunctionClient::connect(format!("http://{}", addr)).await.unwrap();
    (client, handle)
}

#[tokio::test]
async fn test_methods_and_calls() {
    let server = DevServer::new(local_config(), FunctionRuntime::default());
    let (client, handle) = connect(server).await;

    assert_eq!(client.methods().await.unwrap(), vec!["echo", "info", "ping"]);

    let pong = client.call("ping", vec![]).await.unwrap();
    assert!(pong.is_success());
    assert_eq!(pong.value, Some(json!("pong")));

    let mut kwargs = Map::new();
    kwargs.insert("message".to_string(), json!("over the wire"));
    let echo = client.call_with_kwargs("echo", vec![], kwargs).await.unwrap();
    assert_eq!(echo.value, Some(json!("over the wire")));

    handle.stop().unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_method_failures_stay_in_envelope() {
    let server = DevServer::new(local_config(), FunctionRuntime::default());
    let (client, handle) = connect(server).await;

    let missing = client.call("missing", vec![]).await.unwrap();
    assert!(!missing.is_success());
    assert_eq!(missing.error.as_deref(), Some("Method 'missing' not found"));
    assert_eq!(missing.value, None);

    let private = client.call("_registry", vec![]).await.unwrap();
    assert_eq!(private.error.as_deref(), Some("Method '_registry' not found"));

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_invoke_fetch_and_rpc() {
    let server = DevServer::new(local_config(), FunctionRuntime::default());
    let (client, handle) = connect(server).await;

    let fetched = client
        .invoke(json!({"type": "fetch", "request": {"method": "GET", "url": "https://fn.local/"}}))
        .await
        .unwrap();
    assert!(!fetched.invocation_id.is_empty());
    assert_eq!(fetched.output["status"], 200);
    assert_eq!(fetched.output["headers"]["content-type"], "application/json");

    let called = client
        .invoke(json!({"type": "rpc", "call": {"method": "echo", "args": ["x"], "callId": "42"}}))
        .await
        .unwrap();
    assert_ne!(called.invocation_id, fetched.invocation_id);
    assert_eq!(called.output, json!({"callId": "42", "value": "x"}));

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_invoke_rejects_non_object() {
    let server = DevServer::new(local_config(), FunctionRuntime::default());
    let (client, handle) = connect(server).await;

    let err = client.invoke(json!("fetch")).await.unwrap_err();
    assert!(matches!(err, SdkError::Rpc { code: 4000, .. }));

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_throttled_after_burst() {
    let handler = DevHandler::with_parts(
        FunctionRuntime::default(),
        Arc::new(UuidProvider),
        Arc::new(RateLimiter::new(0.0, 2.0)),
    );
    let server = DevServer::with_handler(local_config(), handler);
    let (client, handle) = connect(server).await;

    assert!(client.call("ping", vec![]).await.is_ok());
    assert!(client.methods().await.is_ok());

    let err = client.call("ping", vec![]).await.unwrap_err();
    assert!(err.is_throttled());
    assert!(err.to_string().contains("Rate limit exceeded"));

    handle.stop().unwrap();
}
