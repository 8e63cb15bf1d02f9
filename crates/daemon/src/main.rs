//! Functions Dev Host - Main Entry Point
//! Serves the default handler over the local JSON-RPC dev server

use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use functions_api_rpc::{DevServer, DevServerConfig};
use functions_core::{DefaultHandler, FunctionRuntime, VERSION};
use functions_utils::json_dumps_pretty;

const SMOKE_ENV: &str = "FUNCTIONS_SMOKE";

fn init_logging() -> Result<()> {
    let log_format = std::env::var("FUNCTIONS_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("functions=info"))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

/// Sample invocations run by the self-test mode
fn smoke_invocations() -> Vec<(&'static str, Value)> {
    vec![
        (
            "Fetch result",
            json!({
                "type": "fetch",
                "request": {
                    "method": "GET",
                    "url": "https://example.com/test",
                    "headers": {},
                },
            }),
        ),
        (
            "RPC result",
            json!({
                "type": "rpc",
                "call": {"method": "ping", "args": []},
            }),
        ),
    ]
}

async fn run_smoke(runtime: &FunctionRuntime<DefaultHandler>) -> Result<()> {
    for (label, invocation) in smoke_invocations() {
        let output = runtime.handle(invocation).await;
        println!("{}: {}", label, json_dumps_pretty(&output)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;
    info!("Functions dev host v{} starting...", VERSION);

    // 2. Setup dependencies (DI wiring)
    let runtime = FunctionRuntime::new(Arc::new(DefaultHandler::new()));

    if std::env::var(SMOKE_ENV).map(|v| v == "1").unwrap_or(false) {
        info!("Running smoke invocations");
        return run_smoke(&runtime).await;
    }

    // 3. Start JSON-RPC dev server
    let config = DevServerConfig::from_env();
    let (addr, handle) = DevServer::new(config, runtime)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Dev server start failed: {}", e))?;

    info!(addr = %addr, "Dev server ready");
    info!("Press Ctrl+C to shutdown");

    // 4. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    handle
        .stop()
        .map_err(|e| anyhow::anyhow!("Dev server stop failed: {}", e))?;
    handle.stopped().await;

    info!("Shutdown complete.");
    Ok(())
}
