//! Simple SDK Example
//!
//! # Usage
//!
//! 1. Start the dev host:
//!    ```bash
//!    cargo run --package functions-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package functions-sdk --example simple
//!    ```

use functions_sdk::FunctionClient;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Functions SDK - Simple Example");
    println!("==============================\n");

    let client = FunctionClient::connect("http://127.0.0.1:8787").await?;

    println!("Methods: {:?}", client.methods().await?);

    let pong = client.call("ping", vec![]).await?;
    println!("ping -> {:?}", pong.value);

    let echo = client.call("echo", vec![json!("Hello from the SDK")]).await?;
    println!("echo -> {:?}", echo.value);

    let fetched = client
        .invoke(json!({
            "type": "fetch",
            "request": {"method": "GET", "url": "https://example.com/hello"},
        }))
        .await?;
    println!("fetch ({}) -> {}", fetched.invocation_id, fetched.output);

    Ok(())
}
