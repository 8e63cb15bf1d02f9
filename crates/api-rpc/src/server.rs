//! JSON-RPC Server
//!
//! Serves the dev-server methods over HTTP on localhost.

use crate::error::ServerError;
use crate::handler::DevHandler;
use crate::types::{CallRequest, InvokeRequest};
use functions_core::{FunctionHandler, FunctionRuntime};
use functions_utils::RateLimitConfig;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;

pub const HOST_ENV: &str = "FUNCTIONS_DEV_HOST";
pub const PORT_ENV: &str = "FUNCTIONS_DEV_PORT";

/// Dev Server Configuration
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl DevServerConfig {
    /// Defaults overridden by `FUNCTIONS_DEV_HOST`, `FUNCTIONS_DEV_PORT` and
    /// the rate limit variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var(HOST_ENV).unwrap_or(defaults.host);
        let port = match std::env::var(PORT_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring invalid {}", PORT_ENV);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        Self {
            host,
            port,
            rate_limit: RateLimitConfig::from_env(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dev Server
pub struct DevServer<H: ?Sized> {
    config: DevServerConfig,
    handler: Arc<DevHandler<H>>,
}

impl<H> DevServer<H>
where
    H: FunctionHandler + ?Sized + 'static,
{
    pub fn new(config: DevServerConfig, runtime: FunctionRuntime<H>) -> Self {
        let handler = DevHandler::new(runtime, &config.rate_limit);
        Self::with_handler(config, handler)
    }

    pub fn with_handler(config: DevServerConfig, handler: DevHandler<H>) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    fn build_module(&self) -> Result<RpcModule<()>, ServerError> {
        let mut module = RpcModule::new(());
        let register_failed = |method: &str, e: &dyn std::fmt::Display| ServerError::Register {
            method: method.to_string(),
            reason: e.to_string(),
        };

        let handler = self.handler.clone();
        module
            .register_async_method("function.invoke.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: InvokeRequest = params.one()?;
                    handler.invoke(req).await
                }
            })
            .map_err(|e| register_failed("function.invoke.v1", &e))?;

        let handler = self.handler.clone();
        module
            .register_async_method("function.call.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CallRequest = params.one()?;
                    handler.call(req).await
                }
            })
            .map_err(|e| register_failed("function.call.v1", &e))?;

        let handler = self.handler.clone();
        module
            .register_async_method("function.methods.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.methods().await }
            })
            .map_err(|e| register_failed("function.methods.v1", &e))?;

        Ok(module)
    }

    /// Start the server
    ///
    /// Returns the bound address (useful with port 0) and the handle that
    /// keeps the server alive.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), ServerError> {
        let addr = self.config.address();

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting dev server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let module = self.build_module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "Dev server started");
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DevServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8787");
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_module_registers_all_methods() {
        let server = DevServer::new(DevServerConfig::default(), FunctionRuntime::default());
        let module = server.build_module().unwrap();

        let mut names: Vec<&str> = module.method_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec!["function.call.v1", "function.invoke.v1", "function.methods.v1"]
        );
    }
}
