// Application Layer - Dispatch, handlers and the invocation entry point

pub mod constants;
pub mod dispatch;
pub mod handler;
pub mod runtime;

// Re-exports
pub use dispatch::{MethodRegistry, MethodResult, RpcTarget};
pub use handler::{rpc_over_http, DefaultHandler, FunctionHandler};
pub use runtime::FunctionRuntime;
