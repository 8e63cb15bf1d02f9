// Functions Core - Invocation Model, Dispatch & Ports
// NO transport or host-runtime dependencies: the host supplies bindings and
// calls FunctionRuntime::handle with a plain JSON mapping.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{DefaultHandler, FunctionHandler, FunctionRuntime, MethodRegistry, RpcTarget};
pub use domain::{
    Env, ExecutionContext, Headers, Request, RequestMethod, Response, RpcCall, RpcResult,
    ScheduledEvent,
};
pub use error::{DispatchError, FunctionError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime tag reported by `info()`
pub const RUNTIME: &str = "rust";
