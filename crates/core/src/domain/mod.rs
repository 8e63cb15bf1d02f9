// Domain Layer - Invocation value objects

pub mod context;
pub mod env;
pub mod event;
pub mod headers;
pub mod request;
pub mod response;
pub mod rpc;

// Re-exports
pub use context::ExecutionContext;
pub use env::Env;
pub use event::ScheduledEvent;
pub use headers::Headers;
pub use request::{Request, RequestMethod};
pub use response::{Response, ResponseBody};
pub use rpc::{RpcArgs, RpcCall, RpcOutcome, RpcResult};
