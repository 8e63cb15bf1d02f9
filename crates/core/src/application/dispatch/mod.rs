// RPC dispatch: explicit method registry + panic isolation

pub mod panic_guard;
pub mod registry;

pub use panic_guard::{execute_guarded, execute_guarded_async, PanicGuardResult};
pub use registry::{Invocable, Member, MethodRegistry, MethodResult, RpcTarget};
