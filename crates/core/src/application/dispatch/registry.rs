// RPC Method Registry
//
// Explicit name -> invocable map built when a service is constructed.
// A leading underscore is the only visibility rule: such names are never
// listed and never dispatched.

use super::panic_guard::{execute_guarded, execute_guarded_async, PanicGuardResult};
use crate::domain::{RpcArgs, RpcCall, RpcResult};
use crate::error::DispatchError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one method body
pub type MethodResult = std::result::Result<Value, DispatchError>;

type SyncMethod = dyn Fn(RpcArgs) -> MethodResult + Send + Sync;
type AsyncMethod = dyn Fn(RpcArgs) -> BoxFuture<'static, MethodResult> + Send + Sync;

/// A callable member; sync and async bodies are declared, not detected
#[derive(Clone)]
pub enum Invocable {
    Sync(Arc<SyncMethod>),
    Async(Arc<AsyncMethod>),
}

impl Invocable {
    async fn call(&self, args: RpcArgs) -> MethodResult {
        match self {
            Invocable::Sync(f) => match execute_guarded(AssertUnwindSafe(|| (**f)(args))) {
                PanicGuardResult::Success(result) => result,
                PanicGuardResult::Panicked(msg) => Err(DispatchError::Panicked(msg)),
            },
            Invocable::Async(f) => {
                let future = match execute_guarded(AssertUnwindSafe(|| (**f)(args))) {
                    PanicGuardResult::Success(future) => future,
                    PanicGuardResult::Panicked(msg) => return Err(DispatchError::Panicked(msg)),
                };
                match execute_guarded_async(future).await {
                    PanicGuardResult::Success(result) => result,
                    PanicGuardResult::Panicked(msg) => Err(DispatchError::Panicked(msg)),
                }
            }
        }
    }
}

/// Registered member of a service
#[derive(Clone)]
pub enum Member {
    Method(Invocable),
    /// Visible attribute that cannot be invoked
    Property(Value),
}

/// Name -> member map for one RPC target
#[derive(Clone, Default)]
pub struct MethodRegistry {
    members: BTreeMap<String, Member>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, member: Member) {
        if self.members.insert(name.clone(), member).is_some() {
            warn!(method = %name, "RPC member registered twice, keeping the latest");
        }
    }

    /// Register a synchronous method
    pub fn register_method<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(RpcArgs) -> MethodResult + Send + Sync + 'static,
    {
        self.insert(name.into(), Member::Method(Invocable::Sync(Arc::new(f))));
        self
    }

    /// Register an asynchronous method
    pub fn register_async_method<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(RpcArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MethodResult> + Send + 'static,
    {
        let boxed = move |args: RpcArgs| -> BoxFuture<'static, MethodResult> { Box::pin(f(args)) };
        self.insert(name.into(), Member::Method(Invocable::Async(Arc::new(boxed))));
        self
    }

    /// Register a non-callable attribute
    pub fn register_property(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.insert(name.into(), Member::Property(value));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Public callable names, sorted
    pub fn list_methods(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|(name, member)| !name.starts_with('_') && matches!(member, Member::Method(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn resolve(&self, name: &str) -> std::result::Result<&Invocable, DispatchError> {
        if name.starts_with('_') {
            return Err(DispatchError::MethodNotFound(name.to_string()));
        }
        match self.members.get(name) {
            None => Err(DispatchError::MethodNotFound(name.to_string())),
            Some(Member::Property(_)) => Err(DispatchError::NotCallable(name.to_string())),
            Some(Member::Method(invocable)) => Ok(invocable),
        }
    }

    /// Dispatch a call; every failure is folded into the envelope
    pub async fn invoke(&self, call: &RpcCall) -> RpcResult {
        let outcome = match self.resolve(&call.method) {
            Ok(invocable) => invocable.call(call.arguments()).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                debug!(method = %call.method, call_id = %call.call_id, "RPC call succeeded");
                RpcResult::success(value, call.call_id.clone())
            }
            Err(e) => {
                debug!(method = %call.method, call_id = %call.call_id, error = %e, "RPC call failed");
                RpcResult::failure(e.to_string(), call.call_id.clone())
            }
        }
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Capability set of any RPC-enabled service: method listing + invocation
#[async_trait]
pub trait RpcTarget: Send + Sync {
    fn registry(&self) -> &MethodRegistry;

    fn list_methods(&self) -> Vec<String> {
        self.registry().list_methods()
    }

    async fn invoke(&self, call: RpcCall) -> RpcResult {
        self.registry().invoke(&call).await
    }
}

impl RpcTarget for MethodRegistry {
    fn registry(&self) -> &MethodRegistry {
        self
    }
}
