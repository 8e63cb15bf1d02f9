// Execution Context

use crate::domain::Env;
use futures::future::BoxFuture;
use std::future::Future;
use parking_lot::Mutex;
use tracing::debug;

/// Per-invocation context handed to `fetch` and `scheduled`
///
/// Tasks registered with `wait_until` are not awaited on the response path;
/// the runtime (or host) drains them after the response is produced.
#[derive(Default)]
pub struct ExecutionContext {
    env: Env,
    pending: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl ExecutionContext {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Register a background task that may outlive the response
    pub fn wait_until<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock();
        pending.push(Box::pin(task));
        debug!(pending = pending.len(), "Background task registered");
    }

    /// Host-runtime compatibility hook; has no effect here
    pub fn pass_through_on_exception(&self) {
        debug!("pass_through_on_exception requested (no-op)");
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.lock().len()
    }

    /// Take every registered task, leaving the queue empty
    pub fn take_pending(&self) -> Vec<BoxFuture<'static, ()>> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("env", &self.env)
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}
