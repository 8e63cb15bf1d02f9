// Panic isolation for method dispatch
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed
    Success(T),
    /// Execution panicked
    Panicked(String),
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Execute a closure with panic isolation
///
/// A panicking RPC method must not take the whole function down; the panic
/// is caught and returned as `PanicGuardResult::Panicked`.
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => {
            let panic_msg = panic_message(payload);
            error!(panic_msg = %panic_msg, "RPC method panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

/// Drive a future to completion with panic isolation
pub async fn execute_guarded_async<F, T>(future: F) -> PanicGuardResult<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => {
            let panic_msg = panic_message(payload);
            error!(panic_msg = %panic_msg, "Async RPC method panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_success() {
        match execute_guarded(|| 1 + 1) {
            PanicGuardResult::Success(v) => assert_eq!(v, 2),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_guarded_panic_str_and_string() {
        let result = execute_guarded(|| -> i32 { panic!("static message") });
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "static message"));

        let code = 7;
        let result = execute_guarded(move || -> i32 { panic!("formatted {}", code) });
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "formatted 7"));
    }

    #[test]
    fn test_guarded_async_panic() {
        let result = tokio_test::block_on(execute_guarded_async(async {
            tokio::task::yield_now().await;
            if true {
                panic!("async boom");
            }
            5
        }));
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "async boom"));

        let result = tokio_test::block_on(execute_guarded_async(async { 5 }));
        assert!(matches!(result, PanicGuardResult::Success(5)));
    }
}
