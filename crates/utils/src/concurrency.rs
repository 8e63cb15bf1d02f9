// Async combinators: bounded gather, retry with backoff, timeout

use crate::error::TimeoutError;
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Run every future to completion with at most `limit` in flight
///
/// Results come back in input order regardless of completion order. A limit
/// of 0 is treated as 1.
pub async fn gather_with_concurrency<I, F, T>(limit: usize, tasks: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let semaphore = Semaphore::new(limit.max(1));
    let semaphore = &semaphore;

    join_all(tasks.into_iter().map(|task| async move {
        // The semaphore is never closed, so acquiring only waits
        let _permit = semaphore.acquire().await.ok();
        task.await
    }))
    .await
}

/// Retry policy
///
/// `max_retries` counts additional attempts after the first one. The delay
/// is multiplied by `backoff` after every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay: Duration,
    pub backoff: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, delay: Duration, backoff: f64) -> Self {
        Self {
            max_retries,
            delay,
            backoff,
        }
    }
}

/// Retry `op` on every error, returning the last error once attempts run out
pub async fn retry_async<F, Fut, T, E>(config: &RetryConfig, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_async_if(config, |_: &E| true, op).await
}

/// Retry `op` only on errors accepted by `should_retry`; others return at once
pub async fn retry_async_if<F, Fut, T, E, P>(config: &RetryConfig, should_retry: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let mut delay = config.delay;
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "Retry succeeded");
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && should_retry(&e) => {
                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff).unwrap_or(delay);
                attempt += 1;
            }
            Err(e) => {
                warn!(attempts = attempt + 1, error = %e, "Giving up");
                return Err(e);
            }
        }
    }
}

/// Await `future` for at most `duration`, dropping it on expiry
pub async fn timeout_async<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError(duration))
}
