//! Rate Limiter (Token Bucket Algorithm)
//!
//! One bucket per limiter: tokens refill continuously at `rate` per second up
//! to `capacity`, and each admitted request consumes its cost.
//! State is process-local and never shared across instances.

use functions_core::port::{SystemTimeProvider, TimeProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Snapshot of the bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitState {
    pub tokens: f64,
    pub last_update_millis: i64,
}

/// Token bucket rate limiter
pub struct RateLimiter {
    rate: f64,     // tokens per second
    capacity: f64, // maximum burst
    state: Mutex<RateLimitState>,
    time_provider: Arc<dyn TimeProvider>,
}

impl RateLimiter {
    /// Create a full bucket
    ///
    /// # Example
    /// Allow 100 requests/sec with burst of 200:
    /// `RateLimiter::new(100.0, 200.0)`
    pub fn new(rate: f64, capacity: f64) -> Self {
        Self::with_time_provider(rate, capacity, Arc::new(SystemTimeProvider))
    }

    pub fn with_time_provider(rate: f64, capacity: f64, time_provider: Arc<dyn TimeProvider>) -> Self {
        let now = time_provider.now_millis();
        Self {
            rate,
            capacity,
            state: Mutex::new(RateLimitState {
                tokens: capacity,
                last_update_millis: now,
            }),
            time_provider,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.rate, config.burst)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn refill(&self, state: &mut RateLimitState) {
        let now = self.time_provider.now_millis();
        let elapsed_secs = (now - state.last_update_millis).max(0) as f64 / 1000.0;
        state.tokens = (state.tokens + elapsed_secs * self.rate).min(self.capacity);
        state.last_update_millis = now;
    }

    /// Admit one request (consumes 1 token)
    pub fn allow(&self) -> bool {
        self.allow_cost(1.0)
    }

    /// Admit a request of the given cost
    ///
    /// Returns false and consumes nothing when fewer than `cost` tokens are
    /// available.
    pub fn allow_cost(&self, cost: f64) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= cost {
            state.tokens -= cost;
            true
        } else {
            debug!(tokens = state.tokens, cost, "Rate limited");
            false
        }
    }

    /// Tokens available right now
    pub fn remaining(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Current bucket state, without refilling
    pub fn state(&self) -> RateLimitState {
        *self.state.lock()
    }
}

/// Limiter settings for the dev server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub burst: f64,
    pub rate: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 200.0,
            rate: 100.0,
        }
    }
}

impl RateLimitConfig {
    pub const BURST_ENV: &'static str = "FUNCTIONS_RATE_LIMIT_BURST";
    pub const RATE_ENV: &'static str = "FUNCTIONS_RATE_LIMIT_RATE";

    /// Load from `FUNCTIONS_RATE_LIMIT_BURST` / `FUNCTIONS_RATE_LIMIT_RATE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            burst: read_env(Self::BURST_ENV, defaults.burst),
            rate: read_env(Self::RATE_ENV, defaults.rate),
        }
    }
}

fn read_env(name: &str, default: f64) -> f64 {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value >= 0.0 => value,
            _ => {
                warn!(var = name, value = %raw, "Ignoring invalid rate limit setting");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use functions_core::port::ManualTimeProvider;
    use std::time::Duration;

    fn limiter(rate: f64, capacity: f64) -> (RateLimiter, Arc<ManualTimeProvider>) {
        let clock = Arc::new(ManualTimeProvider::new(0));
        (RateLimiter::with_time_provider(rate, capacity, clock.clone()), clock)
    }

    #[test]
    fn test_allows_within_limit() {
        let (limiter, _) = limiter(10.0, 10.0);

        for _ in 0..10 {
            assert!(limiter.allow());
        }

        // 11th should be denied
        assert!(!limiter.allow());
    }

    #[test]
    fn test_zero_rate_exact_capacity() {
        let (limiter, clock) = limiter(0.0, 2.0);

        assert!(limiter.allow());
        assert!(limiter.allow());
        clock.advance(Duration::from_secs(3600));
        assert!(!limiter.allow());
    }

    #[test]
    fn test_remaining_tracks_cost() {
        let (limiter, _) = limiter(0.0, 10.0);
        assert_eq!(limiter.remaining(), 10.0);

        assert!(limiter.allow_cost(3.0));
        assert_eq!(limiter.remaining(), 7.0);

        // Insufficient tokens consume nothing
        assert!(!limiter.allow_cost(8.0));
        assert_eq!(limiter.remaining(), 7.0);
    }

    #[test]
    fn test_refills_up_to_capacity() {
        let (limiter, clock) = limiter(10.0, 5.0); // 10 tokens/sec

        for _ in 0..5 {
            assert!(limiter.allow());
        }
        assert!(!limiter.allow());

        clock.advance(Duration::from_millis(200));
        assert!((limiter.remaining() - 2.0).abs() < 1e-9);

        clock.advance(Duration::from_secs(10));
        assert_eq!(limiter.remaining(), 5.0);
        assert_eq!(limiter.state().last_update_millis, 10_200);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_bucket() {
        let limiter = Arc::new(RateLimiter::new(0.0, 100.0));

        let mut handles = vec![];
        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                (0..20).filter(|_| limiter.allow()).count()
            }));
        }

        let mut total_allowed = 0;
        for handle in handles {
            total_allowed += handle.await.unwrap();
        }

        // 200 attempts, but only the burst of 100 is admitted
        assert_eq!(total_allowed, 100);
    }

    #[test]
    fn test_config_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.burst, 200.0);
        assert_eq!(config.rate, 100.0);

        let limiter = RateLimiter::from_config(&config);
        assert_eq!(limiter.capacity(), 200.0);
        assert_eq!(limiter.rate(), 100.0);
    }
}
