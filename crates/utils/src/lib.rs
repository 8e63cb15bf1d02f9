// Functions Utils - Helpers for function authors
// All state here is process-local: nothing is shared across instances.

pub mod cache;
pub mod concurrency;
pub mod crypto;
pub mod datetime;
pub mod error;
pub mod json;
pub mod rate_limiter;
pub mod strings;
pub mod validation;

pub use cache::{CacheKey, Cached, MemoryCache, DEFAULT_TTL};
pub use concurrency::{gather_with_concurrency, retry_async, retry_async_if, timeout_async, RetryConfig};
pub use crypto::{generate_token, hash_password, hmac_sign, hmac_verify, verify_password, HmacAlgorithm};
pub use datetime::{format_iso_datetime, parse_iso_datetime, time_ago, time_ago_from, utc_now};
pub use error::{CryptoError, DateTimeError, TimeoutError, ValidationError};
pub use json::{json_dumps, json_dumps_pretty, json_loads, safe_json_loads};
pub use rate_limiter::{RateLimitConfig, RateLimitState, RateLimiter};
pub use strings::{mask_secret, slugify, truncate};
pub use validation::{
    validate_email, validate_length, validate_pattern, validate_range, validate_required,
    validate_type, JsonType,
};
