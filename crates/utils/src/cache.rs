// In-memory TTL cache
//
// Expiry is lazy: an entry is only checked (and evicted) when it is read.
// Entries are per-instance; clones share the same store.

use functions_core::port::{SystemTimeProvider, TimeProvider};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at_millis: i64,
}

struct CacheInner<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    time_provider: Arc<dyn TimeProvider>,
}

/// Simple in-memory cache for function results
pub struct MemoryCache<V>(Arc<CacheInner<V>>);

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V: Clone> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> MemoryCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_time_provider(default_ttl, Arc::new(SystemTimeProvider))
    }

    pub fn with_time_provider(default_ttl: Duration, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self(Arc::new(CacheInner {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            time_provider,
        }))
    }

    pub fn default_ttl(&self) -> Duration {
        self.0.default_ttl
    }

    /// Get a value unless it has expired; expired entries are evicted
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.0.time_provider.now_millis();
        let mut entries = self.0.entries.lock();

        let expired = match entries.get(key) {
            None => {
                debug!(key, "Cache miss");
                return None;
            }
            Some(entry) => now > entry.expires_at_millis,
        };

        if expired {
            entries.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }

        debug!(key, "Cache hit");
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value; `None` uses the default TTL, `Some(ZERO)` expires as
    /// soon as the clock moves
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.0.default_ttl);
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at_millis = self.0.time_provider.now_millis().saturating_add(ttl_millis);

        self.0.entries.lock().insert(
            key.into(),
            CacheEntry {
                value,
                expires_at_millis,
            },
        );
    }

    /// Remove an entry; returns whether anything was removed
    pub fn delete(&self, key: &str) -> bool {
        self.0.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.0.entries.lock().clear();
    }

    /// Stored entries, including expired ones that have not been read yet
    pub fn len(&self) -> usize {
        self.0.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value, or run `f` and cache its `Ok` result
    ///
    /// The lock is not held while `f` runs, so concurrent misses on the same
    /// key may each run `f`.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        f: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = f().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Wrap an async operation so its results are cached under `key`
    pub fn cached<A, F, Fut>(&self, key: CacheKey<A>, ttl: Option<Duration>, func: F) -> Cached<A, V, F>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = V>,
    {
        Cached {
            cache: self.clone(),
            key,
            ttl,
            func,
        }
    }
}

type KeyBuilder<A> = dyn Fn(&A) -> String + Send + Sync;

/// How a cached call derives its key
pub enum CacheKey<A> {
    Static(String),
    Builder(Arc<KeyBuilder<A>>),
}

impl<A> CacheKey<A> {
    pub fn fixed(key: impl Into<String>) -> Self {
        CacheKey::Static(key.into())
    }

    pub fn builder<F>(f: F) -> Self
    where
        F: Fn(&A) -> String + Send + Sync + 'static,
    {
        CacheKey::Builder(Arc::new(f))
    }

    fn resolve(&self, args: &A) -> String {
        match self {
            CacheKey::Static(key) => key.clone(),
            CacheKey::Builder(build) => build(args),
        }
    }
}

impl<A> Clone for CacheKey<A> {
    fn clone(&self) -> Self {
        match self {
            CacheKey::Static(key) => CacheKey::Static(key.clone()),
            CacheKey::Builder(build) => CacheKey::Builder(Arc::clone(build)),
        }
    }
}

/// Async operation whose results are memoized in a MemoryCache
pub struct Cached<A, V, F> {
    cache: MemoryCache<V>,
    key: CacheKey<A>,
    ttl: Option<Duration>,
    func: F,
}

impl<A, V, F, Fut> Cached<A, V, F>
where
    V: Clone,
    F: Fn(A) -> Fut,
    Fut: Future<Output = V>,
{
    pub async fn call(&self, args: A) -> V {
        let key = self.key.resolve(&args);
        if let Some(value) = self.cache.get(&key) {
            return value;
        }

        let value = (self.func)(args).await;
        self.cache.set(key, value.clone(), self.ttl);
        value
    }

    pub fn cache(&self) -> &MemoryCache<V> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use functions_core::port::ManualTimeProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache_with_clock() -> (MemoryCache<String>, Arc<ManualTimeProvider>) {
        let clock = Arc::new(ManualTimeProvider::new(1_000_000));
        let cache = MemoryCache::with_time_provider(Duration::from_secs(60), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_and_get() {
        let (cache, _) = cache_with_clock();
        cache.set("key1", "value1".to_string(), None);
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[test]
    fn test_expiration_is_lazy() {
        let (cache, clock) = cache_with_clock();
        cache.set("key1", "value1".to_string(), Some(Duration::ZERO));

        // Still valid at the exact expiry instant
        assert!(cache.get("key1").is_some());

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_default_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", "v".to_string(), None);

        clock.advance(Duration::from_secs(60));
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_delete_and_clear() {
        let (cache, _) = cache_with_clock();
        cache.set("key1", "value1".to_string(), None);
        cache.set("key2", "value2".to_string(), None);

        assert!(cache.delete("key1"));
        assert_eq!(cache.get("key1"), None);
        assert!(!cache.delete("key1"));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache: MemoryCache<u32> = MemoryCache::default();
        let other = cache.clone();
        other.set("n", 7, None);
        assert_eq!(cache.get("n"), Some(7));
        assert_eq!(cache.default_ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let (cache, _) = cache_with_clock();

        let failed: Result<String, &str> =
            tokio_test::block_on(cache.get_or_try_insert_with("k", None, || async { Err("down") }));
        assert!(failed.is_err());
        assert!(cache.get("k").is_none());

        let value = tokio_test::block_on(
            cache.get_or_try_insert_with("k", None, || async { Ok::<_, &str>("fresh".to_string()) }),
        );
        assert_eq!(value, Ok("fresh".to_string()));

        let value = tokio_test::block_on(
            cache.get_or_try_insert_with("k", None, || async { Ok::<_, &str>("ignored".to_string()) }),
        );
        assert_eq!(value, Ok("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_cached_static_key() {
        let (cache, clock) = cache_with_clock();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let op = cache.cached(CacheKey::fixed("test-key"), None, move |_: ()| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "result".to_string()
            }
        });

        assert_eq!(op.call(()).await, "result");
        assert_eq!(op.call(()).await, "result");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(61));
        op.call(()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_key_builder() {
        let cache: MemoryCache<String> = MemoryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let op = cache.cached(
            CacheKey::builder(|user_id: &u64| format!("user:{}", user_id)),
            Some(Duration::from_secs(30)),
            move |user_id: u64| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { format!("User {}", user_id) }
            },
        );

        assert_eq!(op.call(1).await, "User 1");
        assert_eq!(op.call(2).await, "User 2");
        assert_eq!(op.call(1).await, "User 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(op.cache().get("user:2"), Some("User 2".to_string()));
    }
}
