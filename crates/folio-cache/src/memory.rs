//! Memory-backed [`ContentCache`].
//!
//! Values of any `Clone + Send + Sync + 'static` type share one store. Each
//! entry is type-erased and downcast on lookup; a key read back with a
//! different type than it was stored with counts as a miss.
//!
//! The store lock is never held across an `.await`. Entries are replaced
//! whole. Concurrent misses on one key each run their own fetch.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::CacheConfig;

type Store = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Deadline used when `stored_at + duration` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// One stored value with its timestamps.
#[derive(Clone)]
struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    refresh_at: Instant,
    expires_at: Instant,
}

/// Typed view of an entry.
struct Hit<T> {
    data: Arc<T>,
    refresh_at: Instant,
    expires_at: Instant,
}

/// Time-boxed, key-addressed cache wrapping async fetch functions.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct ContentCache {
    store: Store,
    config: CacheConfig,
}

impl ContentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Return the value for `key`, fetching it when missing or expired.
    ///
    /// `fetch` runs at most once per call: inline on a miss or expiry, or in
    /// a detached task when a fresh entry is close to expiring.
    ///
    /// # Errors
    ///
    /// Returns the fetch error only when there is no entry to fall back to.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Instant::now();

        let Some(hit) = self.lookup::<T>(key) else {
            debug!(key, "cache miss");
            let data = fetch().await?;
            insert(&self.store, key.to_owned(), data.clone(), &self.config);
            return Ok(data);
        };

        if now < hit.expires_at {
            if now > hit.refresh_at {
                debug!(key, "cache hit near expiry, refreshing in background");
                self.spawn_refresh(key.to_owned(), fetch);
            } else {
                debug!(key, "cache hit");
            }
            return Ok(T::clone(&hit.data));
        }

        debug!(key, "cache entry expired");
        match fetch().await {
            Ok(data) => {
                insert(&self.store, key.to_owned(), data.clone(), &self.config);
                Ok(data)
            }
            Err(err) => {
                warn!(key, "fetch failed, serving stale data: {err}");
                Ok(T::clone(&hit.data))
            }
        }
    }

    /// Remove all entries, or only those whose key starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    pub fn clear(&self, prefix: Option<&str>) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let before = store.len();
        match prefix {
            Some(prefix) => store.retain(|key, _| !key.starts_with(prefix)),
            None => store.clear(),
        }
        let removed = before - store.len();
        debug!(?prefix, removed, "cache cleared");
        removed
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry (fresh or expired) exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn lookup<T: Send + Sync + 'static>(&self, key: &str) -> Option<Hit<T>> {
        let entry = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;

        match Arc::downcast::<T>(entry.data) {
            Ok(data) => Some(Hit {
                data,
                refresh_at: entry.refresh_at,
                expires_at: entry.expires_at,
            }),
            Err(_) => {
                debug!(key, "cached value has a different type, treating as miss");
                None
            }
        }
    }

    /// Best-effort refresh. Failures are logged, never returned.
    fn spawn_refresh<T, E, F, Fut>(&self, key: String, fetch: F)
    where
        T: Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let config = self.config;
        tokio::spawn(async move {
            match fetch().await {
                Ok(data) => {
                    debug!(key = %key, "background refresh stored");
                    insert(&store, key, data, &config);
                }
                Err(err) => warn!(key = %key, "background refresh failed: {err}"),
            }
        });
    }
}

fn insert<T: Send + Sync + 'static>(store: &Store, key: String, data: T, config: &CacheConfig) {
    let stored_at = Instant::now();
    let entry = CacheEntry {
        data: Arc::new(data),
        refresh_at: deadline(stored_at, config.refresh_after()),
        expires_at: deadline(stored_at, config.ttl),
    };
    store
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, entry);
}

/// `from + after`, saturating to a far-future instant on overflow.
fn deadline(from: Instant, after: Duration) -> Instant {
    from.checked_add(after).unwrap_or_else(|| from + FAR_FUTURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::future::{Ready, ready};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Fetch = Ready<Result<String, String>>;

    fn cache(ttl_secs: u64) -> ContentCache {
        ContentCache::new(CacheConfig::new(Duration::from_secs(ttl_secs)))
    }

    fn ok(calls: &Arc<AtomicUsize>, value: &str) -> impl FnOnce() -> Fetch + Send + 'static {
        let calls = Arc::clone(calls);
        let value = value.to_owned();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            ready(Ok(value))
        }
    }

    fn fail(calls: &Arc<AtomicUsize>) -> impl FnOnce() -> Fetch + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            ready(Err("upstream unavailable".to_owned()))
        }
    }

    /// Let detached tasks run.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_saturates_instead_of_panicking() {
        let cache = ContentCache::new(CacheConfig::new(Duration::from_secs(u64::MAX)));
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap(), "v1");
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert_eq!(cache.get_or_fetch("k", ok(&calls, "v2")).await.unwrap(), "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_fetches_and_stores() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache.get_or_fetch("page:1", ok(&calls, "v1")).await;
        assert_eq!(value, Ok("v1".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains_key("page:1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_hit_does_not_fetch() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(50)).await;

        let value = cache.get_or_fetch("k", ok(&calls, "v2")).await;
        settle().await;

        assert_eq!(value, Ok("v1".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_failure_propagates() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache.get_or_fetch("k", fail(&calls)).await;
        assert_eq!(value, Err("upstream unavailable".to_owned()));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_in_refresh_window_returns_current_and_refreshes() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(90)).await;

        let value = cache.get_or_fetch("k", ok(&calls, "v2")).await;
        assert_eq!(value, Ok("v1".to_owned()));

        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let value = cache.get_or_fetch("k", ok(&calls, "v3")).await;
        assert_eq!(value, Ok("v2".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh_failure_is_invisible() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(90)).await;

        let value = cache.get_or_fetch("k", fail(&calls)).await;
        settle().await;

        assert_eq!(value, Ok("v1".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.get_or_fetch("k", fail(&calls)).await,
            Ok("v1".to_owned())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_one_disables_refresh() {
        let cache = ContentCache::new(
            CacheConfig::new(Duration::from_secs(100)).with_refresh_threshold(1.0),
        );
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(99)).await;
        cache.get_or_fetch("k", ok(&calls, "v2")).await.unwrap();
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(100)).await;

        let value = cache.get_or_fetch("k", ok(&calls, "v2")).await;
        assert_eq!(value, Ok("v2".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_falls_back_on_failure() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(150)).await;

        let value = cache.get_or_fetch("k", fail(&calls)).await;
        assert_eq!(value, Ok("v1".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_entry_has_no_fallback() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(150)).await;
        assert_eq!(cache.clear(None), 1);

        let value = cache.get_or_fetch("k", fail(&calls)).await;
        assert_eq!(value, Err("upstream unavailable".to_owned()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_by_prefix() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        for key in ["page:1", "page:2", "blocks:1", "formatted-page:1:true"] {
            cache.get_or_fetch(key, ok(&calls, key)).await.unwrap();
        }

        assert_eq!(cache.clear(Some("page:")), 2);
        assert!(!cache.contains_key("page:1"));
        assert!(!cache.contains_key("page:2"));
        assert!(cache.contains_key("blocks:1"));
        assert!(cache.contains_key("formatted-page:1:true"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_mismatch_is_a_miss() {
        let cache = cache(100);

        let number: Result<u32, String> = cache.get_or_fetch("k", || ready(Ok(7))).await;
        assert_eq!(number, Ok(7));

        let text = cache
            .get_or_fetch("k", || ready(Ok::<_, String>("seven".to_owned())))
            .await;
        assert_eq!(text, Ok("seven".to_owned()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_store() {
        let cache = cache(100);
        let other = cache.clone();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", ok(&calls, "v1")).await.unwrap();
        let value = other.get_or_fetch("k", ok(&calls, "v2")).await;

        assert_eq!(value, Ok("v1".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
