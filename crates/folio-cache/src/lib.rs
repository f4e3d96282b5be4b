//! In-process content cache for Folio.
//!
//! [`ContentCache`] maps string keys to values produced by async fetch
//! functions. Entries live for a fixed TTL:
//!
//! - **Miss**: fetch, store, return. Failures propagate.
//! - **Fresh hit**: return the stored value. Within the last
//!   `1 - refresh_threshold` fraction of the entry's life a background
//!   refresh is spawned; its outcome is only logged.
//! - **Expired hit**: fetch synchronously. On failure the expired value is
//!   served instead of the error.
//!
//! [`ContentCache::clear`] drops entries (all, or by key prefix), which also
//! removes their stale fallback.
//!
//! # Example
//!
//! ```
//! use folio_cache::{CacheConfig, ContentCache};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let cache = ContentCache::new(CacheConfig::default());
//! let value: Result<String, String> = cache
//!     .get_or_fetch("page:1", || async { Ok("hello".to_owned()) })
//!     .await;
//! assert_eq!(value.unwrap(), "hello");
//! assert_eq!(cache.len(), 1);
//! # });
//! ```

mod memory;

use std::time::Duration;

pub use memory::ContentCache;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default fraction of the TTL after which a hit triggers a background refresh.
pub const DEFAULT_REFRESH_THRESHOLD: f64 = 0.8;

/// Cache timing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Lifetime of an entry.
    pub ttl: Duration,
    /// Fraction of `ttl` in `(0, 1]` after which hits refresh in the background.
    /// `1.0` disables background refresh.
    pub refresh_threshold: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
        }
    }
}

impl CacheConfig {
    /// Config with the given TTL and the default refresh threshold.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Set the refresh threshold.
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: f64) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Entry age after which a hit triggers a background refresh.
    ///
    /// Out-of-range thresholds fall back to [`DEFAULT_REFRESH_THRESHOLD`].
    pub(crate) fn refresh_after(&self) -> Duration {
        let threshold = if self.refresh_threshold > 0.0 && self.refresh_threshold <= 1.0 {
            self.refresh_threshold
        } else {
            DEFAULT_REFRESH_THRESHOLD
        };
        Duration::try_from_secs_f64(self.ttl.as_secs_f64() * threshold).unwrap_or(self.ttl)
    }
}
