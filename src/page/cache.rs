//! Page Cache Middleware
//!
//! TTL-bounded caching of fetched content plus a per-URL access counter that
//! outlives cache expiry.

use tracing::debug;

use crate::cache::{decode_int, decode_str};
use crate::error::Result;
use crate::instrument::{Layer, Operation};
use crate::store::SharedStore;

/// Default lifetime of a cached page, in seconds.
pub const DEFAULT_PAGE_TTL: u64 = 10;

/// Store key of the cached content for `url`.
pub fn cache_key(url: &str) -> String {
    format!("cache:{}", url)
}

/// Store key of the access counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

// == Page Cache Layer ==
/// Layer producing [`PageCache`] middleware.
#[derive(Clone)]
pub struct PageCacheLayer {
    store: SharedStore,
    ttl_seconds: u64,
}

impl PageCacheLayer {
    pub fn new(store: SharedStore, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }
}

impl<F> Layer<F> for PageCacheLayer {
    type Operation = PageCache<F>;

    fn layer(&self, fetcher: F) -> Self::Operation {
        PageCache {
            fetcher,
            store: self.store.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }
}

// == Page Cache ==
/// Caches the output of a URL fetcher.
///
/// A hit returns the stored page without calling the fetcher. A miss calls
/// the fetcher and caches its result for `ttl_seconds`. Every successful
/// access bumps `count:<url>`, which never expires. A failed fetch writes
/// nothing: no cache entry and no count.
pub struct PageCache<F> {
    fetcher: F,
    store: SharedStore,
    ttl_seconds: u64,
}

impl<F> PageCache<F>
where
    F: Operation<String, Out = String>,
{
    pub fn new(store: SharedStore, fetcher: F) -> Self {
        PageCacheLayer::new(store, DEFAULT_PAGE_TTL).layer(fetcher)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    // == Fetch ==
    /// Returns the content of `url`, from cache when still fresh.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let cache_key = cache_key(url);
        let count_key = count_key(url);

        if let Some(cached) = self.store.get(&cache_key)? {
            let count = self.store.incr(&count_key)?;
            debug!(url, count, "page cache hit");
            return decode_str(cached);
        }

        let content = self.fetcher.invoke(url.to_string())?;
        self.store
            .setex(&cache_key, self.ttl_seconds, content.as_bytes())?;
        let count = self.store.incr(&count_key)?;
        debug!(url, count, ttl = self.ttl_seconds, "page cache miss, fetched upstream");
        Ok(content)
    }

    /// Total successful accesses of `url`, hits and misses alike.
    pub fn access_count(&self, url: &str) -> Result<i64> {
        Ok(self
            .store
            .get(&count_key(url))?
            .map(decode_int)
            .transpose()?
            .unwrap_or(0))
    }
}

impl<F> Operation<String> for PageCache<F>
where
    F: Operation<String, Out = String>,
{
    type Out = String;

    fn invoke(&self, url: String) -> Result<String> {
        self.fetch(&url)
    }
}
