//! Page Module
//!
//! Expiring cache for externally fetched content, with per-URL access counts.

mod cache;
mod fetcher;

pub use cache::{cache_key, count_key, PageCache, PageCacheLayer, DEFAULT_PAGE_TTL};
pub use fetcher::HttpFetcher;

use std::sync::Arc;

use crate::instrument::Operation;

/// Type-erased fetcher, so callers can swap the upstream without changing types.
pub type PageFetcher = Arc<dyn Operation<String, Out = String>>;
