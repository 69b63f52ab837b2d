//! Store Module
//!
//! The key-value store contract every cache component is built on, plus the
//! in-process and Redis-backed implementations of it.

mod entry;
mod memory;
mod redis_store;

use std::sync::Arc;

use crate::error::Result;

pub use entry::{current_timestamp_ms, Data, StoreEntry};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Key Value Store ==
/// Byte-string store addressed by UTF-8 keys.
///
/// Each method is a single atomic round trip. Callers never lock around
/// these calls; per-key serialization is the store's job.
pub trait KeyValueStore: Send + Sync {
    /// Overwrites the whole value at `key` and clears any TTL.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns the value at `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically increments the integer at `key`, starting from 0 if absent.
    fn incr(&self, key: &str) -> Result<i64>;

    /// Appends `value` to the list at `key`, returning the new length.
    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize>;

    /// Returns the inclusive slice `start..=stop` of the list at `key`.
    ///
    /// Negative indices count from the end, so `(0, -1)` is the full list.
    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Sets `value` at `key`, expiring after `ttl_seconds`.
    fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()>;

    /// Removes every key.
    fn flushdb(&self) -> Result<()>;
}

/// Shared store handle injected into every component.
pub type SharedStore = Arc<dyn KeyValueStore>;
