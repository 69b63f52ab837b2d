//! Call Cache - an instrumented caching layer over a key-value store
//!
//! Stores scalars under generated keys, counts and records every call to an
//! instrumented operation, replays that history, and caches fetched pages
//! with a TTL and a per-URL access counter.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod instrument;
pub mod models;
pub mod page;
pub mod replay;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, Scalar};
pub use config::Config;
pub use error::{CacheError, Result};
pub use instrument::{instrument, Operation, OperationIdentity};
pub use page::{HttpFetcher, PageCache};
pub use replay::{Replay, ReplayReporter};
pub use store::{KeyValueStore, MemoryStore, RedisStore, SharedStore};
pub use tasks::spawn_cleanup_task;
