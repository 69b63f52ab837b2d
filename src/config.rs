//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL; `None` selects the in-process memory store
    pub store_url: Option<String>,
    /// TTL in seconds for cached pages
    pub page_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background purge task interval in seconds (memory store only)
    pub cleanup_interval: u64,
    /// Upstream page fetch timeout in seconds
    pub fetch_timeout: u64,
    /// Store connect/read/write timeout in seconds
    pub store_timeout: u64,
    /// Whether the store is flushed once at startup
    pub flush_on_start: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_URL` - Redis URL, e.g. `redis://127.0.0.1/` (default: unset, memory store)
    /// - `PAGE_TTL` - Page cache TTL in seconds, must be positive (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 1)
    /// - `FETCH_TIMEOUT` - Upstream fetch timeout in seconds (default: 10)
    /// - `STORE_TIMEOUT` - Store round-trip timeout in seconds (default: 5)
    /// - `FLUSH_ON_START` - Flush the store at startup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_url: env::var("STORE_URL").ok().filter(|v| !v.trim().is_empty()),
            // SETEX rejects a zero TTL
            page_ttl: parse_var("PAGE_TTL")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.page_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            fetch_timeout: parse_var("FETCH_TIMEOUT").unwrap_or(defaults.fetch_timeout),
            store_timeout: parse_var("STORE_TIMEOUT").unwrap_or(defaults.store_timeout),
            flush_on_start: parse_var("FLUSH_ON_START").unwrap_or(defaults.flush_on_start),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            page_ttl: 10,
            server_port: 3000,
            cleanup_interval: 1,
            fetch_timeout: 10,
            store_timeout: 5,
            flush_on_start: true,
        }
    }
}
