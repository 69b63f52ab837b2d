//! Store Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Data ==
/// Payload held under a single key.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Plain byte string (also holds counters as decimal text)
    Bytes(Vec<u8>),
    /// Ordered, append-only list of byte strings
    List(Vec<Vec<u8>>),
}

// == Store Entry ==
/// Represents a single store entry with its payload and expiry.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub data: Data,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructors ==
    /// Creates an entry that never expires.
    pub fn new(data: Data) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    /// Creates an entry expiring `ttl_seconds` from now.
    ///
    /// Returns `None` when the expiry timestamp does not fit in a `u64`.
    pub fn expiring(data: Data, ttl_seconds: u64) -> Option<Self> {
        let expires_at = ttl_seconds
            .checked_mul(1000)
            .and_then(|ms| current_timestamp_ms().checked_add(ms))?;
        Some(Self {
            data,
            expires_at: Some(expires_at),
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
