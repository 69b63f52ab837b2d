//! Memory Store Module
//!
//! In-process key-value store with Redis string/list semantics and lazy TTL expiry.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{CacheError, Result};
use crate::store::{current_timestamp_ms, Data, KeyValueStore, StoreEntry};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

// == Memory Store ==
/// Key-value store held in process memory.
///
/// A single mutex guards the map, so every operation is atomic with respect
/// to every other one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored keys, expired-but-unpurged ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remaining TTL of `key` in milliseconds, `None` if absent or persistent.
    pub fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let mut entries = self.entries.lock();
        live_entry(&mut entries, key).and_then(|entry| entry.ttl_remaining_ms())
    }
}

/// Looks up `key`, dropping it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, StoreEntry>,
    key: &str,
) -> Option<&'a mut StoreEntry> {
    if entries.get(key).is_some_and(StoreEntry::is_expired) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

/// Resolves Redis-style inclusive, possibly negative, bounds against `len`.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn parse_counter(raw: &[u8]) -> Result<i64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            CacheError::StoreCommand("ERR value is not an integer or out of range".to_string())
        })
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let entry = StoreEntry::new(Data::Bytes(value.to_vec()));
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key) {
            Some(StoreEntry {
                data: Data::Bytes(bytes),
                ..
            }) => Ok(Some(bytes.clone())),
            Some(_) => Err(CacheError::StoreCommand(WRONGTYPE.to_string())),
            None => Ok(None),
        }
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key) {
            Some(entry) => {
                let Data::Bytes(raw) = &entry.data else {
                    return Err(CacheError::StoreCommand(WRONGTYPE.to_string()));
                };
                let next = parse_counter(raw)?.checked_add(1).ok_or_else(|| {
                    CacheError::StoreCommand(
                        "ERR increment or decrement would overflow".to_string(),
                    )
                })?;
                // INCR keeps any existing TTL
                entry.data = Data::Bytes(next.to_string().into_bytes());
                Ok(next)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    StoreEntry::new(Data::Bytes(b"1".to_vec())),
                );
                Ok(1)
            }
        }
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key) {
            Some(StoreEntry {
                data: Data::List(items),
                ..
            }) => {
                items.push(value.to_vec());
                Ok(items.len())
            }
            Some(_) => Err(CacheError::StoreCommand(WRONGTYPE.to_string())),
            None => {
                entries.insert(
                    key.to_string(),
                    StoreEntry::new(Data::List(vec![value.to_vec()])),
                );
                Ok(1)
            }
        }
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key) {
            Some(StoreEntry {
                data: Data::List(items),
                ..
            }) => Ok(resolve_range(items.len(), start, stop)
                .map(|(from, to)| items[from..=to].to_vec())
                .unwrap_or_default()),
            Some(_) => Err(CacheError::StoreCommand(WRONGTYPE.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        let entry = Some(ttl_seconds)
            .filter(|ttl| *ttl > 0)
            .and_then(|ttl| StoreEntry::expiring(Data::Bytes(value.to_vec()), ttl))
            .ok_or_else(|| {
                CacheError::StoreCommand("ERR invalid expire time in 'setex' command".to_string())
            })?;
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    fn flushdb(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::{self, sleep};
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store.set("key1", b"value1").unwrap();

        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_store_overwrite_clears_ttl() {
        let store = MemoryStore::new();

        store.setex("key1", 60, b"value1").unwrap();
        assert!(store.ttl_remaining_ms("key1").is_some());

        store.set("key1", b"value2").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"value2".to_vec()));
        assert!(store.ttl_remaining_ms("key1").is_none());
    }

    #[test]
    fn test_store_incr_creates_and_increments() {
        let store = MemoryStore::new();

        assert_eq!(store.incr("counter").unwrap(), 1);
        assert_eq!(store.incr("counter").unwrap(), 2);
        assert_eq!(store.get("counter").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_store_incr_existing_text_integer() {
        let store = MemoryStore::new();

        store.set("counter", b"41").unwrap();
        assert_eq!(store.incr("counter").unwrap(), 42);
    }

    #[test]
    fn test_store_incr_rejects_non_integer() {
        let store = MemoryStore::new();

        store.set("counter", b"abc").unwrap();
        let result = store.incr("counter");
        assert!(matches!(result, Err(CacheError::StoreCommand(_))));
        // The raw value is untouched
        assert_eq!(store.get("counter").unwrap(), Some(b"abc".to_vec()));
    }

    #[test]
    fn test_store_incr_overflow() {
        let store = MemoryStore::new();

        store.set("counter", i64::MAX.to_string().as_bytes()).unwrap();
        assert!(matches!(store.incr("counter"), Err(CacheError::StoreCommand(_))));
    }

    #[test]
    fn test_store_incr_keeps_ttl() {
        let store = MemoryStore::new();

        store.setex("counter", 60, b"1").unwrap();
        store.incr("counter").unwrap();
        assert!(store.ttl_remaining_ms("counter").is_some());
    }

    #[test]
    fn test_store_rpush_and_lrange() {
        let store = MemoryStore::new();

        assert_eq!(store.rpush("list", b"a").unwrap(), 1);
        assert_eq!(store.rpush("list", b"b").unwrap(), 2);
        assert_eq!(store.rpush("list", b"c").unwrap(), 3);

        let all = store.lrange("list", 0, -1).unwrap();
        assert_eq!(all, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_store_lrange_bounds() {
        let store = MemoryStore::new();
        for item in ["a", "b", "c", "d"] {
            store.rpush("list", item.as_bytes()).unwrap();
        }

        assert_eq!(store.lrange("list", 1, 2).unwrap(), vec![b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(store.lrange("list", -2, -1).unwrap(), vec![b"c".to_vec(), b"d".to_vec()]);
        assert_eq!(store.lrange("list", 0, 100).unwrap().len(), 4);
        assert_eq!(store.lrange("list", -100, 0).unwrap(), vec![b"a".to_vec()]);
        assert!(store.lrange("list", 3, 1).unwrap().is_empty());
        assert!(store.lrange("list", 10, 20).unwrap().is_empty());
        assert!(store.lrange("missing", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_store_wrong_type() {
        let store = MemoryStore::new();

        store.set("string", b"value").unwrap();
        store.rpush("list", b"item").unwrap();

        assert!(matches!(store.rpush("string", b"x"), Err(CacheError::StoreCommand(_))));
        assert!(matches!(store.lrange("string", 0, -1), Err(CacheError::StoreCommand(_))));
        assert!(matches!(store.get("list"), Err(CacheError::StoreCommand(_))));
        assert!(matches!(store.incr("list"), Err(CacheError::StoreCommand(_))));
    }

    #[test]
    fn test_store_setex_zero_ttl_rejected() {
        let store = MemoryStore::new();

        let result = store.setex("key", 0, b"value");
        assert!(matches!(result, Err(CacheError::StoreCommand(_))));
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn test_store_setex_huge_ttl_rejected() {
        let store = MemoryStore::new();

        let result = store.setex("key", u64::MAX / 1000 + 1, b"value");
        assert!(matches!(result, Err(CacheError::StoreCommand(_))));
        assert!(matches!(
            store.setex("key", u64::MAX, b"value"),
            Err(CacheError::StoreCommand(_))
        ));
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = MemoryStore::new();

        store.setex("key1", 1, b"value1").unwrap();

        // Should be accessible immediately
        assert!(store.get("key1").unwrap().is_some());

        // Wait for expiration
        sleep(Duration::from_millis(1100));

        assert_eq!(store.get("key1").unwrap(), None);
        assert!(store.is_empty(), "Expired entry should be dropped on access");
    }

    #[test]
    fn test_store_purge_expired() {
        let store = MemoryStore::new();

        store.setex("key1", 1, b"value1").unwrap();
        store.setex("key2", 10, b"value2").unwrap();
        store.set("key3", b"value3").unwrap();

        // Wait for key1 to expire
        sleep(Duration::from_millis(1100));

        let removed = store.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("key2").unwrap().is_some());
    }

    #[test]
    fn test_store_flushdb() {
        let store = MemoryStore::new();

        store.set("a", b"1").unwrap();
        store.rpush("b", b"2").unwrap();
        store.flushdb().unwrap();

        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_store_concurrent_incr_and_rpush() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.incr("hits").unwrap();
                        store.rpush("log", b"x").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("hits").unwrap(), Some(b"800".to_vec()));
        assert_eq!(store.lrange("log", 0, -1).unwrap().len(), 800);
    }
}
