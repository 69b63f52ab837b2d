//! Redis Store Module
//!
//! Key-value store backed by a Redis server over one shared connection.

use std::time::Duration;

use parking_lot::Mutex;
use redis::{Commands, Connection, RedisError};
use tracing::info;

use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            CacheError::StoreUnavailable(err.to_string())
        } else {
            CacheError::StoreCommand(err.to_string())
        }
    }
}

// == Redis Store ==
/// Store backed by Redis.
///
/// The connection is opened once and shared; the mutex only serializes use
/// of the socket; command atomicity comes from Redis itself.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to `url`, applying `timeout` to connect, read and write.
    pub fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::InvalidRequest(format!("bad store url {}: {}", url, e)))?;
        let conn = client.get_connection_with_timeout(timeout)?;
        conn.set_read_timeout(Some(timeout))?;
        conn.set_write_timeout(Some(timeout))?;
        info!("Connected to Redis store at {}", url);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl KeyValueStore for RedisStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.lock().set::<_, _, ()>(key, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.conn.lock().get(key)?)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        Ok(self.conn.lock().incr(key, 1)?)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        Ok(self.conn.lock().rpush(key, value)?)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        Ok(self.conn.lock().lrange(key, start, stop)?)
    }

    fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        self.conn.lock().set_ex::<_, _, ()>(key, value, ttl_seconds)?;
        Ok(())
    }

    fn flushdb(&self) -> Result<()> {
        let mut conn = self.conn.lock();
        redis::cmd("FLUSHDB").query::<()>(&mut *conn)?;
        Ok(())
    }
}
