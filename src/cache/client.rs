//! Cache Client Module
//!
//! Stores scalars under generated keys and reads them back, optionally decoded.

use tracing::debug;
use uuid::Uuid;

use crate::cache::{decode_float, decode_int, decode_str, Scalar};
use crate::error::Result;
use crate::instrument::{instrument, Instrumented, Operation, OperationIdentity};
use crate::store::SharedStore;

// == Store Operation ==
/// The uninstrumented write behind [`Cache::store`].
pub struct StoreValue {
    store: SharedStore,
}

impl Operation<(Scalar,)> for StoreValue {
    type Out = String;

    fn invoke(&self, (data,): (Scalar,)) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.store.set(&key, &data.to_bytes())?;
        debug!(key = %key, "stored value");
        Ok(key)
    }
}

// == Cache ==
/// Scalar cache over a shared key-value store.
///
/// Every [`store`](Cache::store) call is counted and recorded under
/// [`Cache::STORE`], so it can be replayed later.
pub struct Cache {
    store: SharedStore,
    store_op: Instrumented<StoreValue>,
}

impl Cache {
    /// Identity of the instrumented `store` operation.
    pub const STORE: &'static str = "Cache.store";

    // == Constructor ==
    pub fn new(store: SharedStore) -> Self {
        let store_op = instrument(
            store.clone(),
            OperationIdentity::new(Self::STORE),
            StoreValue {
                store: store.clone(),
            },
        );
        Self { store, store_op }
    }

    /// Identity under which `store` calls are counted and recorded.
    pub fn store_identity(&self) -> &OperationIdentity {
        self.store_op.identity()
    }

    // == Store ==
    /// Writes `data` under a fresh UUID key and returns the key.
    pub fn store(&self, data: impl Into<Scalar>) -> Result<String> {
        self.store_op.invoke((data.into(),))
    }

    // == Get ==
    /// Returns the raw stored bytes, or `None` on a miss.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key)
    }

    /// Returns the stored value converted by `decode`, or `None` on a miss.
    ///
    /// Decoder errors are returned as-is; the stored bytes are left untouched.
    pub fn get_with<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.store.get(key)?.map(decode).transpose()
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_str)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int)
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.get_with(key, decode_float)
    }
}
