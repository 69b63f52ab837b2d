//! Call Counter Middleware
//!
//! Increments a per-operation counter in the store on every invocation.

use tracing::{debug, warn};

use crate::error::Result;
use crate::instrument::{Layer, Operation, OperationIdentity};
use crate::store::SharedStore;

// == Count Layer ==
/// Layer producing [`CallCounter`] middleware.
#[derive(Clone)]
pub struct CountLayer {
    store: SharedStore,
    identity: OperationIdentity,
}

impl CountLayer {
    pub fn new(store: SharedStore, identity: OperationIdentity) -> Self {
        Self { store, identity }
    }
}

impl<S> Layer<S> for CountLayer {
    type Operation = CallCounter<S>;

    fn layer(&self, inner: S) -> Self::Operation {
        CallCounter {
            inner,
            store: self.store.clone(),
            identity: self.identity.clone(),
        }
    }
}

// == Call Counter ==
/// Counts invocations of the wrapped operation under its identity key.
///
/// Counting is best effort: a failed increment is logged and the call
/// still runs. The inner result is returned untouched.
pub struct CallCounter<S> {
    inner: S,
    store: SharedStore,
    identity: OperationIdentity,
}

impl<S> CallCounter<S> {
    pub fn identity(&self) -> &OperationIdentity {
        &self.identity
    }
}

impl<S, In> Operation<In> for CallCounter<S>
where
    S: Operation<In>,
{
    type Out = S::Out;

    fn invoke(&self, input: In) -> Result<Self::Out> {
        match self.store.incr(self.identity.counter_key()) {
            Ok(count) => debug!(operation = %self.identity, count, "call counted"),
            Err(err) => warn!(operation = %self.identity, error = %err, "failed to count call"),
        }
        self.inner.invoke(input)
    }
}
