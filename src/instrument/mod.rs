//! Instrumentation Module
//!
//! Middleware that observes an operation without the operation knowing:
//! [`CallCounter`] counts calls, [`HistoryRecorder`] logs arguments and results.
//!
//! The pipeline is fixed: counter, then history recorder, then the real
//! operation. Both layers run on every call, keyed by an explicit
//! [`OperationIdentity`].

mod counter;
mod history;
mod identity;
mod operation;

pub use counter::{CallCounter, CountLayer};
pub use history::{CallOutcome, HistoryLayer, HistoryRecorder, OutputEntry};
pub use identity::OperationIdentity;
pub use operation::{Execute, Layer, Operation};

use crate::store::SharedStore;

/// An operation wrapped in the full instrumentation pipeline.
pub type Instrumented<S> = CallCounter<HistoryRecorder<S>>;

/// Wraps `operation` with call counting and history recording under `identity`.
pub fn instrument<S>(
    store: SharedStore,
    identity: OperationIdentity,
    operation: S,
) -> Instrumented<S> {
    let history = HistoryLayer::new(store.clone(), identity.clone());
    CountLayer::new(store, identity).layer(history.layer(operation))
}
