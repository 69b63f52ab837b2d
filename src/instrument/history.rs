//! History Recorder Middleware
//!
//! Appends the serialized arguments and result of every call to two lists in
//! the store, `<identity>:inputs` and `<identity>:outputs`.
//!
//! Overlapping calls finish in any order, so output entries carry the inputs
//! index of their call instead of relying on list position.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::Result;
use crate::instrument::{Layer, Operation, OperationIdentity};
use crate::store::SharedStore;

// == Output Entry ==
/// How a recorded call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Serialized return value
    Returned(String),
    /// Message of the error the call failed with
    Failed(String),
}

/// One entry of the outputs list.
///
/// Stored as `{"call": i, "result": <json>}` on success or
/// `{"call": i, "error": "<message>"}` on failure, where `i` is the index of
/// the call's entry in the inputs list.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEntry {
    pub call: usize,
    pub outcome: CallOutcome,
}

impl OutputEntry {
    fn encode<T: Serialize>(call: usize, outcome: &Result<T>) -> serde_json::Result<Vec<u8>> {
        let entry = match outcome {
            Ok(out) => json!({ "call": call, "result": serde_json::to_value(out)? }),
            Err(err) => json!({ "call": call, "error": err.to_string() }),
        };
        serde_json::to_vec(&entry)
    }

    /// Parses a stored entry. Returns `None` for anything not written by
    /// [`HistoryRecorder`].
    pub fn decode(raw: &[u8]) -> Option<Self> {
        let Value::Object(mut entry) = serde_json::from_slice::<Value>(raw).ok()? else {
            return None;
        };
        let call = usize::try_from(entry.get("call")?.as_u64()?).ok()?;
        let outcome = match (entry.remove("result"), entry.remove("error")) {
            (Some(result), None) => CallOutcome::Returned(result.to_string()),
            (None, Some(Value::String(message))) => CallOutcome::Failed(message),
            _ => return None,
        };
        Some(Self { call, outcome })
    }
}

// == History Layer ==
/// Layer producing [`HistoryRecorder`] middleware.
#[derive(Clone)]
pub struct HistoryLayer {
    store: SharedStore,
    identity: OperationIdentity,
}

impl HistoryLayer {
    pub fn new(store: SharedStore, identity: OperationIdentity) -> Self {
        Self { store, identity }
    }
}

impl<S> Layer<S> for HistoryLayer {
    type Operation = HistoryRecorder<S>;

    fn layer(&self, inner: S) -> Self::Operation {
        HistoryRecorder {
            inner,
            store: self.store.clone(),
            inputs_key: self.identity.inputs_key(),
            outputs_key: self.identity.outputs_key(),
            identity: self.identity.clone(),
        }
    }
}

// == History Recorder ==
/// Records each call's arguments (as a JSON array) and its outcome.
///
/// The argument entry is appended before the inner operation runs and its
/// list index becomes the call's index. Exactly one [`OutputEntry`] tagged
/// with that index follows, for failed calls too. A failed output append is
/// logged and leaves only that call without a result.
pub struct HistoryRecorder<S> {
    inner: S,
    store: SharedStore,
    identity: OperationIdentity,
    inputs_key: String,
    outputs_key: String,
}

impl<S> HistoryRecorder<S> {
    fn append_output(&self, call: usize, entry: serde_json::Result<Vec<u8>>) {
        let appended = match entry {
            Ok(bytes) => self.store.rpush(&self.outputs_key, &bytes),
            Err(err) => Err(err.into()),
        };
        if let Err(err) = appended {
            warn!(operation = %self.identity, call, error = %err, "failed to record call output");
        }
    }
}

impl<S, In> Operation<In> for HistoryRecorder<S>
where
    S: Operation<In>,
    S::Out: Serialize,
    In: Serialize,
{
    type Out = S::Out;

    fn invoke(&self, input: In) -> Result<Self::Out> {
        // Nothing has run yet, so a failed append aborts the call cleanly
        let arguments = serde_json::to_vec(&input)?;
        let call = self
            .store
            .rpush(&self.inputs_key, &arguments)?
            .saturating_sub(1);

        let outcome = self.inner.invoke(input);
        self.append_output(call, OutputEntry::encode(call, &outcome));
        outcome
    }
}
