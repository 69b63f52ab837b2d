//! Replay Module
//!
//! Rebuilds a readable call transcript from the history lists written by
//! [`HistoryRecorder`](crate::instrument::HistoryRecorder).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{decode_int, decode_str};
use crate::error::Result;
use crate::instrument::{CallOutcome, OperationIdentity, OutputEntry};
use crate::store::SharedStore;

// == Call Record ==
/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    /// Serialized argument tuple
    pub arguments: String,
    /// Serialized return value of a successful call
    pub result: Option<String>,
    /// Error message of a failed call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallRecord {
    fn new(arguments: String, outcome: Option<CallOutcome>) -> Self {
        let (result, error) = match outcome {
            Some(CallOutcome::Returned(result)) => (Some(result), None),
            Some(CallOutcome::Failed(message)) => (None, Some(message)),
            None => (None, None),
        };
        Self {
            arguments,
            result,
            error,
        }
    }

    fn describe_outcome(&self) -> String {
        match (&self.result, &self.error) {
            (Some(result), _) => result.clone(),
            (None, Some(message)) => format!("<error: {}>", message),
            (None, None) => "<no result>".to_string(),
        }
    }
}

// == Replay ==
/// Ordered call history of one operation.
///
/// Results render as JSON. Failed calls render as `<error: message>` and
/// calls whose output was never recorded as `<no result>`, so neither can be
/// mistaken for a returned value.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub identity: OperationIdentity,
    pub calls: Vec<CallRecord>,
}

impl Replay {
    /// Number of recorded calls, i.e. the number of input entries.
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Transcript lines, one per call, in call order.
    pub fn lines(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|call| {
                format!(
                    "{}({}) -> {}",
                    self.identity,
                    call.arguments,
                    call.describe_outcome()
                )
            })
            .collect()
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.call_count();
        write!(
            f,
            "{} was called {} {}:",
            self.identity,
            count,
            if count == 1 { "time" } else { "times" }
        )?;
        for line in self.lines() {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

// == Replay Reporter ==
/// Reads history lists back out of the store.
pub struct ReplayReporter {
    store: SharedStore,
}

impl ReplayReporter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Pairs every input of `identity` with the output tagged with its index.
    ///
    /// Calls are listed in the order they started. An identity that was never
    /// invoked yields an empty replay.
    pub fn replay(&self, identity: &OperationIdentity) -> Result<Replay> {
        let inputs = self.store.lrange(&identity.inputs_key(), 0, -1)?;
        let outputs = self.store.lrange(&identity.outputs_key(), 0, -1)?;

        let mut outcomes = HashMap::with_capacity(outputs.len());
        for raw in outputs {
            match OutputEntry::decode(&raw) {
                Some(entry) => {
                    outcomes.insert(entry.call, entry.outcome);
                }
                None => warn!(operation = %identity, "skipping unreadable history output"),
            }
        }

        let calls = inputs
            .into_iter()
            .enumerate()
            .map(|(call, arguments)| {
                Ok(CallRecord::new(decode_str(arguments)?, outcomes.remove(&call)))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(operation = %identity, calls = calls.len(), "replayed call history");
        Ok(Replay {
            identity: identity.clone(),
            calls,
        })
    }

    /// Raw value of the call counter, 0 if it was never incremented.
    ///
    /// This can exceed [`Replay::call_count`] when a call was counted but its
    /// arguments could not be recorded.
    pub fn call_count(&self, identity: &OperationIdentity) -> Result<i64> {
        Ok(self
            .store
            .get(identity.counter_key())?
            .map(decode_int)
            .transpose()?
            .unwrap_or(0))
    }
}
