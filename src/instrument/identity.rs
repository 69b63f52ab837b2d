//! Operation identity and the store keys derived from it.

use std::fmt;

use serde::Serialize;

// == Operation Identity ==
/// Stable name of an instrumented operation, such as `Cache.store`.
///
/// The identity is the counter key and the prefix of both history lists, so
/// it must not change between process runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OperationIdentity(String);

impl OperationIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds `<owner>.<method>`.
    pub fn qualified(owner: &str, method: &str) -> Self {
        Self(format!("{}.{}", owner, method))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the call counter.
    pub fn counter_key(&self) -> &str {
        &self.0
    }

    /// Key of the serialized-arguments list.
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.0)
    }

    /// Key of the serialized-results list.
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.0)
    }
}

impl fmt::Display for OperationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
