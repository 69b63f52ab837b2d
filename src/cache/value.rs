//! Scalar Value Module
//!
//! The payload types a [`Cache`](crate::cache::Cache) accepts and how they are encoded to bytes.

use serde::{Serialize, Serializer};

// == Scalar ==
/// A value the cache can store under a generated key.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl Scalar {
    // == Encode ==
    /// Encodes the value the way it is written to the store.
    ///
    /// Integers and floats are stored as decimal text; floats always carry a
    /// fractional part (`1.0`, not `1`).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Scalar::Text(text) => text.as_bytes().to_vec(),
            Scalar::Bytes(bytes) => bytes.clone(),
            Scalar::Int(n) => n.to_string().into_bytes(),
            Scalar::Float(f) => format!("{:?}", f).into_bytes(),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(text) => serializer.serialize_str(text),
            Scalar::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => bytes.serialize(serializer),
            },
            Scalar::Int(n) => serializer.serialize_i64(*n),
            Scalar::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        Scalar::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(value: Vec<u8>) -> Self {
        Scalar::Bytes(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}
