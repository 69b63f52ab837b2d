//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::Scalar;

/// Request body for the STORE operation (PUT /store)
///
/// # Fields
/// - `data`: JSON string or number to store under a generated key
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    pub data: Value,
}

impl StoreRequest {
    /// Converts the JSON payload into a storable scalar.
    ///
    /// Returns an error message for anything that is not a string or number.
    pub fn to_scalar(&self) -> Result<Scalar, String> {
        match &self.data {
            Value::String(text) => Ok(Scalar::Text(text.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float))
                .ok_or_else(|| format!("Unsupported number: {}", n)),
            other => Err(format!("Data must be a string or number, got {}", other)),
        }
    }
}

/// How GET /get/:key decodes the stored bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeAs {
    /// Raw bytes, returned as an array of byte values
    Raw,
    #[default]
    Str,
    Int,
    Float,
}

/// Query string for GET /get/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    #[serde(default, rename = "as")]
    pub decode: DecodeAs,
}

/// Query string for GET /page
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub url: String,
}

impl PageQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Some("url must start with http:// or https://".to_string());
        }
        None
    }
}
