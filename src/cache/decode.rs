//! Decoders for raw stored bytes.
//!
//! Each decoder is strict: malformed input is a [`CacheError::Decode`], never a partial value.

use crate::error::{CacheError, Result};

/// Decodes UTF-8 text.
pub fn decode_str(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| CacheError::Decode(format!("invalid UTF-8: {}", e)))
}

/// Decodes a base-10 signed integer.
pub fn decode_int(raw: Vec<u8>) -> Result<i64> {
    let text = decode_str(raw)?;
    text.parse::<i64>()
        .map_err(|e| CacheError::Decode(format!("{:?} is not an integer: {}", text, e)))
}

/// Decodes a floating-point number.
pub fn decode_float(raw: Vec<u8>) -> Result<f64> {
    let text = decode_str(raw)?;
    text.parse::<f64>()
        .map_err(|e| CacheError::Decode(format!("{:?} is not a float: {}", text, e)))
}
