//! Cache Module
//!
//! Scalar storage under generated keys with typed retrieval.

mod client;
mod decode;
mod value;


// Re-export public types
pub use client::{Cache, StoreValue};
pub use decode::{decode_float, decode_int, decode_str};
pub use value::Scalar;
