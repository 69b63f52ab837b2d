//! API Module
//!
//! HTTP handlers and routing exposing the cache over REST.
//!
//! # Endpoints
//! - `PUT /store` - Store a scalar under a generated key
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /replay/:identity` - Replay an operation's call history
//! - `GET /page?url=` - Fetch a page through the page cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
