//! HTTP Fetcher
//!
//! Blocking URL fetcher driven on an existing tokio runtime.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::instrument::Operation;

// == Http Fetcher ==
/// Fetches a URL body as text.
///
/// Requests run on `runtime` and the calling thread blocks until they
/// finish, so `invoke` must be called from outside async code, e.g. from
/// `spawn_blocking`. Non-2xx responses are errors.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    runtime: Handle,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, runtime: Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, runtime })
    }
}

fn upstream(err: reqwest::Error) -> CacheError {
    CacheError::UpstreamFetch(err.to_string())
}

impl Operation<String> for HttpFetcher {
    type Out = String;

    fn invoke(&self, url: String) -> Result<String> {
        self.runtime.block_on(async {
            let response = self.client.get(&url).send().await.map_err(upstream)?;
            let status = response.status();
            let body = response
                .error_for_status()
                .map_err(upstream)?
                .text()
                .await
                .map_err(upstream)?;
            debug!(url = %url, status = %status, bytes = body.len(), "fetched page");
            Ok::<_, CacheError>(body)
        })
    }
}
