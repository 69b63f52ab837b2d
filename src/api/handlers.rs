//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! The cache core is blocking, so every handler hands its store work to
//! `spawn_blocking`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::instrument::{Layer, OperationIdentity};
use crate::models::{
    DecodeAs, GetQuery, GetResponse, HealthResponse, PageQuery, PageResponse, ReplayResponse,
    StoreRequest, StoreResponse,
};
use crate::page::{PageCache, PageCacheLayer, PageFetcher};
use crate::replay::ReplayReporter;
use crate::store::SharedStore;

/// Application state shared across all handlers.
///
/// Every component holds the same store handle.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
    pub pages: Arc<PageCache<PageFetcher>>,
    pub replay: Arc<ReplayReporter>,
}

impl AppState {
    /// Wires every component to `store`.
    pub fn new(store: SharedStore, fetcher: PageFetcher, page_ttl: u64) -> Self {
        Self {
            cache: Arc::new(Cache::new(store.clone())),
            pages: Arc::new(PageCacheLayer::new(store.clone(), page_ttl).layer(fetcher)),
            replay: Arc::new(ReplayReporter::new(store)),
        }
    }
}

/// Runs blocking cache work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CacheError::Internal(format!("blocking task failed: {}", e)))?
}

/// Handler for PUT /store
///
/// Stores a scalar under a generated key.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    let data = req.to_scalar().map_err(CacheError::InvalidRequest)?;

    let cache = state.cache.clone();
    let key = blocking(move || cache.store(data)).await?;

    Ok(Json(StoreResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value by key, decoded according to `?as=`.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let cache = state.cache.clone();
    let lookup = key.clone();
    let value = blocking(move || {
        let value = match query.decode {
            DecodeAs::Raw => cache.get(&lookup)?.map(Value::from),
            DecodeAs::Str => cache.get_str(&lookup)?.map(Value::from),
            DecodeAs::Int => cache.get_int(&lookup)?.map(Value::from),
            DecodeAs::Float => cache.get_float(&lookup)?.map(Value::from),
        };
        Ok(value)
    })
    .await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /replay/:identity
///
/// Returns the recorded call history of an instrumented operation.
pub async fn replay_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<ReplayResponse>> {
    let reporter = state.replay.clone();
    let identity = OperationIdentity::new(identity);
    let response = blocking(move || {
        let replay = reporter.replay(&identity)?;
        let counter = reporter.call_count(&identity)?;
        Ok(ReplayResponse::new(replay, counter))
    })
    .await?;

    Ok(Json(response))
}

/// Handler for GET /page?url=
///
/// Returns the page content, served from cache while fresh.
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let pages = state.pages.clone();
    let response = blocking(move || {
        let content = pages.fetch(&query.url)?;
        let access_count = pages.access_count(&query.url)?;
        Ok(PageResponse {
            url: query.url,
            content,
            access_count,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
