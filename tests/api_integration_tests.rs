//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use call_cache::api::create_router;
use call_cache::instrument::Execute;
use call_cache::page::PageFetcher;
use call_cache::{AppState, CacheError, MemoryStore};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<AtomicUsize>) {
    let upstream_calls = Arc::new(AtomicUsize::new(0));
    let calls = upstream_calls.clone();
    let fetcher: PageFetcher = Arc::new(Execute::new(move |url: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            Err(CacheError::UpstreamFetch(format!("{} returned 500", url)))
        } else {
            Ok(format!("<html>{}</html>", url))
        }
    }));
    let state = AppState::new(Arc::new(MemoryStore::new()), fetcher, 10);
    (create_router(state), upstream_calls)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn store_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/store")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == STORE / GET Endpoint Tests ==

#[tokio::test]
async fn test_store_then_get_text() {
    let (app, _) = create_test_app();

    let (status, stored) = send(&app, store_request(r#"{"data":"hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let key = stored["key"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get_request(&format!("/get/{}", key))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"].as_str().unwrap(), key);
    assert_eq!(json["value"].as_str().unwrap(), "hello");
}

#[tokio::test]
async fn test_store_then_get_int_and_raw() {
    let (app, _) = create_test_app();

    let (_, stored) = send(&app, store_request(r#"{"data":42}"#)).await;
    let key = stored["key"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get_request(&format!("/get/{}?as=int", key))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"].as_i64().unwrap(), 42);

    let (status, json) = send(&app, get_request(&format!("/get/{}?as=raw", key))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], serde_json::json!([52, 50]));
}

#[tokio::test]
async fn test_get_int_of_text_is_decode_error() {
    let (app, _) = create_test_app();

    let (_, stored) = send(&app, store_request(r#"{"data":"forty-two"}"#)).await;
    let key = stored["key"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get_request(&format!("/get/{}?as=int", key))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Decode error"));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, get_request("/get/nonexistent_key")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_store_rejects_non_scalar() {
    let (app, _) = create_test_app();

    let (status, _) = send(&app, store_request(r#"{"data":{"nested":true}}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == REPLAY Endpoint Tests ==

#[tokio::test]
async fn test_replay_after_two_stores() {
    let (app, _) = create_test_app();

    let (_, first) = send(&app, store_request(r#"{"data":"hello"}"#)).await;
    let (_, second) = send(&app, store_request(r#"{"data":"world"}"#)).await;
    let key1 = first["key"].as_str().unwrap();
    let key2 = second["key"].as_str().unwrap();
    assert_ne!(key1, key2);

    let (status, json) = send(&app, get_request("/replay/Cache.store")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["call_count"].as_u64().unwrap(), 2);
    assert_eq!(json["counter"].as_i64().unwrap(), 2);
    assert_eq!(json["calls"][0]["arguments"].as_str().unwrap(), r#"["hello"]"#);
    assert_eq!(
        json["calls"][1]["result"].as_str().unwrap(),
        format!("\"{}\"", key2)
    );
    assert!(json["transcript"]
        .as_str()
        .unwrap()
        .starts_with("Cache.store was called 2 times:"));
}

#[tokio::test]
async fn test_replay_unknown_operation_is_empty() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, get_request("/replay/Unknown.op")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["call_count"].as_u64().unwrap(), 0);
    assert_eq!(json["counter"].as_i64().unwrap(), 0);
    assert!(json["calls"].as_array().unwrap().is_empty());
}

// == PAGE Endpoint Tests ==

#[tokio::test]
async fn test_page_is_cached_and_counted() {
    let (app, upstream_calls) = create_test_app();

    let (status, first) = send(&app, get_request("/page?url=http://x")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["content"].as_str().unwrap(), "<html>http://x</html>");
    assert_eq!(first["access_count"].as_i64().unwrap(), 1);

    let (_, second) = send(&app, get_request("/page?url=http://x")).await;
    assert_eq!(second["access_count"].as_i64().unwrap(), 2);
    assert_eq!(upstream_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_page_upstream_failure() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, get_request("/page?url=http://broken")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("Upstream fetch failed"));
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
