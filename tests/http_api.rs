//! HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`; no socket
//! is bound.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tamperlog::http_server::{HttpServer, HttpServerConfig, INTERNAL_ERROR_MESSAGE};
use tamperlog::log::{MemoryStore, Record, RecordStore, StoreError, StoreResult};
use tamperlog::mac::{MacEngine, SecretKey, Tag, TAG_LEN};
use tamperlog::service::LogService;
use tamperlog::verify::{MSG_NO_VERIFIED, MSG_RECOVERED, MSG_VERIFIED};

// =============================================================================
// Test Utilities
// =============================================================================

const KEY: &[u8] = b"http-api-test-secret-key";

fn engine() -> MacEngine {
    MacEngine::new(SecretKey::new(KEY.to_vec()).unwrap()).unwrap()
}

fn app() -> (Router, Arc<MemoryStore>, Arc<LogService>) {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(LogService::new(engine(), store.clone()));
    let router = HttpServer::new(HttpServerConfig::default(), Arc::clone(&service)).router();
    (router, store, service)
}

/// Store whose every call fails with an error naming an on-disk location
struct FailingStore;

fn disk_error() -> StoreError {
    StoreError::read_failed(
        "Failed to read record file: /var/lib/tamperlog/log/records.dat",
        io::Error::other("device gone"),
    )
}

impl RecordStore for FailingStore {
    fn append(&self, _data: Vec<u8>, _tag: Tag, _timestamp: i64) -> StoreResult<Record> {
        Err(disk_error())
    }

    fn latest(&self) -> StoreResult<Option<Record>> {
        Err(disk_error())
    }

    fn all_by_timestamp_descending(&self) -> StoreResult<Vec<Record>> {
        Err(disk_error())
    }

    fn len(&self) -> StoreResult<usize> {
        Err(disk_error())
    }
}

fn failing_app() -> Router {
    let service = Arc::new(LogService::new(engine(), Arc::new(FailingStore)));
    HttpServer::new(HttpServerConfig::default(), service).router()
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Append and Verify
// =============================================================================

#[tokio::test]
async fn test_post_then_verify() {
    let (app, _, _) = app();

    let (status, body) = send(&app, post_json(r#"{"data":"Hello World!"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, json) = send_json(&app, get("/verify")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], MSG_VERIFIED);
    assert_eq!(json["data"], "Hello World!");
}

#[tokio::test]
async fn test_get_latest_returns_newest_record() {
    let (app, _, _) = app();

    send(&app, post_json(r#"{"data":"first"}"#)).await;
    send(&app, post_json(r#"{"data":"second"}"#)).await;

    let (status, json) = send_json(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], "second");
    assert_eq!(json["sequence"], 1);
    assert_eq!(json["tag"], engine().tag(b"second").to_hex());
}

#[tokio::test]
async fn test_get_latest_on_empty_store_is_null() {
    let (app, _, _) = app();

    let (status, json) = send_json(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_null());
}

#[tokio::test]
async fn test_verify_on_empty_store() {
    let (app, _, _) = app();

    let (status, json) = send_json(&app, get("/verify")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], MSG_NO_VERIFIED);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_verify_after_tampering() {
    let (app, store, _) = app();

    send(&app, post_json(r#"{"data":"trusted"}"#)).await;
    let latest_ts = store.latest().unwrap().unwrap().timestamp;
    store
        .append(
            b"tampered".to_vec(),
            Tag::from_bytes([0x11; TAG_LEN]),
            latest_ts + 1,
        )
        .unwrap();

    let (_, json) = send_json(&app, get("/verify")).await;
    assert_eq!(json["message"], MSG_RECOVERED);
    assert_eq!(json["data"], "trusted");

    // GET / does not verify
    let (_, json) = send_json(&app, get("/")).await;
    assert_eq!(json["data"], "tampered");
}

// =============================================================================
// Client-supplied Tags
// =============================================================================

#[tokio::test]
async fn test_client_tag_is_ignored() {
    let (app, store, _) = app();
    let bogus = "00".repeat(TAG_LEN);

    let body = format!(r#"{{"data":"payload","tag":"{}","hash":"{}"}}"#, bogus, bogus);
    let (status, _) = send(&app, post_json(&body)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = store.latest().unwrap().unwrap();
    assert_eq!(stored.tag, engine().tag(b"payload"));
    assert_ne!(stored.tag.to_hex(), bogus);

    let (_, json) = send_json(&app, get("/verify")).await;
    assert_eq!(json["message"], MSG_VERIFIED);
}

// =============================================================================
// Malformed Input
// =============================================================================

#[tokio::test]
async fn test_missing_data_is_rejected() {
    let (app, store, service) = app();

    let (status, json) = send_json(&app, post_json(r#"{"tag":"abc"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert!(json["error"].is_string());

    assert!(store.is_empty().unwrap());
    assert_eq!(service.metrics().snapshot().malformed_requests, 1);
}

#[tokio::test]
async fn test_non_string_data_is_rejected() {
    let (app, store, _) = app();

    let (status, _) = send(&app, post_json(r#"{"data":42}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let (app, store, _) = app();

    let (status, _) = send(&app, post_json("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let (app, store, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::from(r#"{"data":"x"}"#))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(LogService::new(engine(), store.clone()));
    let config = HttpServerConfig {
        max_body_bytes: 32,
        ..Default::default()
    };
    let app = HttpServer::new(config, Arc::clone(&service)).router();

    let body = format!(r#"{{"data":"{}"}}"#, "x".repeat(256));
    let (status, _) = send(&app, post_json(&body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    assert!(store.is_empty().unwrap());
    assert_eq!(service.metrics().snapshot().malformed_requests, 0);
}

// =============================================================================
// Store Failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_hides_details() {
    let app = failing_app();

    for request in [get("/verify"), get("/"), post_json(r#"{"data":"x"}"#)] {
        let (status, json) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(json["code"], 500);

        let text = json.to_string();
        assert!(!text.contains("records.dat"));
        assert!(!text.contains("TLOG_STORE"));
    }
}

// =============================================================================
// Demo Seed
// =============================================================================

#[tokio::test]
async fn test_demo_seed_reports_recovery() {
    let (app, _, service) = app();
    assert!(service.seed_demo().unwrap());

    let (_, json) = send_json(&app, get("/verify")).await;
    assert_eq!(json["message"], MSG_RECOVERED);
    assert_eq!(json["data"], "Hello World!");

    let (_, json) = send_json(&app, get("/")).await;
    assert_eq!(json["data"], "This is bad data!");
}

// =============================================================================
// Health and Metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _, _) = app();

    let (status, json) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let (app, _, _) = app();

    send(&app, post_json(r#"{"data":"a"}"#)).await;
    send(&app, get("/verify")).await;

    let (status, json) = send_json(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["appends"], 1);
    assert_eq!(json["verifications"], 1);
    assert_eq!(json["verified"], 1);
}
