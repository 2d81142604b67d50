//! Router-level tests for the extraction API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};

use doctext_server::cache::{CacheKey, ExtractionResponse};
use doctext_server::config::Config;
use doctext_server::error::ExtractionError;
use doctext_server::extraction::TextExtractor;
use doctext_server::routes;
use doctext_server::state::AppState;
use doctext_server::storage::MemoryStore;

/// Treats "%PDF <text>" as a one-page document containing <text>
#[derive(Default)]
struct FakePdf {
    calls: AtomicUsize,
}

impl TextExtractor for FakePdf {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.strip_prefix("%PDF "))
            .map(str::to_string)
            .ok_or_else(|| ExtractionError::Malformed("no PDF header".into()))
    }
}

struct Harness {
    server: TestServer,
    store: MemoryStore,
    extractor: Arc<FakePdf>,
}

fn harness() -> Harness {
    let config = Config::from_lookup(|name| match name {
        "STORAGE_BACKEND" => Some("memory".to_string()),
        "S3_BUCKET" => Some("library".to_string()),
        _ => None,
    })
    .unwrap();

    let store = MemoryStore::new("library");
    let extractor = Arc::new(FakePdf::default());
    let state = AppState::new(config, Arc::new(store.clone()), extractor.clone());
    let server = TestServer::new(routes::app(state)).unwrap();

    Harness {
        server,
        store,
        extractor,
    }
}

fn body(filename: &str, document: &[u8]) -> Value {
    json!({ "filename": filename, "file_content": BASE64.encode(document) })
}

#[tokio::test]
async fn first_request_extracts_second_is_cached() {
    let h = harness();
    let request = body("a.pdf", b"%PDF Hello");

    let first = h.server.post("/extract").json(&request).await;
    first.assert_status_ok();
    assert_eq!(
        first.json::<Value>(),
        json!({"filename": "a.pdf", "text": "Hello", "cached": false})
    );

    let second = h.server.post("/extract").json(&request).await;
    second.assert_status_ok();
    assert_eq!(
        second.json::<Value>(),
        json!({"filename": "a.pdf", "text": "Hello", "cached": true})
    );

    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.writes(), 1);
}

#[tokio::test]
async fn cached_entry_is_served_without_extraction() {
    let h = harness();
    h.store.insert(
        CacheKey::from_bytes(b"%PDF Original").object_key(),
        "previously extracted",
    );

    let response = h
        .server
        .post("/extract")
        .json(&body("b.pdf", b"%PDF Original"))
        .await;

    response.assert_status_ok();
    let response: ExtractionResponse = response.json();
    assert_eq!(response.text, "previously extracted");
    assert!(response.cached);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn different_documents_do_not_collide() {
    let h = harness();

    let a: ExtractionResponse = h
        .server
        .post("/extract")
        .json(&body("a.pdf", b"%PDF Hello"))
        .await
        .json();
    let b: ExtractionResponse = h
        .server
        .post("/extract")
        .json(&body("a.pdf", b"%PDF Hellp"))
        .await
        .json();

    assert_eq!(a.text, "Hello");
    assert_eq!(b.text, "Hellp");
    assert!(!a.cached);
    assert!(!b.cached);
    assert_eq!(h.store.len(), 2);
}

#[tokio::test]
async fn invalid_base64_is_a_client_error() {
    let h = harness();

    let response = h
        .server
        .post("/extract")
        .json(&json!({"filename": "a.pdf", "file_content": "***not base64***"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "input_error");
    assert_eq!(h.store.reads(), 0);
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn missing_field_is_a_client_error() {
    let h = harness();

    let response = h
        .server
        .post("/extract")
        .json(&json!({"filename": "a.pdf"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(h.store.reads(), 0);
}

#[tokio::test]
async fn malformed_event_json_is_a_client_error() {
    let h = harness();

    let response = h
        .server
        .post("/events/s3")
        .json(&json!({"Records": [{"s3": {"bucket": {"name": "library"}}}]}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "input_error");
    assert_eq!(h.store.reads(), 0);
}

#[tokio::test]
async fn s3_removal_event_is_skipped() {
    let h = harness();

    let response = h
        .server
        .post("/events/s3")
        .json(&json!({
            "Records": [{
                "eventName": "ObjectRemoved:Delete",
                "s3": {"bucket": {"name": "library"}, "object": {"key": "gone.pdf"}}
            }]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["skipped"], true);
    assert_eq!(h.store.reads(), 0);
}

#[tokio::test]
async fn malformed_document_is_unprocessable_and_not_cached() {
    let h = harness();

    let response = h
        .server
        .post("/extract")
        .json(&body("broken.pdf", b"random bytes"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"], "extraction_error");
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn lookup_failure_is_a_server_error_without_extraction() {
    let h = harness();
    h.store.fail_reads(true);

    let response = h
        .server
        .post("/extract")
        .json(&body("a.pdf", b"%PDF Hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "storage_error");
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn write_failure_fails_the_request() {
    let h = harness();
    h.store.fail_writes(true);

    let response = h
        .server
        .post("/extract")
        .json(&body("a.pdf", b"%PDF Hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn s3_event_ingests_uploaded_document() {
    let h = harness();
    h.store.insert("uploads/report.pdf", "%PDF Quarterly");

    let response = h
        .server
        .post("/events/s3")
        .json(&json!({
            "Records": [{
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": "library"},
                    "object": {"key": "uploads/report.pdf"}
                }
            }]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "source_key": "uploads/report.pdf",
            "output_key": "txt/uploads/report.txt",
            "characters": 9,
            "skipped": false
        })
    );
    assert_eq!(
        h.store.object("txt/uploads/report.txt"),
        Some(b"Quarterly".to_vec())
    );
}

#[tokio::test]
async fn s3_event_for_missing_object_is_not_found() {
    let h = harness();

    let response = h
        .server
        .post("/events/s3")
        .json(&json!({
            "Records": [{
                "s3": {"bucket": {"name": "library"}, "object": {"key": "nope.pdf"}}
            }]
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_service() {
    let h = harness();

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["service"], "doctext-server");
}
