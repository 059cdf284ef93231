//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use event_registration::infra::{LocalBlobStore, SqliteRegistrationStore};
use event_registration::server::{build_router, AppState, Config};

pub const BOUNDARY: &str = "integration-test-boundary";

/// Router plus the upload directory backing it. The directory is removed on drop.
pub struct TestApp {
    pub router: axum::Router<()>,
    pub upload_dir: TempDir,
}

/// Full application over an in-memory SQLite store and a temporary upload dir.
pub async fn test_app() -> TestApp {
    let store = SqliteRegistrationStore::in_memory().await.unwrap();
    test_app_with_store(Arc::new(store)).await
}

/// Full application with a submission body limit of `max_upload_bytes`.
pub async fn test_app_with_upload_limit(max_upload_bytes: usize) -> TestApp {
    let store = SqliteRegistrationStore::in_memory().await.unwrap();
    build_test_app(Arc::new(store), |config| {
        config.max_upload_bytes = max_upload_bytes
    })
    .await
}

pub async fn test_app_with_store(
    registrations: Arc<dyn event_registration::RegistrationStore>,
) -> TestApp {
    build_test_app(registrations, |_| {}).await
}

async fn build_test_app(
    registrations: Arc<dyn event_registration::RegistrationStore>,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let blobs = LocalBlobStore::open(upload_dir.path()).await.unwrap();

    let mut config = Config::from_lookup(|_| None).unwrap();
    config.upload_dir = upload_dir.path().to_path_buf();
    configure(&mut config);

    let state = AppState {
        registrations,
        blobs: Arc::new(blobs),
    };
    let router = build_router(&config).unwrap().with_state(state);

    TestApp { router, upload_dir }
}

/// The six required fields with values unique to this call.
pub fn unique_fields() -> Vec<(String, String)> {
    let tag = &Uuid::new_v4().simple().to_string()[..8];
    vec![
        ("name".into(), "Asha Verma".into()),
        ("rollNumber".into(), format!("R-{tag}")),
        ("section".into(), "B".into()),
        ("department".into(), "CSE".into()),
        ("year".into(), "3".into()),
        ("transactionId".into(), format!("TXN-{tag}")),
    ]
}

/// Replace (or append) a field value.
pub fn with_field(mut fields: Vec<(String, String)>, name: &str, value: &str) -> Vec<(String, String)> {
    match fields.iter_mut().find(|(n, _)| n == name) {
        Some(entry) => entry.1 = value.to_string(),
        None => fields.push((name.to_string(), value.to_string())),
    }
    fields
}

pub fn without_field(fields: Vec<(String, String)>, name: &str) -> Vec<(String, String)> {
    fields.into_iter().filter(|(n, _)| n != name).collect()
}

/// Encode a multipart/form-data body using [`BOUNDARY`].
pub fn multipart_body(fields: &[(String, String)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"paymentProof\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a request and return the status with raw body bytes.
pub async fn send_raw(
    app: &axum::Router<()>,
    method: Method,
    uri: &str,
    content_type: Option<String>,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let (status, _, bytes) = send_full(app, method, uri, content_type, body).await;
    (status, bytes)
}

/// Send a request and return the status, response headers and body bytes.
pub async fn send_full(
    app: &axum::Router<()>,
    method: Method,
    uri: &str,
    content_type: Option<String>,
    body: Vec<u8>,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();

    (status, headers, bytes)
}

/// Send a request and decode the JSON response body.
pub async fn send_request(
    app: &axum::Router<()>,
    method: Method,
    uri: &str,
    content_type: Option<String>,
    body: Vec<u8>,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send_raw(app, method, uri, content_type, body).await;
    let json = if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes) }))
    };
    (status, json)
}

/// POST a submission to `/submit-registration`.
pub async fn submit(
    app: &axum::Router<()>,
    fields: &[(String, String)],
    file: Option<(&str, &[u8])>,
) -> (StatusCode, serde_json::Value) {
    send_request(
        app,
        Method::POST,
        "/submit-registration",
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
        multipart_body(fields, file),
    )
    .await
}

/// GET `/registrations`.
pub async fn list(app: &axum::Router<()>) -> (StatusCode, serde_json::Value) {
    send_request(app, Method::GET, "/registrations", None, Vec::new()).await
}
