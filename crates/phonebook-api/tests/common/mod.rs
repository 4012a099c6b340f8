#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use phonebook_api::{build_router, AppState};
use phonebook_core::{ContactStore, MemoryContactStore};
use phonebook_engine::{ContactService, ResponseCache, ServiceMetrics};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory store
pub fn app() -> Router {
    let store: Arc<dyn ContactStore> = Arc::new(MemoryContactStore::new());
    let service = ContactService::new(
        store,
        ResponseCache::default(),
        Arc::new(ServiceMetrics::new()),
    );
    build_router(AppState::shared(service))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Send one request; an empty response body comes back as `Value::Null`
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    into_test_response(app.clone().oneshot(request).await.unwrap()).await
}

pub async fn into_test_response(response: axum::response::Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

/// POST a contact and return the created record
pub async fn create(app: &Router, contact: Value) -> Value {
    let res = send(app, Method::POST, "/api/contacts", Some(contact)).await;
    assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
    res.body
}
