//! HTTP API tests
//!
//! Router tests go through `tower::ServiceExt::oneshot`; the last test binds
//! a real listener and talks to it with reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use ouroboros_counter::{
    CounterError, CounterService, CounterStore, InMemoryCounterStore, KeyPolicy,
};
use ouroboros_counter_server::build_router;
use serde_json::Value;
use tower::ServiceExt;

const TIMEOUT: Duration = Duration::from_secs(15);

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn app_with(policy: KeyPolicy) -> (Router, InMemoryCounterStore) {
    let store = InMemoryCounterStore::new();
    let service = CounterService::with_key_policy(Arc::new(store.clone()), policy);
    (build_router(service, TIMEOUT), store)
}

fn app() -> (Router, InMemoryCounterStore) {
    app_with(KeyPolicy::Lenient)
}

async fn send(app: &Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

fn assert_counter(json: &Value, key: &str, value: i64) {
    assert_eq!(json["Key"], key);
    assert_eq!(json["Value"], value);
    let ts = json["ActionTimestamp"].as_str().unwrap();
    assert!(ts.ends_with('Z'), "timestamp not in UTC: {}", ts);
    assert_eq!(ts.len(), "2024-03-09T14:05:07Z".len());
}

#[tokio::test]
async fn test_create_returns_new_counter() {
    let (app, _) = app();

    let response = send(&app, Method::POST, "/api/v1/storage").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    let json = response.json();
    let key = json["Key"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&key).is_ok());
    assert_counter(&json, &key, 1);
}

#[tokio::test]
async fn test_increment_routes() {
    let (app, _) = app();
    let key = uuid::Uuid::new_v4().to_string();

    let first = send(&app, Method::PUT, &format!("/api/v1/storage/{}", key)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_counter(&first.json(), &key, 1);

    let second = send(&app, Method::PUT, &format!("/api/v1/storage/{}/increment", key)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_counter(&second.json(), &key, 2);
}

#[tokio::test]
async fn test_malformed_key_is_replaced() {
    let (app, store) = app();

    let response = send(&app, Method::PUT, "/api/v1/storage/not-a-uuid").await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    let key = json["Key"].as_str().unwrap();
    assert_ne!(key, "not-a-uuid");
    assert!(uuid::Uuid::parse_str(key).is_ok());
    assert_eq!(json["Value"], 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_malformed_key_rejected_in_strict_mode() {
    let (app, store) = app_with(KeyPolicy::Strict);

    let response = send(&app, Method::PUT, "/api/v1/storage/not-a-uuid/increment").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let json = response.json();
    assert!(json["ErrorMessage"]
        .as_str()
        .unwrap()
        .starts_with("Invalid key: not-a-uuid"));
    assert!(json["TransactionTs"].as_str().unwrap().ends_with('Z'));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_decrement_existing_counter() {
    let (app, store) = app();
    let key = uuid::Uuid::new_v4().to_string();
    store.set_raw(key.clone(), "0");

    let response = send(&app, Method::PUT, &format!("/api/v1/storage/{}/decrement", key)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_counter(&response.json(), &key, -1);
}

#[tokio::test]
async fn test_decrement_absent_counter_fails() {
    let (app, store) = app();

    let response = send(&app, Method::PUT, "/api/v1/storage/missing/decrement").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["ErrorMessage"], "Key not found: missing");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_check_counter() {
    let (app, store) = app();
    let key = uuid::Uuid::new_v4().to_string();
    store.set_raw(key.clone(), "42");

    let response = send(&app, Method::GET, &format!("/api/v1/storage/{}", key)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_counter(&response.json(), &key, 42);
}

#[tokio::test]
async fn test_check_absent_and_corrupt_values() {
    let (app, store) = app();
    store.set_raw("corrupt", "forty-two");

    let missing = send(&app, Method::GET, "/api/v1/storage/missing").await;
    assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(missing.json()["ErrorMessage"], "Key not found: missing");

    let corrupt = send(&app, Method::GET, "/api/v1/storage/corrupt").await;
    assert_eq!(corrupt.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(corrupt.json()["ErrorMessage"]
        .as_str()
        .unwrap()
        .starts_with("Parse error"));
}

#[tokio::test]
async fn test_delete_counter() {
    let (app, store) = app();
    let key = uuid::Uuid::new_v4().to_string();
    store.set_raw(key.clone(), "3");
    let uri = format!("/api/v1/storage/{}", key);

    let deleted = send(&app, Method::DELETE, &uri).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), Value::Bool(true));

    let again = send(&app, Method::DELETE, &uri).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert!(again.body.is_empty());
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();

    let response = send(&app, Method::GET, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

/// Store that rejects every call
struct Down;

#[async_trait]
impl CounterStore for Down {
    async fn increment(&self, _key: &str) -> Result<i64, CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }

    async fn decrement(&self, _key: &str) -> Result<i64, CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }

    async fn exists(&self, _key: &str) -> Result<bool, CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }

    async fn health_check(&self) -> Result<(), CounterError> {
        Err(CounterError::Store("connection refused".into()))
    }
}

#[tokio::test]
async fn test_store_failures() {
    let app = build_router(CounterService::new(Arc::new(Down)), TIMEOUT);

    let create = send(&app, Method::POST, "/api/v1/storage").await;
    assert_eq!(create.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(create.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        create.json()["ErrorMessage"],
        "Store error: connection refused"
    );

    let delete = send(&app, Method::DELETE, "/api/v1/storage/k").await;
    assert_eq!(delete.status, StatusCode::INTERNAL_SERVER_ERROR);

    let health = send(&app, Method::GET, "/health").await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(health.json()["ErrorMessage"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

/// Store whose increment takes longer than the request deadline
struct Slow {
    inner: InMemoryCounterStore,
    delay: Duration,
}

#[async_trait]
impl CounterStore for Slow {
    async fn increment(&self, key: &str) -> Result<i64, CounterError> {
        tokio::time::sleep(self.delay).await;
        self.inner.increment(key).await
    }

    async fn decrement(&self, key: &str) -> Result<i64, CounterError> {
        self.inner.decrement(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CounterError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CounterError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CounterError> {
        self.inner.exists(key).await
    }

    async fn health_check(&self) -> Result<(), CounterError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_request_deadline_returns_error_body() {
    let store = Slow {
        inner: InMemoryCounterStore::new(),
        delay: Duration::from_millis(300),
    };
    let app = build_router(
        CounterService::new(Arc::new(store)),
        Duration::from_millis(50),
    );

    let response = send(&app, Method::POST, "/api/v1/storage").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    let json = response.json();
    assert!(json["ErrorMessage"]
        .as_str()
        .unwrap()
        .starts_with("Request timed out after"));
    assert!(json["TransactionTs"].as_str().unwrap().ends_with('Z'));

    // Requests that finish in time are untouched
    let key = uuid::Uuid::new_v4().to_string();
    let check = send(&app, Method::GET, &format!("/api/v1/storage/{}", key)).await;
    assert_eq!(check.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(check.json()["ErrorMessage"], format!("Key not found: {}", key));
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let (app, _) = app();

    let unknown = send(&app, Method::GET, "/api/v2/storage").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let wrong_method = send(&app, Method::POST, "/api/v1/storage/abc").await;
    assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let (app, _) = app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}/api/v1", addr);

    let created: Value = client
        .post(format!("{}/storage", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["Key"].as_str().unwrap().to_string();
    assert_eq!(created["Value"], 1);

    let decremented = client
        .put(format!("{}/storage/{}/decrement", base, key))
        .send()
        .await
        .unwrap();
    assert_eq!(decremented.status(), reqwest::StatusCode::OK);
    let decremented: Value = decremented.json().await.unwrap();
    assert_eq!(decremented["Value"], 0);

    let checked = client
        .get(format!("{}/storage/{}", base, key))
        .send()
        .await
        .unwrap();
    assert_eq!(
        checked.headers()[reqwest::header::CONTENT_TYPE],
        "application/json"
    );
    let checked: Value = checked.json().await.unwrap();
    assert_eq!(checked["Key"], key);
    assert_eq!(checked["Value"], 0);

    server.abort();
}
