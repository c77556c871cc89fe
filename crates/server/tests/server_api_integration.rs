//! Integration tests for server API endpoints
//!
//! These drive the full router (auth middleware, handlers, fallback) in
//! process against an in-memory record store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rolodex::{
    InMemoryStore, NewRecord, Record, RecordId, RecordStore, StoreError, TokenConfig,
    TokenService,
};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

/// Wraps the in-memory store and counts every call that reaches it.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        self.hit();
        self.inner.insert(record).await
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.hit();
        self.inner.list_all().await
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn update_by_id(&self, record: &Record) -> Result<(), StoreError> {
        self.hit();
        self.inner.update_by_id(record).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// A store whose every operation fails.
struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn insert(&self, _: NewRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Decode("field `name` missing".into()))
    }

    async fn delete_by_id(&self, _: &RecordId) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    async fn update_by_id(&self, _: &Record) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

struct TestApp {
    router: Router,
    store: Arc<CountingStore>,
}

fn test_app() -> TestApp {
    let store = Arc::new(CountingStore::default());
    let state = ServerState::with_store(ServerConfig::default(), store.clone());
    TestApp {
        router: build_router(Arc::new(state)),
        store,
    }
}

fn app_with_store(store: Arc<dyn RecordStore>) -> Router {
    build_router(Arc::new(ServerState::with_store(
        ServerConfig::default(),
        store,
    )))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn fetch_token(router: &Router) -> String {
    let (status, body) = send(router, request(Method::GET, "/token", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_token_endpoint_is_public() {
    let app = test_app();
    let (status, body) = send(&app.router, request(Method::GET, "/token", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], json!(false));
    assert_eq!(body["message"], json!("success"));
    assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_issued_token_carries_demo_identity() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let claims = TokenService::new(TokenConfig::default())
        .validate(&token)
        .unwrap();
    assert_eq!(claims.email, "goguru@gmail.com");
    assert_eq!(claims.iss, "admin");
    assert_eq!(claims.exp - claims.iat, 48 * 3600);
}

#[tokio::test]
async fn test_list_is_public_and_empty_initially() {
    let app = test_app();
    let (status, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": [] }));
}

#[tokio::test]
async fn test_create_then_list_round_trip() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some(bearer(&token).as_str()),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": { "id": "", "name": "Ana", "email": "ana@x.com" } })
    );

    let (status, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let records = body["message"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], json!("Ana"));
    assert_eq!(records[0]["email"], json!("ana@x.com"));
    let id = records[0]["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.parse::<RecordId>().is_ok());
}

#[tokio::test]
async fn test_create_ignores_client_supplied_id() {
    let app = test_app();
    let token = fetch_token(&app.router).await;
    let chosen = RecordId::generate().to_hex();

    let (status, body) = send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some(bearer(&token).as_str()),
            Some(json!({ "id": chosen, "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["id"], json!(chosen));

    let (_, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    assert_ne!(body["message"][0]["id"], json!(chosen));
}

#[tokio::test]
async fn test_update_changes_fields_only() {
    let app = test_app();
    let token = fetch_token(&app.router).await;
    let auth = bearer(&token);

    send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some(auth.as_str()),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;
    let (_, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    let id = body["message"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        request(
            Method::PUT,
            "/data",
            Some(auth.as_str()),
            Some(json!({ "id": id, "name": "Ana Maria", "email": "am@x.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "updated success" }));

    let (_, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    assert_eq!(
        body,
        json!({ "message": [{ "id": id, "name": "Ana Maria", "email": "am@x.com" }] })
    );
}

#[tokio::test]
async fn test_update_unknown_id_succeeds() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        request(
            Method::PUT,
            "/data",
            Some(bearer(&token).as_str()),
            Some(json!({ "id": RecordId::generate().to_hex(), "name": "x", "email": "y" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("updated success"));
}

#[tokio::test]
async fn test_delete_removes_record() {
    let app = test_app();
    let token = fetch_token(&app.router).await;
    let auth = bearer(&token);

    send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some(auth.as_str()),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;
    let (_, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    let id = body["message"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        request(Method::DELETE, &format!("/data?id={id}"), Some(auth.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "deleted success" }));

    let (_, body) = send(&app.router, request(Method::GET, "/data1", None, None)).await;
    assert_eq!(body, json!({ "message": [] }));
}

#[tokio::test]
async fn test_delete_nonexistent_id_twice() {
    let app = test_app();
    let token = fetch_token(&app.router).await;
    let uri = format!("/data?id={}", RecordId::generate());

    for _ in 0..2 {
        let (status, body) = send(
            &app.router,
            request(Method::DELETE, &uri, Some(bearer(&token).as_str()), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("deleted success"));
    }
}

#[tokio::test]
async fn test_guarded_routes_reject_missing_header_before_store() {
    let app = test_app();
    let id = RecordId::generate().to_hex();

    let attempts = [
        request(
            Method::POST,
            "/data",
            None,
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
        request(Method::DELETE, &format!("/data?id={id}"), None, None),
        request(
            Method::PUT,
            "/data",
            None,
            Some(json!({ "id": id, "name": "Ana", "email": "ana@x.com" })),
        ),
    ];

    for attempt in attempts {
        let (status, body) = send(&app.router, attempt).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!("No Authorization header provided"));
    }
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_header_without_bearer_prefix_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some("sometoken"),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Incorrect Format of Authorization Token"));
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some("Bearer not.a.token"),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_string());
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_token_from_other_secret_is_unauthorized() {
    let app = test_app();
    let foreign = TokenService::new(TokenConfig {
        secret: "someone-else".into(),
        ..TokenConfig::default()
    })
    .issue("eve@x.com")
    .unwrap();

    let (status, _) = send(
        &app.router,
        request(
            Method::DELETE,
            &format!("/data?id={}", RecordId::generate()),
            Some(bearer(&foreign).as_str()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = test_app();
    let issued = chrono::Utc::now() - chrono::Duration::hours(49);
    let stale = TokenService::new(TokenConfig::default())
        .issue_at("goguru@gmail.com", issued)
        .unwrap();

    let (status, body) = send(
        &app.router,
        request(
            Method::PUT,
            "/data",
            Some(bearer(&stale).as_str()),
            Some(json!({ "id": RecordId::generate().to_hex(), "name": "a", "email": "b" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!("token is expired"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let bad = Request::builder()
        .method(Method::POST)
        .uri("/data")
        .header(AUTHORIZATION, bearer(&token))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(&app.router, bad).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        request(
            Method::POST,
            "/data",
            Some(bearer(&token).as_str()),
            Some(json!({ "name": "Ana" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = test_app();
    let token = fetch_token(&app.router).await;
    let auth = bearer(&token);

    let (status, body) = send(
        &app.router,
        request(Method::DELETE, "/data?id=zzz", Some(auth.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("zzz"));

    let (status, _) = send(&app.router, request(Method::DELETE, "/data", Some(auth.as_str()), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        request(
            Method::PUT,
            "/data",
            Some(auth.as_str()),
            Some(json!({ "id": "12345", "name": "a", "email": "b" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_store_failures_become_server_errors() {
    let router = app_with_store(Arc::new(BrokenStore));

    let (status, body) = send(&router, request(Method::GET, "/data1", None, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("STORE_ERROR"));

    let token = fetch_token(&router).await;
    let (status, _) = send(
        &router,
        request(
            Method::POST,
            "/data",
            Some(bearer(&token).as_str()),
            Some(json!({ "name": "Ana", "email": "ana@x.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unmatched_route_requires_token() {
    let app = test_app();

    let (status, body) = send(&app.router, request(Method::GET, "/nowhere", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!("No Authorization header provided"));

    let (status, _) = send(
        &app.router,
        request(Method::POST, "/nowhere", Some("sometoken"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        request(Method::GET, "/nowhere", Some("Bearer not.a.token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unmatched_route_redirects_to_docs_with_token() {
    let app = test_app();
    let token = fetch_token(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::GET,
            "/nowhere",
            Some(bearer(&token).as_str()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/swagger/index.html"
    );
}

#[tokio::test]
async fn test_swagger_ui_is_public() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        request(Method::GET, "/swagger/index.html", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_method_on_data_requires_token() {
    let app = test_app();
    for method in [Method::GET, Method::PATCH] {
        let (status, _) = send(&app.router, request(method, "/data", None, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_overflowing_token_lifetime_is_server_error() {
    let mut config = ServerConfig::default();
    config.auth.lifetime_hours = u32::MAX;
    let state = ServerState::with_store(config, Arc::new(InMemoryStore::new()));
    let router = build_router(Arc::new(state));

    let (status, body) = send(&router, request(Method::GET, "/token", None, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("TOKEN_ERROR"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        request(Method::GET, "/api-docs/openapi.json", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/data"].is_object());
    assert!(body["paths"]["/token"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/data1")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}
