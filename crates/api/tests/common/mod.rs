#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use itemgrid_db::MemoryItemStore;
use itemgrid_events::EventBus;
use tower::ServiceExt;

use itemgrid_api::config::ServerConfig;
use itemgrid_api::router::build_app_router;
use itemgrid_api::service::ItemService;
use itemgrid_api::state::AppState;
use itemgrid_api::ws::WsManager;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        db_max_connections: 1,
    }
}

/// Everything a test needs to drive the app and observe its side effects.
pub struct TestApp {
    pub router: Router,
    pub event_bus: Arc<EventBus>,
    pub ws_manager: Arc<WsManager>,
}

impl TestApp {
    /// A fresh router clone (each `oneshot` consumes one).
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an empty in-memory store.
///
/// Uses the same `build_app_router` as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let ws_manager = Arc::new(WsManager::new());

    let state = AppState::new(
        Arc::new(MemoryItemStore::new()),
        Arc::new(config.clone()),
        Arc::clone(&ws_manager),
        Arc::clone(&event_bus),
    );

    TestApp {
        router: build_app_router(state, &config),
        event_bus,
        ws_manager,
    }
}

/// An `ItemService` over an empty in-memory store, plus its bus.
pub fn test_service() -> (ItemService, Arc<EventBus>) {
    let event_bus = Arc::new(EventBus::default());
    let service = ItemService::new(Arc::new(MemoryItemStore::new()), Arc::clone(&event_bus));
    (service, event_bus)
}

/// Eighteen-character serial `AAAAAAAAAAAAAAAA` + two-digit suffix.
pub fn serial(n: u32) -> String {
    format!("AAAAAAAAAAAAAAAA{n:02}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

/// POST a raw body labelled as JSON, for malformed-payload cases.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
