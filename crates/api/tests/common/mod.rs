//! Shared harness for HTTP-level integration tests.
//!
//! Mirrors the router construction in `main.rs` so tests exercise the same
//! middleware stack (request ID, timeout, tracing, panic recovery, CORS)
//! that production uses. Rate limiting defaults to disabled so unrelated
//! tests never trip the import window; the rate-limit tests opt back in.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use leadbook_api::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use leadbook_api::config::ServerConfig;
use leadbook_api::ratelimit::{FixedWindowLimiter, NoopLimiter, RateLimiter};
use leadbook_api::routes;
use leadbook_api::state::AppState;

/// Actor ID used by the default request helpers.
pub const TEST_ACTOR: i64 = 1;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        rate_limiting_enabled: false,
    }
}

/// Build the application router with rate limiting disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(), Arc::new(NoopLimiter))
}

/// Build the application router with real fixed-window rate limiting.
pub fn build_rate_limited_app(pool: PgPool) -> Router {
    let config = ServerConfig {
        rate_limiting_enabled: true,
        ..test_config()
    };
    build_test_app_with(pool, config, Arc::new(FixedWindowLimiter::new()))
}

/// Build the full application router with all middleware layers.
pub fn build_test_app_with(
    pool: PgPool,
    config: ServerConfig,
    rate_limiter: Arc<dyn RateLimiter>,
) -> Router {
    let timeout = config.request_timeout_secs;
    let state = AppState {
        pool,
        config: Arc::new(config),
        rate_limiter,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3001".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(ACTOR_ID_HEADER),
            HeaderName::from_static(ACTOR_ROLE_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(timeout)))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request authenticated as `actor_id` (admin when `admin` is true).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<&str>,
    actor_id: Option<i64>,
    admin: bool,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    if let Some(actor_id) = actor_id {
        builder = builder.header(ACTOR_ID_HEADER, actor_id.to_string());
    }
    if admin {
        builder = builder.header(ACTOR_ROLE_HEADER, "admin");
    }

    app.oneshot(builder.body(body).expect("request build failed"))
        .await
        .expect("request failed")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty(), None, Some(TEST_ACTOR), false).await
}

pub async fn get_unauthenticated(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty(), None, None, false).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_json_as(app, uri, body, TEST_ACTOR, false).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    actor_id: i64,
    admin: bool,
) -> Response {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body.to_string()),
        Some("application/json"),
        Some(actor_id),
        admin,
    )
    .await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    patch_json_as(app, uri, body, TEST_ACTOR, false).await
}

pub async fn patch_json_as(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    actor_id: i64,
    admin: bool,
) -> Response {
    send(
        app,
        Method::PATCH,
        uri,
        Body::from(body.to_string()),
        Some("application/json"),
        Some(actor_id),
        admin,
    )
    .await
}

pub async fn post_csv(app: Router, uri: &str, body: &str) -> Response {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body.to_string()),
        Some("text/csv"),
        Some(TEST_ACTOR),
        false,
    )
    .await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    serde_json::from_slice(&bytes).expect("body was not JSON")
}

/// Read the response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    String::from_utf8(bytes.to_vec()).expect("body was not UTF-8")
}

/// A valid create payload matching the classic smoke-test lead.
pub fn john_doe() -> serde_json::Value {
    serde_json::json!({
        "full_name": "John Doe",
        "phone": "9876543210",
        "city": "Chandigarh",
        "property_type": "Apartment",
        "bhk": "Two",
        "purpose": "Buy",
        "timeline": "M0_3m",
        "source": "Website",
        "status": "New"
    })
}

/// Create a buyer and return `(id, updated_at)` from the response.
pub async fn create_buyer(app: Router, payload: serde_json::Value) -> (i64, String) {
    let response = post_json(app, "/api/v1/buyers", payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["id"].as_i64().expect("id missing"),
        json["updated_at"].as_str().expect("updated_at missing").to_string(),
    )
}
