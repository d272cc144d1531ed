#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use showcase_api::auth::jwt::{generate_access_token, JwtConfig};
use showcase_api::config::ServerConfig;
use showcase_api::router::build_app_router;
use showcase_api::state::AppState;
use showcase_core::featured::PinPolicy;
use showcase_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use showcase_db::Db;

const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        snapshot_seed_path: None,
        featured_count: 6,
        pin_policy: PinPolicy::Keep,
        default_page_size: 12,
        snapshot_max_bytes: 1024 * 1024,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Fresh, migrated in-memory database.
pub async fn test_db() -> Db {
    let pool = showcase_db::create_memory_pool()
        .await
        .expect("in-memory pool");
    showcase_db::run_migrations(&pool)
        .await
        .expect("migrations apply");
    Db::new(pool)
}

/// Build the full application router (same middleware stack as production)
/// over the given database.
pub fn build_test_app(db: Db) -> Router {
    build_test_app_with(db, test_config())
}

pub fn build_test_app_with(db: Db, config: ServerConfig) -> Router {
    let state = AppState {
        db,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn student_token(user_id: &str) -> String {
    generate_access_token(
        user_id,
        &format!("Student {user_id}"),
        Some("Computer Science"),
        ROLE_STUDENT,
        &test_config().jwt,
    )
    .expect("token generation should succeed")
}

pub fn admin_token() -> String {
    generate_access_token("admin@campus.edu", "Admin", None, ROLE_ADMIN, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Submit a project as `user_id` and return its id.
pub async fn submit(app: Router, user_id: &str, title: &str) -> i64 {
    let body = serde_json::json!({
        "title": title,
        "summary": format!("{title} summary"),
        "tags": ["rust"],
    });
    let response = post_json_auth(app, "/api/v1/projects", &student_token(user_id), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Move a project to `status` as an admin.
pub async fn set_status(app: Router, id: i64, status: &str) -> serde_json::Value {
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/status"),
        &admin_token(),
        serde_json::json!({ "status": status }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await
}
