//! # Chat Handler Tests
//!
//! Test suite for the chat REST surface and its coupling to the realtime
//! router.


use crate::server::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::{Config, DbPool};
use tower::ServiceExt;

pub use crate::test_support::{setup_test_db, test_config};

/// Create test app with routes, returning the state for assertions against
/// the room router.
pub fn test_app(pool: DbPool, config: Config) -> (Router, AppState) {
    let state = AppState::new(pool, config);
    let app = crate::server::create_router(state.clone(), vec![]);
    (app, state)
}

/// Seed a user row with a fixed id.
pub async fn seed_user(pool: &DbPool, id: i64, username: &str, email: &str) {
    sqlx::query("INSERT INTO users (id, username, email) VALUES (?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind(email)
        .execute(pool)
        .await
        .expect("Failed to seed user");
}

/// POST a JSON body and return (status, parsed body).
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// GET a path and return (status, parsed body).
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
