//! Tests for the router builder.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokenmeter_core::test_utils::StaticLoader;
use tokenmeter_core::TokenizerRegistry;
use tower::ServiceExt;

use crate::router::{TokenmeterRouter, MAX_BODY_BYTES};

fn registry() -> TokenizerRegistry {
    TokenizerRegistry::new(StaticLoader::new().with_char_model("a"))
}

async fn status_of(app: axum::Router, method: &str, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap().status()
}

#[test]
fn test_router_builder_type_signature() {
    // Compile-time check of both constructors
    fn _accepts_owned(_: impl FnOnce(TokenizerRegistry) -> TokenmeterRouter) {}
    fn _accepts_arc(_: impl FnOnce(Arc<TokenizerRegistry>) -> TokenmeterRouter) {}

    _accepts_owned(TokenmeterRouter::new);
    _accepts_arc(TokenmeterRouter::from_arc);
}

#[tokio::test]
async fn test_routes_are_mounted() {
    let app = TokenmeterRouter::new(registry()).build();

    assert_eq!(status_of(app.clone(), "GET", "/").await, StatusCode::OK);
    assert_eq!(status_of(app.clone(), "GET", "/api/models").await, StatusCode::OK);
    assert_eq!(status_of(app.clone(), "GET", "/api/health").await, StatusCode::OK);
    assert_eq!(
        status_of(app, "GET", "/api/unknown").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_calculate_requires_post() {
    let app = TokenmeterRouter::new(registry()).build();
    assert_eq!(
        status_of(app, "GET", "/api/calculate").await,
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_build_nested() {
    let app = TokenmeterRouter::new(registry()).build_nested("/tokens");

    assert_eq!(
        status_of(app.clone(), "GET", "/tokens/api/health").await,
        StatusCode::OK
    );
    assert_eq!(
        status_of(app, "GET", "/api/health").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_body_limit() {
    let app = TokenmeterRouter::new(registry()).build();
    let body = format!(r#"{{"text": "{}"}}"#, "x".repeat(MAX_BODY_BYTES));
    let request = Request::builder()
        .method("POST")
        .uri("/api/calculate")
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
