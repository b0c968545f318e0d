//! Tests for the endpoint handlers, driven through the built router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokenmeter_core::test_utils::{FailingTokenizer, StaticLoader};
use tokenmeter_core::{LoadMode, TokenizerRegistry};
use tower::ServiceExt;

use crate::router::TokenmeterRouter;

fn app(loader: StaticLoader) -> Router {
    TokenmeterRouter::new(TokenizerRegistry::new(loader)).build()
}

fn two_models() -> StaticLoader {
    StaticLoader::new().with_char_model("a").with_char_model("b")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/calculate")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_serves_html() {
    let response = app(two_models()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_models_local_mode() {
    let loader = two_models().with_broken_model("c", "corrupt");
    let (status, body) = send(app(loader), get("/api/models")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["loaded_count"], 2);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["local_mode"], true);
    // Unloaded entries are only listed in remote mode
    assert_eq!(
        body["models"],
        json!([
            {"key": "a", "name": "test/a", "available": true},
            {"key": "b", "name": "test/b", "available": true},
        ])
    );
}

#[tokio::test]
async fn test_models_remote_mode_lists_unavailable() {
    let loader = StaticLoader::new()
        .with_broken_model("a", "offline")
        .with_char_model("b")
        .with_mode(LoadMode::Remote);
    let (_, body) = send(app(loader), get("/api/models")).await;

    assert_eq!(body["local_mode"], false);
    assert_eq!(body["models"][0]["key"], "a");
    assert_eq!(body["models"][0]["available"], false);
    assert_eq!(body["models"][1]["key"], "b");
    assert_eq!(body["models"][1]["available"], true);
}

#[tokio::test]
async fn test_calculate_json() {
    let (status, body) = send(
        app(two_models()),
        post_json(json!({"text": "Hello, world!", "models": ["b"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["text_length"], 13);
    assert_eq!(body["text_preview"], "Hello, world!");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let result = &body["results"][0];
    assert_eq!(result["model"], "b");
    assert_eq!(result["model_name"], "test/b");
    assert_eq!(result["token_count"], 13);
    assert_eq!(result["char_per_token"], 1.0);
    assert_eq!(result["preview_count"], 13);
    assert_eq!(result["token_preview"][0], "H");
}

#[tokio::test]
async fn test_calculate_form_urlencoded() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/calculate")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=abc&models=b&models=a"))
        .unwrap();
    let (status, body) = send(app(two_models()), request).await;

    assert_eq!(status, StatusCode::OK);
    let models: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["a", "b"]);
}

#[tokio::test]
async fn test_calculate_all_models_when_none_requested() {
    let (_, body) = send(app(two_models()), post_json(json!({"text": "xy"}))).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_calculate_empty_text() {
    let (status, body) = send(app(two_models()), post_json(json!({"text": ""}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "no text provided");
}

#[tokio::test]
async fn test_calculate_unknown_models() {
    let (status, body) = send(
        app(two_models()),
        post_json(json!({"text": "x", "models": ["nope"]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_calculate_without_tokenizers() {
    let loader = StaticLoader::new().with_broken_model("a", "missing");
    let (status, body) = send(app(loader), post_json(json!({"text": "x"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "no tokenizers available");
}

#[tokio::test]
async fn test_models_without_tokenizers() {
    for mode in [LoadMode::Local, LoadMode::Remote] {
        let loader = StaticLoader::new()
            .with_broken_model("a", "missing")
            .with_mode(mode);
        let (status, body) = send(app(loader), get("/api/models")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "no tokenizers available");
    }
}

#[tokio::test]
async fn test_failed_model_is_omitted() {
    let loader = two_models().with_encoder("broken", FailingTokenizer::new("boom"));
    let (status, body) = send(app(loader), post_json(json!({"text": "xyz"}))).await;

    assert_eq!(status, StatusCode::OK);
    let models: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["a", "b"]);
}

#[tokio::test]
async fn test_debug_mode_adds_detail() {
    let registry = TokenizerRegistry::new(two_models());
    let app = TokenmeterRouter::new(registry).debug(true).build();

    let (status, body) = send(app, post_json(json!({"text": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_health_statuses() {
    let (status, body) = send(app(two_models()), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tokenizer_count"], 2);

    let degraded = two_models().with_broken_model("c", "bad");
    let (status, body) = send(app(degraded), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["missing_models"], json!(["c"]));

    let empty = StaticLoader::new().with_broken_model("c", "bad");
    let (status, body) = send(app(empty), get("/api/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_registry_built_once_across_requests() {
    let loader = two_models();
    let registry = Arc::new(TokenizerRegistry::new(loader.clone()));
    let app = TokenmeterRouter::from_arc(registry.clone()).build();

    for _ in 0..3 {
        let (status, _) = send(app.clone(), post_json(json!({"text": "x", "models": ["a"]}))).await;
        assert_eq!(status, StatusCode::OK);
    }
    send(app, get("/api/models")).await;

    assert_eq!(loader.load_count(), 2);
    // Narrowing a request never shrinks the shared registry
    assert_eq!(registry.get().unwrap().len(), 2);
}
