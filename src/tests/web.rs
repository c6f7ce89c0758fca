//! Admin API tests, driven through the router without a listener.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use crate::config::Config;
use crate::engine::MappingService;
use crate::web::{router, SharedState};

fn test_router(config: Config) -> axum::Router {
    let service = MappingService::from_config(&config).unwrap();
    router(Arc::new(SharedState {
        service: Arc::new(service),
        config,
    }))
}

async fn post_generate(app: axum::Router, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/mappings/generate")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_mappings() {
    let app = test_router(Config::default());

    let (status, body) = post_generate(
        app,
        json!({"categories": ["Pizza", "Sushi Bar"], "threshold": 0.75}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processedCount"], 2);
    assert_eq!(body["totalCount"], 2);

    let mappings = body["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0]["category"], "Pizza");
    assert_eq!(mappings[0]["interests"][0], "Pizza");
    assert_eq!(mappings[0]["similarityScores"]["Pizza"], 1.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_requires_categories() {
    let app = test_router(Config::default());

    let (status, body) = post_generate(app.clone(), json!({"categories": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("non-empty"));

    let (status, _) = post_generate(app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_caps_batch_size() {
    let mut config = Config::default();
    config.mapping.max_batch_size = 2;
    let app = test_router(config);

    let (status, body) = post_generate(
        app,
        json!({"categories": ["Pizza", "Sushi Bar", "Taco Truck", "BBQ"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 4);
    assert_eq!(body["processedCount"], 2);
    assert_eq!(body["mappings"].as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_uses_default_threshold() {
    let app = test_router(Config::default());

    let (status, body) = post_generate(app, json!({"categories": ["Taco Truck"]})).await;
    assert_eq!(status, StatusCode::OK);

    let interests = body["mappings"][0]["interests"].as_array().unwrap();
    assert!(interests.iter().any(|i| i == "Tacos"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_interests_endpoint() {
    let app = test_router(Config::default());

    let request = Request::builder()
        .uri("/api/interests")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let interests = body.as_array().unwrap();
    assert_eq!(interests.len(), 23);
    assert!(interests.iter().any(|i| i == "Pizza"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_endpoint() {
    let app = test_router(Config::default());

    let request = Request::builder()
        .uri("/api/config")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["mapping"]["backend"], "hash");
}
