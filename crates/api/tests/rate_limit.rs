//! Integration tests for the per-client rate limits.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{build_test_app_with, expect_error, send, test_config, TestOptions};
use serde_json::json;

fn options(requests: u32, generate: u32) -> TestOptions {
    let mut config = test_config();
    config.rate_limit.requests_per_window = requests;
    config.rate_limit.generate_per_window = generate;
    TestOptions {
        config,
        ..TestOptions::default()
    }
}

fn from_client(uri: &str, ip: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

fn generate_from(ip: &str) -> Request<Body> {
    Request::post("/api/generate")
        .header("x-forwarded-for", ip)
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "text": "Spring sale", "platforms": ["youtube"] }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn responses_carry_limit_headers() {
    let app = build_test_app_with(options(3, 3)).await;

    let response = send(app.router(), from_client("/api/platforms", "203.0.113.5")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "3");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "2");
}

#[tokio::test]
async fn client_over_the_limit_gets_429() {
    let app = build_test_app_with(options(2, 2)).await;

    for _ in 0..2 {
        let response = send(app.router(), from_client("/api/platforms", "203.0.113.5")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(app.router(), from_client("/api/platforms", "203.0.113.5")).await;
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    expect_error(response, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let app = build_test_app_with(options(1, 1)).await;

    let first = send(app.router(), from_client("/api/plans", "203.0.113.5")).await;
    assert_eq!(first.status(), StatusCode::OK);
    let other = send(app.router(), from_client("/api/plans", "198.51.100.7")).await;
    assert_eq!(other.status(), StatusCode::OK);

    let again = send(app.router(), from_client("/api/plans", "203.0.113.5")).await;
    assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn generation_has_its_own_stricter_limit() {
    let app = build_test_app_with(options(10, 1)).await;

    let first = send(app.router(), generate_from("203.0.113.5")).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-ratelimit-limit"], "1");

    let second = send(app.router(), generate_from("203.0.113.5")).await;
    assert_eq!(second.headers()["x-ratelimit-limit"], "1");
    expect_error(second, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;

    // Other routes still answer.
    let catalog = send(app.router(), from_client("/api/platforms", "203.0.113.5")).await;
    assert_eq!(catalog.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_not_rate_limited() {
    let app = build_test_app_with(options(1, 1)).await;

    for _ in 0..3 {
        let response = send(app.router(), from_client("/health", "203.0.113.5")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
    }
}
