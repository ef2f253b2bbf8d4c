//! Integration tests for the read-only catalogs.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get};
use serde_json::json;

#[tokio::test]
async fn platforms_lists_every_supported_platform() {
    let app = build_test_app().await;
    let response = get(app.router(), "/api/platforms").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);

    let platforms = json["data"].as_array().unwrap();
    assert_eq!(platforms.len(), 10);

    let youtube = platforms.iter().find(|p| p["id"] == "youtube").unwrap();
    assert_eq!(youtube["width"], 1280);
    assert_eq!(youtube["height"], 720);
    assert!(platforms.iter().any(|p| p["id"] == "xiaohongshu"));
}

#[tokio::test]
async fn templates_include_the_default_style() {
    let app = build_test_app().await;
    let json = body_json(get(app.router(), "/api/templates").await).await;

    let templates = json["data"].as_array().unwrap();
    assert!(templates.iter().any(|t| t["id"] == "modern"));
    for template in templates {
        assert!(template["colors"]["primary"]
            .as_str()
            .unwrap()
            .starts_with('#'));
    }
}

#[tokio::test]
async fn plans_are_listed_in_price_order() {
    let app = build_test_app().await;
    let json = body_json(get(app.router(), "/api/plans").await).await;

    let plans = json["data"].as_array().unwrap();
    let ids: Vec<_> = plans.iter().map(|p| p["plan"].as_str().unwrap()).collect();
    assert_eq!(ids, ["free", "pro", "business"]);
    assert_eq!(plans[0]["price_cents"], 0);
    assert_eq!(plans[0]["max_platforms_per_request"], 2);
    let free_features = plans[0]["features"].as_array().unwrap();
    assert!(free_features.contains(&json!("Built-in and custom styles")));
    assert!(free_features.contains(&json!("Background generation")));
}
