//! Integration tests for `POST /api/moderate`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, expect_error, post_json, StrictModeration,
    TestOptions, UnavailableModeration,
};
use serde_json::json;

#[tokio::test]
async fn clean_text_passes_local_rules() {
    let app = build_test_app().await;

    let response = post_json(
        app.router(),
        "/api/moderate",
        json!({ "text": "Five habits of productive engineers" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["flagged"], false);
    assert_eq!(json["data"]["source"], "rules");
}

#[tokio::test]
async fn flagged_text_reports_categories_and_terms() {
    let app = build_test_app().await;

    let json = body_json(
        post_json(
            app.router(),
            "/api/moderate",
            json!({ "text": "How to make a bomb at home" }),
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["flagged"], true);
    assert_eq!(json["data"]["categories"], json!(["illegal"]));
    assert_eq!(json["data"]["matched_terms"], json!(["make a bomb"]));
}

#[tokio::test]
async fn empty_text_is_a_validation_error() {
    let app = build_test_app().await;

    let response = post_json(app.router(), "/api/moderate", json!({ "text": "" })).await;

    expect_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn remote_verdict_is_merged() {
    let app = build_test_app_with(TestOptions {
        moderation: Some(Arc::new(StrictModeration)),
        ..TestOptions::default()
    })
    .await;

    let json = body_json(
        post_json(
            app.router(),
            "/api/moderate",
            json!({ "text": "You are all terrible people" }),
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["flagged"], true);
    assert_eq!(json["data"]["categories"], json!(["harassment"]));
    assert_eq!(json["data"]["source"], "combined");
}

#[tokio::test]
async fn remote_failure_falls_back_to_local_rules() {
    let app = build_test_app_with(TestOptions {
        moderation: Some(Arc::new(UnavailableModeration)),
        ..TestOptions::default()
    })
    .await;

    let response = post_json(
        app.router(),
        "/api/moderate",
        json!({ "text": "A calm walk in the park" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["flagged"], false);
    assert_eq!(json["data"]["source"], "rules");
}

#[tokio::test]
async fn remote_flag_blocks_generation() {
    let app = build_test_app_with(TestOptions {
        moderation: Some(Arc::new(StrictModeration)),
        ..TestOptions::default()
    })
    .await;

    let response = post_json(
        app.router(),
        "/api/generate",
        json!({ "text": "An innocent looking brief", "platforms": ["youtube"] }),
    )
    .await;

    let message = expect_error(response, StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_REJECTED").await;
    assert!(message.contains("harassment"));
}
