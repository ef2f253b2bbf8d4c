//! Integration tests for `/api/cache`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete_auth, expect_error, get, post_json};
use covergen_ai::CreativeDirection;
use serde_json::json;

fn direction(title: &str) -> CreativeDirection {
    CreativeDirection {
        title: title.into(),
        title_suggestions: vec![title.into()],
        image_prompt: "a lighthouse at dusk".into(),
        negative_prompt: None,
        model: "stub-text".into(),
    }
}

#[tokio::test]
async fn stats_reflect_generation_traffic() {
    let app = build_test_app().await;
    post_json(
        app.router(),
        "/api/generate",
        json!({ "text": "Winter hiking checklist", "platforms": ["youtube", "twitter"] }),
    )
    .await;

    let response = get(app.router(), "/api/cache/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["entries"], 2);
    assert_eq!(json["data"]["misses"], 2);
    assert_eq!(json["data"]["hits"], 0);
    assert_eq!(json["data"]["hit_rate"], 0.0);
}

#[tokio::test]
async fn clearing_requires_admin() {
    let app = build_test_app().await;
    app.state.directions.set_default("direction:a", direction("A"));

    let anonymous = delete_auth(app.router(), "/api/cache", None).await;
    expect_error(anonymous, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let user_token = app.token(5, "user");
    let user = delete_auth(app.router(), "/api/cache", Some(&user_token)).await;
    expect_error(user, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    assert_eq!(app.state.directions.stats().entries, 1);
}

#[tokio::test]
async fn admin_can_clear_the_cache() {
    let app = build_test_app().await;
    app.state.directions.set_default("direction:a", direction("A"));
    app.state.directions.set_default("direction:b", direction("B"));

    let token = app.token(1, "admin");
    let response = delete_auth(app.router(), "/api/cache", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["removed"], 2);
    assert_eq!(app.state.directions.stats().entries, 0);
}

#[tokio::test]
async fn admin_can_delete_one_key() {
    let app = build_test_app().await;
    app.state.directions.set_default("direction:a", direction("A"));
    app.state.directions.set_default("direction:b", direction("B"));
    let token = app.token(1, "admin");

    let response = delete_auth(app.router(), "/api/cache/direction:a", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.state.directions.get("direction:a").is_none());
    assert!(app.state.directions.get("direction:b").is_some());

    let missing = delete_auth(app.router(), "/api/cache/direction:a", Some(&token)).await;
    expect_error(missing, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
