//! Integration tests for `/api/users`.
//!
//! Input validation and auth rejections run without a database; the
//! account flows below need PostgreSQL and are ignored by default.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_pool, expect_error, get, get_auth, post_json,
    post_json_auth,
};
use covergen_db::repositories::UsageRepo;
use serde_json::json;
use sqlx::PgPool;

fn registration(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "correct-horse-battery",
        "display_name": "Ada",
    })
}

// ---------------------------------------------------------------------------
// Without a database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = build_test_app().await;

    let response = post_json(
        app.router(),
        "/api/users/register",
        registration("not-an-email"),
    )
    .await;

    expect_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = build_test_app().await;
    let body = json!({
        "email": "ada@example.com",
        "password": "short",
        "display_name": "Ada",
    });

    let response = post_json(app.router(), "/api/users/register", body).await;

    let message = expect_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    assert!(message.contains('8'));
}

#[tokio::test]
async fn profile_requires_a_token() {
    let app = build_test_app().await;

    let response = get(app.router(), "/api/users/me").await;
    expect_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = get_auth(app.router(), "/api/users/me/usage", "garbage").await;
    expect_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = build_test_app().await;
    let mut jwt = app.state.config.jwt.clone();
    jwt.access_token_expiry_hours = -2;
    let token = covergen_api::auth::jwt::generate_access_token(9, "user", &jwt).unwrap();

    let response = get_auth(app.router(), "/api/users/me", &token).await;

    expect_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// ---------------------------------------------------------------------------
// With a database
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn register_login_and_profile(pool: PgPool) {
    let app = build_test_app_with_pool(pool).await;

    let response = post_json(
        app.router(),
        "/api/users/register",
        registration("Ada@Example.com"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["expires_in"], 3600);
    assert_eq!(json["data"]["user"]["email"], "ada@example.com");
    assert_eq!(json["data"]["user"]["plan"], "free");
    assert!(json["data"]["user"].get("password_hash").is_none());

    let response = post_json(
        app.router(),
        "/api/users/login",
        json!({ "email": "ada@example.com", "password": "correct-horse-battery" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let me = body_json(get_auth(app.router(), "/api/users/me", &token).await).await;
    assert_eq!(me["data"]["display_name"], "Ada");
    assert_eq!(me["data"]["role"], "user");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_registration_conflicts(pool: PgPool) {
    let app = build_test_app_with_pool(pool).await;

    let first = post_json(app.router(), "/api/users/register", registration("bob@example.com")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second =
        post_json(app.router(), "/api/users/register", registration("BOB@example.com")).await;
    expect_error(second, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn wrong_password_is_unauthorized(pool: PgPool) {
    let app = build_test_app_with_pool(pool).await;
    post_json(app.router(), "/api/users/register", registration("cy@example.com")).await;

    let response = post_json(
        app.router(),
        "/api/users/login",
        json!({ "email": "cy@example.com", "password": "wrong-password!" }),
    )
    .await;

    let message = expect_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(message, "Invalid email or password");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn generation_is_recorded_and_metered(pool: PgPool) {
    let app = build_test_app_with_pool(pool.clone()).await;
    let json = body_json(
        post_json(app.router(), "/api/users/register", registration("dee@example.com")).await,
    )
    .await;
    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    let user_id = json["data"]["user"]["id"].as_i64().unwrap();

    // One platform succeeds and one fails; only the success is metered.
    let response = post_json_auth(
        app.router(),
        "/api/generate",
        json!({ "text": "Autumn recipes", "platforms": ["youtube", "tiktok"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let batch = body_json(response).await;
    assert!(batch["data"]["results"][0]["storage_key"]
        .as_str()
        .unwrap()
        .starts_with(&format!("covers/user-{user_id}/")));

    let usage = body_json(get_auth(app.router(), "/api/users/me/usage", &token).await).await;
    assert_eq!(usage["data"]["plan"], "free");
    assert_eq!(usage["data"]["used"], 1);
    assert_eq!(usage["data"]["limit"], 10);
    assert_eq!(usage["data"]["remaining"], 9);

    let covers = body_json(get_auth(app.router(), "/api/users/me/covers", &token).await).await;
    let covers = covers["data"].as_array().unwrap();
    assert_eq!(covers.len(), 1);
    assert_eq!(covers[0]["platform_id"], "youtube");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn exhausted_quota_is_payment_required(pool: PgPool) {
    let app = build_test_app_with_pool(pool.clone()).await;
    let json = body_json(
        post_json(app.router(), "/api/users/register", registration("eve@example.com")).await,
    )
    .await;
    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    let user_id = json["data"]["user"]["id"].as_i64().unwrap();

    let period = covergen_core::plans::usage_period(chrono::Utc::now());
    UsageRepo::increment(&pool, user_id, &period, 10).await.unwrap();

    let response = post_json_auth(
        app.router(),
        "/api/generate",
        json!({ "text": "Autumn recipes", "platforms": ["youtube"] }),
        &token,
    )
    .await;

    expect_error(response, StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED").await;
}
