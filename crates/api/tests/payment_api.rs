//! Integration tests for `/api/payment`.
//!
//! Stripe itself is never contacted: checkout and portal are exercised with
//! billing disabled, and webhooks use events that need no database writes.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{
    body_json, build_test_app, build_test_app_with, expect_error, post_json, post_json_auth, send,
    TestOptions,
};
use covergen_billing::{sign_payload, BillingConfig};
use serde_json::json;

const WEBHOOK_SECRET: &str = "whsec_test_secret";

fn webhook_options() -> TestOptions {
    let mut billing = BillingConfig::disabled();
    billing.webhook_secret = Some(WEBHOOK_SECRET.into());
    TestOptions {
        billing,
        ..TestOptions::default()
    }
}

fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::post("/api/payment/webhook").header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn ignored_event() -> String {
    json!({
        "id": "evt_123",
        "type": "charge.refunded",
        "data": { "object": { "id": "ch_1" } }
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Checkout and portal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_requires_authentication() {
    let app = build_test_app().await;

    let response = post_json(app.router(), "/api/payment/checkout", json!({ "plan": "pro" })).await;

    expect_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn free_plan_needs_no_checkout() {
    let app = build_test_app().await;
    let token = app.token(3, "user");

    let response = post_json_auth(
        app.router(),
        "/api/payment/checkout",
        json!({ "plan": "free" }),
        &token,
    )
    .await;

    expect_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn checkout_without_stripe_is_unavailable() {
    let app = build_test_app().await;
    let token = app.token(3, "user");

    let response = post_json_auth(
        app.router(),
        "/api/payment/checkout",
        json!({ "plan": "pro" }),
        &token,
    )
    .await;

    expect_error(response, StatusCode::SERVICE_UNAVAILABLE, "BILLING_UNAVAILABLE").await;
}

#[tokio::test]
async fn unknown_plan_is_a_bad_request() {
    let app = build_test_app().await;
    let token = app.token(3, "user");

    let response = post_json_auth(
        app.router(),
        "/api/payment/checkout",
        json!({ "plan": "platinum" }),
        &token,
    )
    .await;

    expect_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[tokio::test]
async fn portal_without_stripe_is_unavailable() {
    let app = build_test_app().await;
    let token = app.token(3, "user");

    let response = post_json_auth(app.router(), "/api/payment/portal", json!({}), &token).await;

    expect_error(response, StatusCode::SERVICE_UNAVAILABLE, "BILLING_UNAVAILABLE").await;
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn webhook_without_secret_is_unavailable() {
    let app = build_test_app().await;
    let payload = ignored_event();
    let signature = format!("t={},v1=deadbeef", Utc::now().timestamp());

    let response = send(app.router(), webhook_request(&payload, Some(signature))).await;

    expect_error(response, StatusCode::SERVICE_UNAVAILABLE, "BILLING_UNAVAILABLE").await;
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let app = build_test_app_with(webhook_options()).await;

    let response = send(app.router(), webhook_request(&ignored_event(), None)).await;

    expect_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[tokio::test]
async fn webhook_with_wrong_signature_is_rejected() {
    let app = build_test_app_with(webhook_options()).await;
    let payload = ignored_event();
    let t = Utc::now().timestamp();
    let signature = format!("t={t},v1={}", sign_payload(payload.as_bytes(), "whsec_other", t));

    let response = send(app.router(), webhook_request(&payload, Some(signature))).await;

    let message = expect_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
    assert_eq!(message, "Invalid webhook signature");
}

#[tokio::test]
async fn webhook_with_stale_signature_is_rejected() {
    let app = build_test_app_with(webhook_options()).await;
    let payload = ignored_event();
    let t = Utc::now().timestamp() - 3600;
    let signature = format!("t={t},v1={}", sign_payload(payload.as_bytes(), WEBHOOK_SECRET, t));

    let response = send(app.router(), webhook_request(&payload, Some(signature))).await;

    expect_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[tokio::test]
async fn signed_unhandled_event_is_acknowledged() {
    let app = build_test_app_with(webhook_options()).await;
    let payload = ignored_event();
    let t = Utc::now().timestamp();
    let signature = format!("t={t},v1={}", sign_payload(payload.as_bytes(), WEBHOOK_SECRET, t));

    let response = send(app.router(), webhook_request(&payload, Some(signature))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["received"], true);
    assert_eq!(json["data"]["event_type"], "charge.refunded");
}

#[tokio::test]
async fn signed_garbage_payload_is_rejected() {
    let app = build_test_app_with(webhook_options()).await;
    let payload = "{\"not\": \"an event\"}";
    let t = Utc::now().timestamp();
    let signature = format!("t={t},v1={}", sign_payload(payload.as_bytes(), WEBHOOK_SECRET, t));

    let response = send(app.router(), webhook_request(payload, Some(signature))).await;

    let message = expect_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
    assert!(message.starts_with("Invalid webhook payload"));
}
