//! Per-client fixed-window rate limiting.
//!
//! Clients are keyed by IP: the first `x-forwarded-for` hop, then
//! `x-real-ip`, then the socket address. Every response carries
//! `x-ratelimit-limit` and `x-ratelimit-remaining`; a refused request gets
//! a 429 envelope with `retry-after`.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use covergen_core::error::CoreError;
use covergen_core::rate_limit::{FixedWindowLimiter, RateLimitDecision};

use crate::error::AppError;
use crate::state::AppState;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

const MAX_IP_LEN: usize = 64;

/// Limit applied to every `/api` route.
pub async fn api_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.api_limiter, "api", req, next).await
}

/// Stricter limit for the generation routes.
pub async fn generate_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.generate_limiter, "generate", req, next).await
}

async fn enforce(
    limiter: &FixedWindowLimiter,
    scope: &'static str,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req);
    let decision = limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(client = %client, scope, "Rate limit exceeded");
        AppError::Core(CoreError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        })
        .into_response()
    };
    // Headers from an inner, stricter limiter take precedence.
    if !response.headers().contains_key(LIMIT_HEADER) {
        set_headers(response.headers_mut(), &decision);
    }
    response
}

fn set_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
}

/// Identify the client for rate limiting.
pub fn client_key(req: &Request<Body>) -> String {
    forwarded_for(req.headers())
        .or_else(|| header_ip(req.headers(), "x-real-ip"))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    sanitize_ip(first)
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<String> {
    sanitize_ip(headers.get(name)?.to_str().ok()?.trim())
}

fn sanitize_ip(value: &str) -> Option<String> {
    if value.is_empty() || value.len() > MAX_IP_LEN {
        return None;
    }
    value
        .bytes()
        .all(|b| b.is_ascii_hexdigit() || b == b'.' || b == b':')
        .then(|| value.to_string())
}
