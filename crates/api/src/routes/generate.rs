//! Route definitions for `/generate`.
//!
//! Authentication is optional; anonymous callers get free-plan limits.
//! All routes sit behind the stricter generation rate limit.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generate, jobs};
use crate::middleware::rate_limit::generate_rate_limit;
use crate::state::AppState;

/// Routes mounted at `/generate`.
///
/// ```text
/// POST   /                -> generate
/// GET    /jobs            -> list_jobs (auth)
/// POST   /jobs            -> submit_job
/// GET    /jobs/{id}       -> get_job
/// ```
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(generate::generate))
        .route("/jobs", get(jobs::list_jobs).post(jobs::submit_job))
        .route("/jobs/{id}", get(jobs::get_job))
        .route_layer(from_fn_with_state(state, generate_rate_limit))
}
