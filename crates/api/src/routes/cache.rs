//! Route definitions for `/cache`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::cache;
use crate::state::AppState;

/// Routes mounted at `/cache`.
///
/// ```text
/// GET    /stats           -> stats
/// DELETE /                -> clear (admin)
/// DELETE /{key}           -> delete_key (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(cache::clear))
        .route("/stats", get(cache::stats))
        .route("/{key}", delete(cache::delete_key))
}
