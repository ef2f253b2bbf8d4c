//! Route definitions for `/community`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::community;
use crate::state::AppState;

/// Routes mounted at `/community`.
///
/// ```text
/// GET    /                -> list_posts
/// POST   /                -> create_post (auth)
/// DELETE /{id}            -> delete_post (author or admin)
/// POST   /{id}/like       -> like_post
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(community::list_posts).post(community::create_post))
        .route("/{id}", delete(community::delete_post))
        .route("/{id}/like", post(community::like_post))
}
