//! Route definitions for `/users`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /register        -> register
/// POST   /login           -> login
/// GET    /me              -> me (auth)
/// GET    /me/usage        -> usage (auth)
/// GET    /me/covers       -> covers (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route("/me/usage", get(users::usage))
        .route("/me/covers", get(users::covers))
}
