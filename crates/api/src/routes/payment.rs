//! Route definitions for `/payment`.

use axum::routing::post;
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payment`.
///
/// ```text
/// POST   /checkout        -> checkout (auth)
/// POST   /portal          -> portal (auth)
/// POST   /webhook         -> webhook (Stripe signature)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(payment::checkout))
        .route("/portal", post(payment::portal))
        .route("/webhook", post(payment::webhook))
}
