pub mod cache;
pub mod catalog;
pub mod community;
pub mod generate;
pub mod health;
pub mod payment;
pub mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::middleware::rate_limit::api_rate_limit;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /platforms                      platform catalog
/// /templates                      style template catalog
/// /plans                          pricing plans
///
/// /generate                       synchronous generation (optional auth)
/// /generate/jobs                  list own jobs (auth), submit job
/// /generate/jobs/{id}             job status / result
///
/// /moderate                       moderate text
///
/// /cache/stats                    cache statistics
/// /cache                          clear (admin)
/// /cache/{key}                    delete one entry (admin)
///
/// /community                      list, create (auth)
/// /community/{id}                 delete (author or admin)
/// /community/{id}/like            like
///
/// /users/register                 register
/// /users/login                    login
/// /users/me                       profile (auth)
/// /users/me/usage                 usage summary (auth)
/// /users/me/covers                cover history (auth)
///
/// /payment/checkout               Stripe checkout session (auth)
/// /payment/portal                 Stripe billing portal (auth)
/// /payment/webhook                Stripe webhook (signed)
///
/// /storage/{*key}                 stored object proxy
/// ```
///
/// Every route is behind the per-client API rate limit.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Catalogs.
        .merge(catalog::router())
        // Cover generation, sync and background.
        .nest("/generate", generate::router(state.clone()))
        // Moderation.
        .route("/moderate", post(handlers::moderate::moderate))
        // Response cache.
        .nest("/cache", cache::router())
        // Community gallery.
        .nest("/community", community::router())
        // Accounts.
        .nest("/users", users::router())
        // Billing.
        .nest("/payment", payment::router())
        // Stored covers.
        .route("/storage/{*key}", get(handlers::storage::get_object))
        .route_layer(from_fn_with_state(state, api_rate_limit))
}
