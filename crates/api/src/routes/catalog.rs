//! Public catalog routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// GET    /platforms       -> list_platforms
/// GET    /templates       -> list_templates
/// GET    /plans           -> list_plans
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/platforms", get(catalog::list_platforms))
        .route("/templates", get(catalog::list_templates))
        .route("/plans", get(catalog::list_plans))
}
