//! Response cache inspection and invalidation.

use axum::extract::{Path, State};
use axum::Json;
use covergen_core::cache::CacheStats;
use covergen_core::error::CoreError;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub removed: usize,
}

/// GET /api/cache/stats
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    ok(state.directions.stats())
}

/// DELETE /api/cache
pub async fn clear(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<ApiResponse<Cleared>> {
    let removed = state.directions.clear();
    tracing::info!(admin_id = admin.user_id, removed, "Cache cleared");
    ok(Cleared { removed })
}

/// DELETE /api/cache/{key}
pub async fn delete_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<Cleared>>> {
    if !state.directions.delete(&key) {
        return Err(CoreError::not_found("Cache entry", key).into());
    }
    tracing::info!(admin_id = admin.user_id, key = %key, "Cache entry deleted");
    Ok(ok(Cleared { removed: 1 }))
}
