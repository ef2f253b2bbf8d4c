//! Read-only catalogs: platforms, style templates and pricing plans.

use axum::Json;
use covergen_core::plans::{all_plans, PlanLimits};
use covergen_core::platform::{Platform, PLATFORMS};
use covergen_core::style::{builtin_templates, StyleTemplate};

use crate::response::{ok, ApiResponse};

/// GET /api/platforms
pub async fn list_platforms() -> Json<ApiResponse<&'static [Platform]>> {
    ok(PLATFORMS)
}

/// GET /api/templates
pub async fn list_templates() -> Json<ApiResponse<&'static [StyleTemplate]>> {
    ok(builtin_templates())
}

/// GET /api/plans
pub async fn list_plans() -> Json<ApiResponse<[&'static PlanLimits; 3]>> {
    ok(all_plans())
}
