//! Synchronous cover generation and the checks shared with background jobs.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use covergen_core::error::CoreError;
use covergen_core::generation::CoverBatch;
use covergen_core::generation::CoverGenerationRequest;
use covergen_core::naming::ANONYMOUS_OWNER;
use covergen_core::plans::{check_quota, usage_period, PlanType};
use covergen_core::platform::resolve_platforms;
use covergen_core::style::{resolve_style, StyleTemplate};
use covergen_core::types::DbId;
use covergen_db::models::cover::CreateCover;
use covergen_db::repositories::{CoverRepo, SubscriptionRepo, UsageRepo};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::moderate::ensure_allowed;
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

/// A request that passed validation, moderation and the quota check.
pub struct PreparedGeneration {
    pub style: StyleTemplate,
    pub owner: String,
    /// Metered user; `None` for anonymous requests.
    pub user_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/generate
///
/// Runs the pipeline inline and returns the whole batch. Individual
/// platforms may have failed; the batch counts say how many.
pub async fn generate(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    AppJson(request): AppJson<CoverGenerationRequest>,
) -> AppResult<Json<ApiResponse<CoverBatch>>> {
    let prepared = prepare(&state, user.as_ref(), &request).await?;

    let batch = state
        .pipeline
        .run(&request, &prepared.style, &prepared.owner)
        .await?;

    if let Some(user_id) = prepared.user_id {
        record_batch(&state.pool, user_id, &batch).await?;
    }

    Ok(ok(batch))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate, moderate and quota-check a generation request.
///
/// Anonymous callers get the free plan's per-request platform limit and are
/// not metered.
pub async fn prepare(
    state: &AppState,
    user: Option<&AuthUser>,
    request: &CoverGenerationRequest,
) -> AppResult<PreparedGeneration> {
    request.validate_request()?;
    let platforms = resolve_platforms(&request.platforms)?;

    let style = resolve_style(request.style_id.as_deref(), request.custom_style.as_ref())
        .map_err(|err| match err {
            CoreError::NotFound { id, .. } => {
                CoreError::Validation(format!("Unknown style template '{id}'"))
            }
            other => other,
        })?;

    ensure_allowed(state, &request.text, "text").await?;
    if let Some(custom) = &request.custom_style {
        let style_text = [
            custom.name.as_str(),
            custom.description.as_str(),
            custom.prompt_hint.as_str(),
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
        ensure_allowed(state, &style_text, "custom style").await?;
    }

    let Some(user) = user else {
        check_quota(PlanType::Free, 0, platforms.len())?;
        return Ok(PreparedGeneration {
            style,
            owner: ANONYMOUS_OWNER.to_string(),
            user_id: None,
        });
    };

    let plan = SubscriptionRepo::effective_plan(&state.pool, user.user_id).await?;
    let used =
        UsageRepo::covers_in_period(&state.pool, user.user_id, &usage_period(Utc::now())).await?;
    check_quota(plan, u32::try_from(used).unwrap_or(u32::MAX), platforms.len())?;

    tracing::debug!(
        user_id = user.user_id,
        plan = %plan,
        used,
        requested = platforms.len(),
        "Generation quota check passed",
    );

    Ok(PreparedGeneration {
        style,
        owner: user.owner(),
        user_id: Some(user.user_id),
    })
}

/// Persist the successful covers of `batch` and meter them.
///
/// Only succeeded covers count against the quota.
pub async fn record_batch(
    pool: &PgPool,
    user_id: DbId,
    batch: &CoverBatch,
) -> Result<(), sqlx::Error> {
    let mut recorded = 0;
    for result in batch.results.iter().filter(|r| r.is_success()) {
        let (Some(image_url), Some(storage_key)) = (&result.image_url, &result.storage_key) else {
            continue;
        };
        let input = CreateCover {
            user_id,
            batch_id: batch.id,
            platform_id: result.platform_id.clone(),
            style_id: batch.style_id.clone(),
            title: result.title.clone().unwrap_or_default(),
            image_url: image_url.clone(),
            storage_key: storage_key.clone(),
            width: result.width as i32,
            height: result.height as i32,
            provider: result.provider.clone().unwrap_or_default(),
        };
        CoverRepo::create(pool, &input).await?;
        recorded += 1;
    }

    if recorded > 0 {
        UsageRepo::increment(pool, user_id, &usage_period(batch.created_at), recorded).await?;
        tracing::info!(user_id, batch_id = %batch.id, recorded, "Covers recorded");
    }
    Ok(())
}
