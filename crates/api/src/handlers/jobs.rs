//! Background generation jobs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use covergen_core::error::CoreError;
use covergen_core::generation::CoverGenerationRequest;
use covergen_core::naming::ANONYMOUS_OWNER;
use covergen_pipeline::GenerationJob;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::generate::{prepare, record_batch};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

/// POST /api/generate/jobs
///
/// Same checks as the synchronous endpoint, then answers 202 with the
/// queued job while the pipeline runs on a spawned task.
pub async fn submit_job(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    AppJson(request): AppJson<CoverGenerationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<GenerationJob>>)> {
    let prepared = prepare(&state, user.as_ref(), &request).await?;

    let worker_state = state.clone();
    let job = state
        .jobs
        .submit(
            prepared.owner.clone(),
            request.platforms.clone(),
            move |job_id| async move {
                let batch = worker_state
                    .pipeline
                    .run_with_id(job_id, &request, &prepared.style, &prepared.owner)
                    .await?;
                if let Some(user_id) = prepared.user_id {
                    if let Err(err) = record_batch(&worker_state.pool, user_id, &batch).await {
                        tracing::error!(job_id = %job_id, user_id, error = %err, "Failed to record job covers");
                    }
                }
                Ok(batch)
            },
        )
        .await;

    Ok((StatusCode::ACCEPTED, ok(job)))
}

/// GET /api/generate/jobs/{id}
///
/// Anonymous jobs are readable by anyone holding the id. A user's jobs are
/// visible only to that user and admins; everyone else gets 404.
pub async fn get_job(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<GenerationJob>>> {
    let not_found = || CoreError::not_found("Job", id);

    let job = state.jobs.get(id).await.ok_or_else(not_found)?;
    if job.owner != ANONYMOUS_OWNER {
        let allowed = user
            .as_ref()
            .is_some_and(|u| u.is_admin() || u.owner() == job.owner);
        if !allowed {
            return Err(not_found().into());
        }
    }
    Ok(ok(job))
}

/// GET /api/generate/jobs
///
/// The caller's own jobs, newest first.
pub async fn list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<Vec<GenerationJob>>> {
    ok(state.jobs.list_for_owner(&user.owner()).await)
}
