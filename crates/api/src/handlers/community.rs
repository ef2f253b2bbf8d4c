//! Handlers for the community gallery.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use covergen_core::error::CoreError;
use covergen_core::types::DbId;
use covergen_db::models::community::{CommunityPost, CreateCommunityPost, PostSort};
use covergen_db::repositories::{CommunityRepo, CoverRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::moderate::ensure_allowed;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(default)]
    pub sort: PostSort,
}

/// Body of `POST /api/community`: share one of the caller's covers.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    pub cover_id: DbId,
    /// Overrides the cover's title when present.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub id: DbId,
    pub likes: i32,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/community?page=&per_page=&sort=recent|popular
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<CommunityPost>>>> {
    let paging = PageParams {
        page: params.page,
        per_page: params.per_page,
    };
    let (page, per_page) = paging.resolve();
    let (limit, offset) = paging.limit_offset();
    let (posts, total) = CommunityRepo::list(&state.pool, params.sort, limit, offset).await?;
    Ok(Json(
        ApiResponse::new(posts).with_page(page, per_page, total),
    ))
}

/// POST /api/community
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommunityPost>>)> {
    input.validate()?;

    let cover = CoverRepo::find_by_id(&state.pool, input.cover_id)
        .await?
        .filter(|c| c.user_id == user.user_id)
        .ok_or_else(|| CoreError::not_found("Cover", input.cover_id))?;

    let title = input.title.unwrap_or_else(|| cover.title.clone());
    ensure_allowed(&state, &title, "title").await?;
    let caption = input
        .caption
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(caption) = &caption {
        ensure_allowed(&state, caption, "caption").await?;
    }

    let post = CommunityRepo::create(
        &state.pool,
        &CreateCommunityPost {
            user_id: user.user_id,
            cover_id: Some(cover.id),
            image_url: cover.image_url,
            platform_id: cover.platform_id,
            title,
            caption,
        },
    )
    .await?;

    tracing::info!(user_id = user.user_id, post_id = post.id, "Community post created");
    Ok((StatusCode::CREATED, ok(post)))
}

/// POST /api/community/{id}/like
pub async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<LikeResponse>>> {
    let likes = CommunityRepo::like(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", id))?;
    Ok(ok(LikeResponse { id, likes }))
}

/// DELETE /api/community/{id}
///
/// Authors may delete their own posts; admins may delete any.
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let post = CommunityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", id))?;

    if post.user_id != user.user_id && !user.is_admin() {
        return Err(CoreError::Forbidden("You can only delete your own posts".into()).into());
    }

    CommunityRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = user.user_id, post_id = id, "Community post deleted");
    Ok(StatusCode::NO_CONTENT)
}
