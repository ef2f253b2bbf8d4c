//! Handlers for the `/users` resource (register, login, profile, usage).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use covergen_core::error::CoreError;
use covergen_core::plans::{usage_period, PlanType};
use covergen_core::roles::ROLE_USER;
use covergen_db::models::cover::CoverRecord;
use covergen_db::models::user::{CreateUser, User, UserResponse};
use covergen_db::repositories::{CoverRepo, SubscriptionRepo, UsageRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 80))]
    pub display_name: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Quota position for the current billing period.
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub plan: PlanType,
    /// `YYYY-MM`.
    pub period: String,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub max_platforms_per_request: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    let email = normalize_email(&input.email);
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::Conflict("An account with this email already exists".into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            display_name: input.display_name.trim().to_string(),
            password_hash,
            role: ROLE_USER.to_string(),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let response = auth_response(&state, &user, PlanType::Free)?;
    Ok((StatusCode::CREATED, ok(response)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    UserRepo::touch_last_login(&state.pool, user.id).await?;
    let plan = SubscriptionRepo::effective_plan(&state.pool, user.id).await?;

    Ok(ok(auth_response(&state, &user, plan)?))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = load_user(&state, &auth).await?;
    let plan = SubscriptionRepo::effective_plan(&state.pool, user.id).await?;
    Ok(ok(UserResponse::new(&user, plan.as_str())))
}

/// GET /api/users/me/usage
pub async fn usage(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UsageSummary>>> {
    let plan = SubscriptionRepo::effective_plan(&state.pool, auth.user_id).await?;
    let period = usage_period(Utc::now());
    let used = UsageRepo::covers_in_period(&state.pool, auth.user_id, &period).await?;
    let used = u32::try_from(used).unwrap_or(u32::MAX);

    let limits = plan.limits();
    Ok(ok(UsageSummary {
        plan,
        period,
        used,
        limit: limits.monthly_covers,
        remaining: limits.monthly_covers.saturating_sub(used),
        max_platforms_per_request: limits.max_platforms_per_request,
    }))
}

/// GET /api/users/me/covers?page=&per_page=
pub async fn covers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(paging): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<CoverRecord>>>> {
    let (limit, offset) = paging.limit_offset();
    let covers = CoverRepo::list_for_user(&state.pool, auth.user_id, limit, offset).await?;
    Ok(ok(covers))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Load the authenticated user's row; a token for a deleted or deactivated
/// account is treated as unauthenticated.
pub async fn load_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()).into())
}

fn auth_response(state: &AppState, user: &User, plan: PlanType) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user: UserResponse::new(user, plan.as_str()),
    })
}
