//! Text moderation: local rules, optionally merged with the remote model.

use axum::extract::State;
use axum::Json;
use covergen_core::error::CoreError;
use covergen_core::moderation::{check_text, ModerationVerdict};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ModerateRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

/// POST /api/moderate
pub async fn moderate(
    State(state): State<AppState>,
    AppJson(input): AppJson<ModerateRequest>,
) -> AppResult<Json<ApiResponse<ModerationVerdict>>> {
    input.validate()?;
    Ok(ok(moderate_text(&state, &input.text).await))
}

/// Run the local rules and, when configured, the remote model.
///
/// A failing remote call is logged and the local verdict stands.
pub async fn moderate_text(state: &AppState, text: &str) -> ModerationVerdict {
    let local = check_text(text);
    let Some(model) = &state.moderation else {
        return local;
    };
    match model.moderate(text).await {
        Ok(remote) => local.merge(remote),
        Err(err) => {
            tracing::warn!(model = model.name(), error = %err, "Remote moderation failed, using local rules");
            local
        }
    }
}

/// Reject `text` with `CONTENT_REJECTED` when moderation flags it.
pub async fn ensure_allowed(state: &AppState, text: &str, what: &str) -> AppResult<()> {
    let verdict = moderate_text(state, text).await;
    if verdict.flagged {
        tracing::info!(categories = ?verdict.categories, what, "Content rejected by moderation");
        return Err(CoreError::ContentRejected(format!(
            "The {what} violates the content policy ({})",
            verdict.categories.join(", ")
        ))
        .into());
    }
    Ok(())
}
