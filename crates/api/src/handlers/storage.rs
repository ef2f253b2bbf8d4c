//! Read-through proxy for stored covers.
//!
//! With the local backend this is how clients fetch images; with S3/R2 it
//! still works for any key the bucket holds.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;
use crate::state::AppState;

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// GET /api/storage/{*key}
pub async fn get_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let object = state.store.get(&key).await?;

    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
        ],
        object.bytes,
    )
        .into_response())
}
