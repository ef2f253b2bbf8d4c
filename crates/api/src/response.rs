//! Response envelope shared by every `/api` endpoint.
//!
//! Success: `{ "success": true, "data": ..., "meta": { "timestamp": ... } }`
//! Failure: `{ "success": false, "error": { "code", "message" }, "meta": { ... } }`
//!
//! Handlers return [`ApiResponse`] instead of ad-hoc `json!` values so the
//! shape is checked at compile time.

use axum::Json;
use chrono::Utc;
use covergen_core::types::Timestamp;
use serde::Serialize;

/// Envelope metadata. Paging fields appear only on paged listings.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Successful `{ success, data, meta }` envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub meta: Meta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: Meta::now(),
        }
    }

    /// Attach paging information to the metadata.
    pub fn with_page(mut self, page: i64, per_page: i64, total: i64) -> Self {
        self.meta.page = Some(page);
        self.meta.per_page = Some(per_page);
        self.meta.total = Some(total);
        self
    }
}

/// Shorthand for `Json(ApiResponse::new(data))`.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::new(data))
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// Failed `{ success: false, error, meta }` envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub meta: Meta,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: String) -> Self {
        Self {
            success: false,
            error: ErrorDetail { code, message },
            meta: Meta::now(),
        }
    }
}
