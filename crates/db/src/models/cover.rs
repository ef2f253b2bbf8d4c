//! Generated cover history.

use covergen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row from the `covers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CoverRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub batch_id: Uuid,
    pub platform_id: String,
    pub style_id: String,
    pub title: String,
    pub image_url: String,
    pub storage_key: String,
    pub width: i32,
    pub height: i32,
    pub provider: String,
    pub created_at: Timestamp,
}

/// DTO for recording a successful cover.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCover {
    pub user_id: DbId,
    pub batch_id: Uuid,
    pub platform_id: String,
    pub style_id: String,
    pub title: String,
    pub image_url: String,
    pub storage_key: String,
    pub width: i32,
    pub height: i32,
    pub provider: String,
}
