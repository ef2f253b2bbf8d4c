//! Monthly usage counters.

use covergen_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Row from the `usage_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageRecord {
    pub user_id: DbId,
    /// `YYYY-MM`.
    pub period: String,
    pub covers_generated: i32,
    pub updated_at: Timestamp,
}
