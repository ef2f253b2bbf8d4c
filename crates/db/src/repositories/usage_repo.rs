//! Repository for the `usage_records` table.

use covergen_core::types::DbId;
use sqlx::PgPool;

use crate::models::usage::UsageRecord;

pub struct UsageRepo;

impl UsageRepo {
    /// Covers generated by the user in `period`; zero without a row.
    pub async fn covers_in_period(
        pool: &PgPool,
        user_id: DbId,
        period: &str,
    ) -> Result<i32, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT covers_generated FROM usage_records WHERE user_id = $1 AND period = $2",
        )
        .bind(user_id)
        .bind(period)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(n,)| n).unwrap_or(0))
    }

    /// Add `count` covers to the user's counter for `period`.
    pub async fn increment(
        pool: &PgPool,
        user_id: DbId,
        period: &str,
        count: i32,
    ) -> Result<UsageRecord, sqlx::Error> {
        sqlx::query_as::<_, UsageRecord>(
            "INSERT INTO usage_records (user_id, period, covers_generated)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, period) DO UPDATE SET
                covers_generated = usage_records.covers_generated + EXCLUDED.covers_generated,
                updated_at = NOW()
             RETURNING user_id, period, covers_generated, updated_at",
        )
        .bind(user_id)
        .bind(period)
        .bind(count)
        .fetch_one(pool)
        .await
    }
}
