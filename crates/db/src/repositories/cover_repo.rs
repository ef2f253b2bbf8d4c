//! Repository for the `covers` table.

use covergen_core::types::DbId;
use sqlx::PgPool;

use crate::models::cover::{CoverRecord, CreateCover};

const COLUMNS: &str = "id, user_id, batch_id, platform_id, style_id, title, image_url, \
                       storage_key, width, height, provider, created_at";

pub struct CoverRepo;

impl CoverRepo {
    pub async fn create(pool: &PgPool, input: &CreateCover) -> Result<CoverRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO covers (user_id, batch_id, platform_id, style_id, title, image_url,
                                 storage_key, width, height, provider)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CoverRecord>(&query)
            .bind(input.user_id)
            .bind(input.batch_id)
            .bind(&input.platform_id)
            .bind(&input.style_id)
            .bind(&input.title)
            .bind(&input.image_url)
            .bind(&input.storage_key)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.provider)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CoverRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM covers WHERE id = $1");
        sqlx::query_as::<_, CoverRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent covers of a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CoverRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM covers
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CoverRecord>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
