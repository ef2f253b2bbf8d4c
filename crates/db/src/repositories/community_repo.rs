//! Repository for the `community_posts` table.

use covergen_core::types::DbId;
use sqlx::PgPool;

use crate::models::community::{CommunityPost, CreateCommunityPost, PostSort};

/// Columns selected from `community_posts p JOIN users u`.
const COLUMNS: &str = "p.id, p.user_id, u.display_name AS author_name, p.cover_id, p.image_url, \
                       p.platform_id, p.title, p.caption, p.likes, p.created_at";

pub struct CommunityRepo;

impl CommunityRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCommunityPost,
    ) -> Result<CommunityPost, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO community_posts (user_id, cover_id, image_url, platform_id, title, caption)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(input.cover_id)
        .bind(&input.image_url)
        .bind(&input.platform_id)
        .bind(&input.title)
        .bind(&input.caption)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CommunityPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM community_posts p JOIN users u ON u.id = p.user_id
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, CommunityPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of posts plus the total count.
    pub async fn list(
        pool: &PgPool,
        sort: PostSort,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommunityPost>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM community_posts p JOIN users u ON u.id = p.user_id
             ORDER BY {}
             LIMIT $1 OFFSET $2",
            sort.order_by()
        );
        let posts = sqlx::query_as::<_, CommunityPost>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM community_posts")
            .fetch_one(pool)
            .await?;
        Ok((posts, total))
    }

    /// Increment the like counter. Returns the new count, or `None` if the
    /// post does not exist.
    pub async fn like(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("UPDATE community_posts SET likes = likes + 1 WHERE id = $1 RETURNING likes")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(likes,)| likes))
    }

    /// Delete a post. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM community_posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
