//! Community gallery posts.

use covergen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the `community_posts` table, joined with the author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommunityPost {
    pub id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub cover_id: Option<DbId>,
    pub image_url: String,
    pub platform_id: String,
    pub title: String,
    pub caption: Option<String>,
    pub likes: i32,
    pub created_at: Timestamp,
}

/// DTO for inserting a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommunityPost {
    pub user_id: DbId,
    pub cover_id: Option<DbId>,
    pub image_url: String,
    pub platform_id: String,
    pub title: String,
    pub caption: Option<String>,
}

/// Ordering for gallery listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Recent,
    Popular,
}

impl PostSort {
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            Self::Recent => "p.created_at DESC, p.id DESC",
            Self::Popular => "p.likes DESC, p.created_at DESC, p.id DESC",
        }
    }
}
