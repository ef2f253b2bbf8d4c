//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod community_repo;
pub mod cover_repo;
pub mod subscription_repo;
pub mod usage_repo;
pub mod user_repo;

pub use community_repo::CommunityRepo;
pub use cover_repo::CoverRepo;
pub use subscription_repo::SubscriptionRepo;
pub use usage_repo::UsageRepo;
pub use user_repo::UserRepo;
