use std::sync::Arc;

use covergen_ai::{CreativeDirection, ModerationModel};
use covergen_billing::{BillingConfig, StripeClient};
use covergen_core::cache::TtlCache;
use covergen_core::rate_limit::FixedWindowLimiter;
use covergen_pipeline::{CoverPipeline, JobStore};
use covergen_storage::ObjectStore;
use sqlx::PgPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<CoverPipeline>,
    /// Background generation jobs (process memory only).
    pub jobs: Arc<JobStore>,
    /// Memoized Creative Director answers, shared with the pipeline.
    pub directions: Arc<TtlCache<CreativeDirection>>,
    /// Limiter applied to every `/api` request.
    pub api_limiter: Arc<FixedWindowLimiter>,
    /// Stricter limiter for the generation routes.
    pub generate_limiter: Arc<FixedWindowLimiter>,
    pub store: Arc<dyn ObjectStore>,
    /// Remote moderation classifier; `None` means local rules only.
    pub moderation: Option<Arc<dyn ModerationModel>>,
    pub billing: Arc<BillingConfig>,
    /// `None` when `STRIPE_SECRET_KEY` is not configured.
    pub stripe: Option<Arc<StripeClient>>,
}
