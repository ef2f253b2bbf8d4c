//! The per-platform cover generation flow.

use std::sync::Arc;
use std::time::{Duration, Instant};

use covergen_ai::{CreativeBrief, CreativeDirection, CreativeDirector, ImageModel, ImageRequest};
use covergen_core::cache::TtlCache;
use covergen_core::error::CoreError;
use covergen_core::generation::{CoverBatch, CoverGenerationRequest, CoverResult, CoverStatus};
use covergen_core::hashing::cache_key;
use covergen_core::naming::cover_object_key;
use covergen_core::platform::{resolve_platforms, Platform};
use covergen_core::style::StyleTemplate;
use covergen_storage::ObjectStore;
use uuid::Uuid;

use crate::optimize::{optimize, OutputFormat};
use crate::PipelineError;

/// Cache namespace for Creative Director answers.
const DIRECTION_NAMESPACE: &str = "direction";

/// Pipeline settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_format: OutputFormat,
    /// How long a Creative Director answer is reused for an identical brief.
    pub direction_ttl: Duration,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default          |
    /// |----------------------------|------------------|
    /// | `COVER_OUTPUT_FORMAT`      | `jpeg` (`png`)   |
    /// | `DIRECTION_CACHE_TTL_SECS` | `3600`           |
    pub fn from_env() -> Self {
        let format_name = std::env::var("COVER_OUTPUT_FORMAT").unwrap_or_else(|_| "jpeg".into());
        let output_format = OutputFormat::from_name(&format_name)
            .unwrap_or_else(|| panic!("COVER_OUTPUT_FORMAT must be jpeg or png, got '{format_name}'"));

        let direction_ttl_secs: u64 = std::env::var("DIRECTION_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("DIRECTION_CACHE_TTL_SECS must be a valid u64");

        Self {
            output_format,
            direction_ttl: Duration::from_secs(direction_ttl_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Jpeg,
            direction_ttl: Duration::from_secs(3600),
        }
    }
}

/// Runs Creative Director → image model → optimize → upload for each platform.
pub struct CoverPipeline {
    director: CreativeDirector,
    images: Arc<dyn ImageModel>,
    store: Arc<dyn ObjectStore>,
    directions: Arc<TtlCache<CreativeDirection>>,
    config: PipelineConfig,
}

impl CoverPipeline {
    pub fn new(
        director: CreativeDirector,
        images: Arc<dyn ImageModel>,
        store: Arc<dyn ObjectStore>,
        directions: Arc<TtlCache<CreativeDirection>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            director,
            images,
            store,
            directions,
            config,
        }
    }

    /// Generate one cover per requested platform under a fresh batch id.
    ///
    /// Unknown or duplicate platform ids fail the whole request before any
    /// provider is called. After that, each platform succeeds or fails on
    /// its own and the batch is always returned.
    pub async fn run(
        &self,
        request: &CoverGenerationRequest,
        style: &StyleTemplate,
        owner: &str,
    ) -> Result<CoverBatch, PipelineError> {
        self.run_with_id(Uuid::new_v4(), request, style, owner).await
    }

    /// Like [`run`](Self::run) with a caller-chosen batch id.
    pub async fn run_with_id(
        &self,
        batch_id: Uuid,
        request: &CoverGenerationRequest,
        style: &StyleTemplate,
        owner: &str,
    ) -> Result<CoverBatch, PipelineError> {
        let platforms = resolve_platforms(&request.platforms)?;

        tracing::info!(
            batch_id = %batch_id,
            owner,
            style_id = %style.id,
            platforms = platforms.len(),
            "Cover batch started",
        );

        let mut results = Vec::with_capacity(platforms.len());
        for platform in platforms {
            results.push(self.generate_one(batch_id, request, style, owner, platform).await);
        }

        let batch = CoverBatch::new(batch_id, style.id.clone(), results);
        tracing::info!(
            batch_id = %batch.id,
            succeeded = batch.succeeded,
            failed = batch.failed,
            "Cover batch finished",
        );
        Ok(batch)
    }

    async fn generate_one(
        &self,
        batch_id: Uuid,
        request: &CoverGenerationRequest,
        style: &StyleTemplate,
        owner: &str,
        platform: &'static Platform,
    ) -> CoverResult {
        let started = Instant::now();
        let mut result = CoverResult {
            platform_id: platform.id.to_string(),
            status: CoverStatus::Failed,
            title: None,
            title_suggestions: Vec::new(),
            image_prompt: None,
            image_url: None,
            storage_key: None,
            width: platform.width,
            height: platform.height,
            provider: None,
            error: None,
            duration_ms: 0,
        };

        match self
            .fill_result(&mut result, batch_id, request, style, owner, platform)
            .await
        {
            Ok(()) => result.status = CoverStatus::Succeeded,
            Err(err) => {
                tracing::warn!(
                    batch_id = %batch_id,
                    platform = platform.id,
                    error = %err,
                    "Cover generation failed for platform",
                );
                result.error = Some(err.public_message());
            }
        }
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    /// Run every stage for one platform, recording progress in `result` so
    /// a late failure still reports the titles and prompt.
    async fn fill_result(
        &self,
        result: &mut CoverResult,
        batch_id: Uuid,
        request: &CoverGenerationRequest,
        style: &StyleTemplate,
        owner: &str,
        platform: &'static Platform,
    ) -> Result<(), PipelineError> {
        let direction = self.direction_for(request, style, platform).await?;
        result.title = Some(direction.title.clone());
        result.title_suggestions = direction.title_suggestions.clone();
        result.image_prompt = Some(direction.image_prompt.clone());

        let image = self
            .images
            .generate(&ImageRequest {
                prompt: direction.image_prompt.clone(),
                negative_prompt: direction.negative_prompt.clone(),
                aspect_ratio: platform.provider_aspect_ratio().to_string(),
                width: platform.width,
                height: platform.height,
            })
            .await
            .map_err(PipelineError::ImageGeneration)?;
        result.provider = Some(image.provider.clone());

        let format = self.config.output_format;
        let (width, height) = (platform.width, platform.height);
        let raw = image.bytes;
        let optimized =
            tokio::task::spawn_blocking(move || optimize(&raw, width, height, format)).await??;

        let key = cover_object_key(owner, &batch_id, platform.id, format.extension());
        let stored = self
            .store
            .put(&key, optimized.bytes, format.content_type())
            .await?;

        tracing::debug!(
            batch_id = %batch_id,
            platform = platform.id,
            key = %stored.key,
            size = stored.size,
            "Cover stored",
        );

        result.width = optimized.width;
        result.height = optimized.height;
        result.storage_key = Some(stored.key);
        result.image_url = Some(stored.url);
        Ok(())
    }

    /// Creative Director answer for this brief, memoized in the shared cache.
    async fn direction_for(
        &self,
        request: &CoverGenerationRequest,
        style: &StyleTemplate,
        platform: &'static Platform,
    ) -> Result<CreativeDirection, PipelineError> {
        let brief = CreativeBrief {
            text: request.text.trim(),
            platform,
            style,
            language: request.language(),
            title_count: request.title_count,
        };
        let key = cache_key(DIRECTION_NAMESPACE, &brief)
            .map_err(|err| CoreError::Internal(format!("Unhashable creative brief: {err}")))?;
        self.directions
            .get_or_try_insert_with(&key, self.config.direction_ttl, || {
                self.director.direct(&brief)
            })
            .await
            .map_err(PipelineError::Direction)
    }
}
