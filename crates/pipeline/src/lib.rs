//! Cover generation pipeline.
//!
//! For each requested platform: Creative Director → image model → optimize
//! → upload. Platforms run sequentially and fail independently. The same
//! pipeline can run detached as a background job through [`JobStore`].

pub mod jobs;
pub mod optimize;
pub mod pipeline;

use covergen_ai::AiError;
use covergen_core::error::CoreError;
use covergen_storage::StorageError;

pub use jobs::{GenerationJob, JobStatus, JobStore};
pub use optimize::{OptimizedImage, OutputFormat};
pub use pipeline::{CoverPipeline, PipelineConfig};

/// Errors raised while producing a cover.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request-level problem detected before any provider call.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Creative direction failed: {0}")]
    Direction(#[source] AiError),

    #[error("Image generation failed: {0}")]
    ImageGeneration(#[source] AiError),

    #[error("Image processing failed: {0}")]
    Optimize(#[from] image::ImageError),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Message that is safe to show to API clients.
    ///
    /// Provider and backend details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Core(err) => err.to_string(),
            Self::Direction(AiError::Timeout(_)) | Self::ImageGeneration(AiError::Timeout(_)) => {
                "The AI provider timed out".into()
            }
            Self::Direction(_) => "Could not write titles for this platform".into(),
            Self::ImageGeneration(_) => "Image generation failed for this platform".into(),
            Self::Optimize(_) => "The generated image could not be processed".into(),
            Self::Upload(_) => "The cover could not be stored".into(),
            Self::Task(_) => "Cover generation was interrupted".into(),
        }
    }
}
