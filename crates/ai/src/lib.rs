//! Clients for the hosted AI models behind cover generation.
//!
//! The rest of the system only sees the provider-neutral traits
//! [`TextModel`], [`ImageModel`] and [`ModerationModel`]; concrete clients
//! for OpenAI, Google Gemini and Replicate implement them over `reqwest`.
//! [`CreativeDirector`] turns a brief into titles and an image prompt.

pub mod config;
pub mod creative_director;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod replicate;

use async_trait::async_trait;
use covergen_core::moderation::ModerationVerdict;

pub use config::{build_image_model, build_moderation_model, build_text_model, AiConfig};
pub use creative_director::{CreativeBrief, CreativeDirection, CreativeDirector};

/// Errors from AI provider calls.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered, but not with what we asked for.
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// The provider did not finish within the allowed time.
    #[error("Model call timed out: {0}")]
    Timeout(String),

    /// The selected provider has no credentials or is unknown.
    #[error("AI provider not configured: {0}")]
    NotConfigured(String),
}

/// A chat model that answers with a JSON object.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Provider/model label for logs and result metadata.
    fn name(&self) -> &str;

    /// Send a system + user prompt and parse the answer as JSON.
    async fn complete_json(&self, system: &str, user: &str)
        -> Result<serde_json::Value, AiError>;
}

/// Parameters for one text-to-image call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// One of the ratios from [`covergen_core::platform::Platform::provider_aspect_ratio`].
    pub aspect_ratio: String,
    /// Final cover size; providers render near it and the optimizer crops.
    pub width: u32,
    pub height: u32,
}

impl ImageRequest {
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    pub fn is_square(&self) -> bool {
        self.aspect_ratio == "1:1"
    }
}

/// Raw image returned by a provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub provider: String,
    /// Prompt as rewritten by the provider, when it reports one.
    pub revised_prompt: Option<String>,
}

#[async_trait]
pub trait ImageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, AiError>;
}

/// A hosted moderation classifier.
#[async_trait]
pub trait ModerationModel: Send + Sync {
    fn name(&self) -> &str;

    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, AiError>;
}
