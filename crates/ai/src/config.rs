use std::sync::Arc;
use std::time::Duration;

use crate::gemini::GeminiClient;
use crate::http::build_client;
use crate::openai::OpenAiClient;
use crate::replicate::ReplicateClient;
use crate::{AiError, ImageModel, ModerationModel, TextModel};

/// Backend for the Creative Director.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProvider {
    OpenAi,
    Gemini,
}

/// Backend for image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProvider {
    OpenAi,
    Replicate,
    Gemini,
}

impl TextProvider {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl ImageProvider {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "replicate" => Some(Self::Replicate),
            "gemini" | "imagen" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }
}

/// AI provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub text_provider: TextProvider,
    pub image_provider: ImageProvider,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_text_model: String,
    pub openai_image_model: String,
    pub openai_moderation_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_text_model: String,
    pub gemini_image_model: String,
    pub replicate_api_token: Option<String>,
    pub replicate_base_url: String,
    pub replicate_image_model: String,
    /// Per-request HTTP timeout for provider calls.
    pub request_timeout: Duration,
    /// Upper bound for polling a Replicate prediction.
    pub replicate_max_wait: Duration,
    /// Also ask the OpenAI moderation endpoint when a key is present.
    pub remote_moderation: bool,
}

impl AiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                       |
    /// |---------------------------|-----------------------------------------------|
    /// | `TEXT_PROVIDER`           | `openai` (`openai`, `gemini`)                 |
    /// | `IMAGE_PROVIDER`          | `openai` (`openai`, `replicate`, `gemini`)    |
    /// | `OPENAI_API_KEY`          | --                                            |
    /// | `OPENAI_BASE_URL`         | `https://api.openai.com`                      |
    /// | `OPENAI_TEXT_MODEL`       | `gpt-4o-mini`                                 |
    /// | `OPENAI_IMAGE_MODEL`      | `gpt-image-1`                                 |
    /// | `OPENAI_MODERATION_MODEL` | `omni-moderation-latest`                      |
    /// | `GEMINI_API_KEY`          | --                                            |
    /// | `GEMINI_BASE_URL`         | `https://generativelanguage.googleapis.com`   |
    /// | `GEMINI_TEXT_MODEL`       | `gemini-2.0-flash`                            |
    /// | `GEMINI_IMAGE_MODEL`      | `imagen-3.0-generate-002`                     |
    /// | `REPLICATE_API_TOKEN`     | --                                            |
    /// | `REPLICATE_BASE_URL`      | `https://api.replicate.com`                   |
    /// | `REPLICATE_IMAGE_MODEL`   | `black-forest-labs/flux-schnell`              |
    /// | `AI_REQUEST_TIMEOUT_SECS` | `120`                                         |
    /// | `REPLICATE_MAX_WAIT_SECS` | `180`                                         |
    /// | `REMOTE_MODERATION`       | `true`                                        |
    ///
    /// # Panics
    ///
    /// Panics on an unknown provider name or a non-numeric timeout.
    pub fn from_env() -> Self {
        let text_name = var_or("TEXT_PROVIDER", "openai");
        let text_provider = TextProvider::from_name(&text_name)
            .unwrap_or_else(|| panic!("TEXT_PROVIDER must be openai or gemini, got '{text_name}'"));

        let image_name = var_or("IMAGE_PROVIDER", "openai");
        let image_provider = ImageProvider::from_name(&image_name).unwrap_or_else(|| {
            panic!("IMAGE_PROVIDER must be openai, replicate or gemini, got '{image_name}'")
        });

        let request_timeout_secs: u64 = var_or("AI_REQUEST_TIMEOUT_SECS", "120")
            .parse()
            .expect("AI_REQUEST_TIMEOUT_SECS must be a valid u64");
        let replicate_max_wait_secs: u64 = var_or("REPLICATE_MAX_WAIT_SECS", "180")
            .parse()
            .expect("REPLICATE_MAX_WAIT_SECS must be a valid u64");

        let remote_moderation = !matches!(
            var_or("REMOTE_MODERATION", "true").to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        );

        Self {
            text_provider,
            image_provider,
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com"),
            openai_text_model: var_or("OPENAI_TEXT_MODEL", "gpt-4o-mini"),
            openai_image_model: var_or("OPENAI_IMAGE_MODEL", "gpt-image-1"),
            openai_moderation_model: var_or("OPENAI_MODERATION_MODEL", "omni-moderation-latest"),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_base_url: var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            gemini_text_model: var_or("GEMINI_TEXT_MODEL", "gemini-2.0-flash"),
            gemini_image_model: var_or("GEMINI_IMAGE_MODEL", "imagen-3.0-generate-002"),
            replicate_api_token: non_empty_var("REPLICATE_API_TOKEN"),
            replicate_base_url: var_or("REPLICATE_BASE_URL", "https://api.replicate.com"),
            replicate_image_model: var_or(
                "REPLICATE_IMAGE_MODEL",
                "black-forest-labs/flux-schnell",
            ),
            request_timeout: Duration::from_secs(request_timeout_secs),
            replicate_max_wait: Duration::from_secs(replicate_max_wait_secs),
            remote_moderation,
        }
    }

    fn openai(&self, client: reqwest::Client) -> Result<OpenAiClient, AiError> {
        let key = self
            .openai_api_key
            .clone()
            .ok_or_else(|| AiError::NotConfigured("OPENAI_API_KEY is not set".into()))?;
        Ok(OpenAiClient::new(
            client,
            self.openai_base_url.clone(),
            key,
            self.openai_text_model.clone(),
            self.openai_image_model.clone(),
            self.openai_moderation_model.clone(),
        ))
    }

    fn gemini(&self, client: reqwest::Client) -> Result<GeminiClient, AiError> {
        let key = self
            .gemini_api_key
            .clone()
            .ok_or_else(|| AiError::NotConfigured("GEMINI_API_KEY is not set".into()))?;
        Ok(GeminiClient::new(
            client,
            self.gemini_base_url.clone(),
            key,
            self.gemini_text_model.clone(),
            self.gemini_image_model.clone(),
        ))
    }
}

/// Build the configured text model.
pub fn build_text_model(config: &AiConfig) -> Result<Arc<dyn TextModel>, AiError> {
    let client = build_client(config.request_timeout)?;
    let model: Arc<dyn TextModel> = match config.text_provider {
        TextProvider::OpenAi => Arc::new(config.openai(client)?),
        TextProvider::Gemini => Arc::new(config.gemini(client)?),
    };
    tracing::info!(model = model.name(), "Text model configured");
    Ok(model)
}

/// Build the configured image model.
pub fn build_image_model(config: &AiConfig) -> Result<Arc<dyn ImageModel>, AiError> {
    let client = build_client(config.request_timeout)?;
    let model: Arc<dyn ImageModel> = match config.image_provider {
        ImageProvider::OpenAi => Arc::new(config.openai(client)?),
        ImageProvider::Gemini => Arc::new(config.gemini(client)?),
        ImageProvider::Replicate => {
            let token = config.replicate_api_token.clone().ok_or_else(|| {
                AiError::NotConfigured("REPLICATE_API_TOKEN is not set".into())
            })?;
            Arc::new(ReplicateClient::new(
                client,
                config.replicate_base_url.clone(),
                token,
                config.replicate_image_model.clone(),
                config.replicate_max_wait,
            ))
        }
    };
    tracing::info!(model = model.name(), "Image model configured");
    Ok(model)
}

/// Build the remote moderation model, if enabled and an OpenAI key exists.
///
/// `None` means moderation runs on local rules only.
pub fn build_moderation_model(
    config: &AiConfig,
) -> Result<Option<Arc<dyn ModerationModel>>, AiError> {
    if !config.remote_moderation || config.openai_api_key.is_none() {
        return Ok(None);
    }
    let client = build_client(config.request_timeout)?;
    Ok(Some(Arc::new(config.openai(client)?)))
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name).unwrap_or_else(|| default.to_string())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
