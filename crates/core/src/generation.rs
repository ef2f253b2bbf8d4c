//! Cover generation request and result types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::style::StyleTemplate;
use crate::types::Timestamp;

/// Default number of title suggestions per platform.
pub const DEFAULT_TITLE_COUNT: u8 = 3;
/// Default output language.
pub const DEFAULT_LANGUAGE: &str = "en";

fn default_title_count() -> u8 {
    DEFAULT_TITLE_COUNT
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CoverGenerationRequest {
    /// The article, video script or caption the cover is for.
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(length(min = 1, max = 10))]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub custom_style: Option<StyleTemplate>,
    /// BCP-47 language tag for titles, e.g. `en` or `zh-CN`.
    #[serde(default)]
    #[validate(length(min = 2, max = 16))]
    pub language: Option<String>,
    #[serde(default = "default_title_count")]
    #[validate(range(min = 1, max = 5))]
    pub title_count: u8,
}

impl CoverGenerationRequest {
    /// Schema validation plus checks the derive cannot express.
    pub fn validate_request(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.text.trim().is_empty() {
            return Err(CoreError::Validation("text must not be blank".into()));
        }
        if let Some(lang) = &self.language {
            if !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(CoreError::Validation(format!(
                    "language '{lang}' is not a valid language tag"
                )));
            }
        }
        if let Some(custom) = &self.custom_style {
            custom.validate()?;
        }
        Ok(())
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverStatus {
    Succeeded,
    Failed,
}

/// Outcome for one platform of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverResult {
    pub platform_id: String,
    pub status: CoverStatus,
    pub title: Option<String>,
    pub title_suggestions: Vec<String>,
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    pub storage_key: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Image provider that produced the artwork.
    pub provider: Option<String>,
    /// Client-safe failure description.
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl CoverResult {
    pub fn is_success(&self) -> bool {
        self.status == CoverStatus::Succeeded
    }
}

/// All covers produced for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverBatch {
    pub id: uuid::Uuid,
    pub results: Vec<CoverResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub style_id: String,
    pub created_at: Timestamp,
}

impl CoverBatch {
    pub fn new(id: uuid::Uuid, style_id: String, results: Vec<CoverResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            id,
            failed: results.len() - succeeded,
            succeeded,
            results,
            style_id,
            created_at: chrono::Utc::now(),
        }
    }
}
