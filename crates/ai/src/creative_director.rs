//! The Creative Director: one LLM call that proposes cover titles and the
//! image prompt for a single platform.

use std::sync::Arc;

use covergen_core::platform::Platform;
use covergen_core::style::StyleTemplate;
use serde::{Deserialize, Serialize};

use crate::{AiError, TextModel};

const SYSTEM_PROMPT: &str = "You are the creative director of a design studio that makes \
social-media cover images. Given a piece of content, you write short, punchy cover titles \
and one detailed prompt for a text-to-image model. The image must contain no text, letters \
or logos; the title is composited separately. Answer with a single JSON object of the form \
{\"titles\": [string], \"image_prompt\": string, \"negative_prompt\": string}.";

/// Everything the director needs to know about one cover.
#[derive(Debug, Clone, Serialize)]
pub struct CreativeBrief<'a> {
    pub text: &'a str,
    pub platform: &'a Platform,
    pub style: &'a StyleTemplate,
    pub language: &'a str,
    pub title_count: u8,
}

/// Titles and prompts for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeDirection {
    /// The title shown on the cover (first suggestion).
    pub title: String,
    pub title_suggestions: Vec<String>,
    pub image_prompt: String,
    pub negative_prompt: Option<String>,
    /// Label of the model that produced the direction.
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct RawDirection {
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    image_prompt: String,
    #[serde(default)]
    negative_prompt: Option<String>,
}

pub struct CreativeDirector {
    model: Arc<dyn TextModel>,
}

impl CreativeDirector {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Ask the model for a direction and normalize its answer.
    pub async fn direct(&self, brief: &CreativeBrief<'_>) -> Result<CreativeDirection, AiError> {
        let user_prompt = build_user_prompt(brief);
        let raw = self.model.complete_json(SYSTEM_PROMPT, &user_prompt).await?;
        let raw: RawDirection = serde_json::from_value(raw)
            .map_err(|e| AiError::InvalidResponse(format!("unexpected direction shape: {e}")))?;

        let direction = normalize(raw, brief, self.model.name())?;
        tracing::debug!(
            platform = brief.platform.id,
            titles = direction.title_suggestions.len(),
            model = %direction.model,
            "Creative direction ready",
        );
        Ok(direction)
    }
}

fn build_user_prompt(brief: &CreativeBrief<'_>) -> String {
    let style = brief.style;
    format!(
        "Content:\n\"\"\"\n{text}\n\"\"\"\n\n\
         Platform: {platform} ({ratio}, {w}x{h} px).\n\
         Write {count} distinct cover titles in language '{lang}', each at most {max} characters.\n\
         Visual style: {style_name}. {style_hint}\n\
         Palette: primary {primary}, secondary {secondary}, background {background}.\n\
         Composition: {composition}.",
        text = brief.text.trim(),
        platform = brief.platform.name,
        ratio = brief.platform.aspect_ratio,
        w = brief.platform.width,
        h = brief.platform.height,
        count = brief.title_count,
        lang = brief.language,
        max = brief.platform.max_title_chars,
        style_name = style.name,
        style_hint = style.prompt_hint,
        primary = style.colors.primary,
        secondary = style.colors.secondary,
        background = style.colors.background,
        composition = style.layout.composition_hint(),
    )
}

fn normalize(
    raw: RawDirection,
    brief: &CreativeBrief<'_>,
    model: &str,
) -> Result<CreativeDirection, AiError> {
    let titles = normalize_titles(
        raw.titles,
        brief.platform.max_title_chars,
        usize::from(brief.title_count),
    );
    let title = titles
        .first()
        .cloned()
        .ok_or_else(|| AiError::InvalidResponse("model returned no usable titles".into()))?;

    let prompt = raw.image_prompt.trim();
    if prompt.is_empty() {
        return Err(AiError::InvalidResponse("model returned an empty image prompt".into()));
    }

    let image_prompt = format!(
        "{prompt}. Style: {hint}. Aspect ratio {ratio}. {composition}. No text, no letters, no watermark.",
        hint = brief.style.prompt_hint,
        ratio = brief.platform.aspect_ratio,
        composition = brief.style.layout.composition_hint(),
    );

    Ok(CreativeDirection {
        title,
        title_suggestions: titles,
        image_prompt,
        negative_prompt: raw
            .negative_prompt
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        model: model.to_string(),
    })
}

/// Trim, drop empties, de-duplicate case-insensitively, truncate to
/// `max_chars` characters and keep at most `limit` titles.
pub fn normalize_titles(raw: Vec<String>, max_chars: usize, limit: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut titles = Vec::new();
    for title in raw {
        let cleaned = title.trim().trim_matches('"').trim();
        if cleaned.is_empty() {
            continue;
        }
        let truncated: String = cleaned.chars().take(max_chars).collect();
        let truncated = truncated.trim_end().to_string();
        let folded = truncated.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        titles.push(truncated);
        if titles.len() == limit {
            break;
        }
    }
    titles
}
