//! Style templates: palette, fonts and layout that steer both the Creative
//! Director prompt and the final composition.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Template used when a request names no style.
pub const DEFAULT_STYLE_ID: &str = "modern";

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex"));

/// Placement of the title relative to the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Centered,
    LeftAligned,
    Split,
    Overlay,
    Minimal,
}

impl Layout {
    /// Composition guidance handed to the image model.
    pub fn composition_hint(self) -> &'static str {
        match self {
            Self::Centered => "centered subject with clear empty space in the middle third",
            Self::LeftAligned => "subject on the right, calm negative space on the left",
            Self::Split => "two-part composition split vertically",
            Self::Overlay => "full-bleed artwork suitable for a dark text overlay",
            Self::Minimal => "minimal composition, flat background, single focal element",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ColorPalette {
    #[validate(custom(function = "validate_hex_color"))]
    pub primary: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub background: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FontPair {
    #[validate(length(min = 1, max = 64))]
    pub title: String,
    #[validate(length(min = 1, max = 64))]
    pub body: String,
}

/// A named visual style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StyleTemplate {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub description: String,
    #[validate(nested)]
    pub colors: ColorPalette,
    #[validate(nested)]
    pub fonts: FontPair,
    pub layout: Layout,
    /// Style vocabulary appended to the image prompt.
    #[serde(default)]
    #[validate(length(max = 300))]
    pub prompt_hint: String,
}

fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some(format!("'{value}' is not a #RRGGBB color").into());
        Err(err)
    }
}

fn template(
    id: &str,
    name: &str,
    description: &str,
    colors: [&str; 4],
    fonts: [&str; 2],
    layout: Layout,
    prompt_hint: &str,
) -> StyleTemplate {
    StyleTemplate {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        colors: ColorPalette {
            primary: colors[0].into(),
            secondary: colors[1].into(),
            background: colors[2].into(),
            text: colors[3].into(),
        },
        fonts: FontPair {
            title: fonts[0].into(),
            body: fonts[1].into(),
        },
        layout,
        prompt_hint: prompt_hint.into(),
    }
}

static BUILTIN_TEMPLATES: LazyLock<Vec<StyleTemplate>> = LazyLock::new(|| {
    vec![
        template(
            "modern",
            "Modern",
            "Clean gradients and bold sans-serif type.",
            ["#4F46E5", "#06B6D4", "#0F172A", "#FFFFFF"],
            ["Inter", "Inter"],
            Layout::Centered,
            "modern, clean gradients, soft lighting, high contrast",
        ),
        template(
            "minimal",
            "Minimal",
            "Lots of whitespace and a single accent color.",
            ["#111827", "#9CA3AF", "#F9FAFB", "#111827"],
            ["Helvetica Neue", "Helvetica Neue"],
            Layout::Minimal,
            "minimalist, flat colors, generous whitespace, simple shapes",
        ),
        template(
            "bold",
            "Bold",
            "Saturated colors for attention-grabbing thumbnails.",
            ["#EF4444", "#F59E0B", "#1F2937", "#FFFFFF"],
            ["Bebas Neue", "Roboto"],
            Layout::Overlay,
            "vibrant, saturated, dramatic lighting, dynamic angle",
        ),
        template(
            "editorial",
            "Editorial",
            "Magazine-like composition with serif headlines.",
            ["#1E293B", "#B45309", "#FDF6E3", "#1E293B"],
            ["Playfair Display", "Source Serif Pro"],
            Layout::LeftAligned,
            "editorial photography, muted palette, natural light, film grain",
        ),
        template(
            "playful",
            "Playful",
            "Pastel illustration style for lifestyle content.",
            ["#EC4899", "#8B5CF6", "#FFF1F2", "#3F3F46"],
            ["Poppins", "Nunito"],
            Layout::Split,
            "playful illustration, pastel colors, rounded shapes, cheerful",
        ),
        template(
            "tech",
            "Tech",
            "Dark backgrounds with neon accents.",
            ["#22D3EE", "#A3E635", "#020617", "#E2E8F0"],
            ["JetBrains Mono", "Inter"],
            Layout::Overlay,
            "futuristic, dark background, neon accents, isometric, glowing lines",
        ),
    ]
});

/// All built-in templates.
pub fn builtin_templates() -> &'static [StyleTemplate] {
    &BUILTIN_TEMPLATES
}

/// Look up a built-in template by id.
pub fn find_template(id: &str) -> Option<&'static StyleTemplate> {
    BUILTIN_TEMPLATES.iter().find(|t| t.id == id)
}

/// Pick the style for a request: a validated custom template wins, then the
/// named template, then [`DEFAULT_STYLE_ID`].
pub fn resolve_style(
    style_id: Option<&str>,
    custom: Option<&StyleTemplate>,
) -> Result<StyleTemplate, CoreError> {
    if let Some(custom) = custom {
        custom.validate()?;
        return Ok(custom.clone());
    }
    let id = style_id.unwrap_or(DEFAULT_STYLE_ID);
    find_template(id)
        .cloned()
        .ok_or_else(|| CoreError::not_found("StyleTemplate", id))
}
