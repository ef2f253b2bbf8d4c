//! Target platform catalog.
//!
//! Each platform fixes the pixel dimensions of the generated cover and the
//! longest title that still reads well on it.

use serde::Serialize;

use crate::error::CoreError;

/// A social-media surface a cover can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub id: &'static str,
    pub name: &'static str,
    /// Human-readable ratio, e.g. `"16:9"`.
    pub aspect_ratio: &'static str,
    pub width: u32,
    pub height: u32,
    /// Titles are truncated to this many characters.
    pub max_title_chars: usize,
}

impl Platform {
    /// `true` when the cover is taller than it is wide.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Closest of the aspect ratios image providers commonly accept.
    ///
    /// Providers only take a handful of ratios, so the exact platform ratio
    /// is approximated here and the optimizer crops to the real dimensions.
    pub fn provider_aspect_ratio(&self) -> &'static str {
        const SUPPORTED: &[(&str, f64)] = &[
            ("1:1", 1.0),
            ("3:4", 0.75),
            ("4:3", 4.0 / 3.0),
            ("9:16", 9.0 / 16.0),
            ("16:9", 16.0 / 9.0),
        ];
        let ratio = f64::from(self.width) / f64::from(self.height);
        SUPPORTED
            .iter()
            .min_by(|a, b| {
                (a.1 - ratio)
                    .abs()
                    .partial_cmp(&(b.1 - ratio).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(name, _)| *name)
            .unwrap_or("1:1")
    }
}

/// All supported platforms.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        id: "youtube",
        name: "YouTube Thumbnail",
        aspect_ratio: "16:9",
        width: 1280,
        height: 720,
        max_title_chars: 60,
    },
    Platform {
        id: "instagram_post",
        name: "Instagram Post",
        aspect_ratio: "1:1",
        width: 1080,
        height: 1080,
        max_title_chars: 50,
    },
    Platform {
        id: "instagram_story",
        name: "Instagram Story",
        aspect_ratio: "9:16",
        width: 1080,
        height: 1920,
        max_title_chars: 40,
    },
    Platform {
        id: "tiktok",
        name: "TikTok Cover",
        aspect_ratio: "9:16",
        width: 1080,
        height: 1920,
        max_title_chars: 40,
    },
    Platform {
        id: "twitter",
        name: "X / Twitter Post",
        aspect_ratio: "16:9",
        width: 1600,
        height: 900,
        max_title_chars: 70,
    },
    Platform {
        id: "linkedin",
        name: "LinkedIn Post",
        aspect_ratio: "1.91:1",
        width: 1200,
        height: 627,
        max_title_chars: 70,
    },
    Platform {
        id: "facebook",
        name: "Facebook Post",
        aspect_ratio: "1.91:1",
        width: 1200,
        height: 630,
        max_title_chars: 70,
    },
    Platform {
        id: "pinterest",
        name: "Pinterest Pin",
        aspect_ratio: "2:3",
        width: 1000,
        height: 1500,
        max_title_chars: 50,
    },
    Platform {
        id: "xiaohongshu",
        name: "Xiaohongshu Note",
        aspect_ratio: "3:4",
        width: 1080,
        height: 1440,
        max_title_chars: 20,
    },
    Platform {
        id: "wechat",
        name: "WeChat Article",
        aspect_ratio: "2.35:1",
        width: 900,
        height: 383,
        max_title_chars: 32,
    },
];

/// Look up a platform by id.
pub fn find_platform(id: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.id == id)
}

/// Resolve a list of platform ids, failing on the first unknown or
/// duplicated id.
pub fn resolve_platforms(ids: &[String]) -> Result<Vec<&'static Platform>, CoreError> {
    let mut resolved: Vec<&'static Platform> = Vec::with_capacity(ids.len());
    for id in ids {
        let platform = find_platform(id).ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown platform '{id}'. Valid platforms: {}",
                PLATFORMS
                    .iter()
                    .map(|p| p.id)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        if resolved.iter().any(|p| p.id == platform.id) {
            return Err(CoreError::Validation(format!(
                "Platform '{id}' listed more than once"
            )));
        }
        resolved.push(platform);
    }
    Ok(resolved)
}
