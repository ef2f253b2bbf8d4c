//! Fit provider output to a platform's exact pixel size and re-encode it.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// JPEG quality for published covers.
pub const JPEG_QUALITY: u8 = 90;

/// Encoding of the stored cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Encoded cover ready for upload.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

/// Decode `bytes`, scale and center-crop to exactly `width`x`height`, and
/// encode as `format`.
pub fn optimize(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
) -> Result<OptimizedImage, image::ImageError> {
    let source = image::load_from_memory(bytes)?;
    let fitted = cover_fit(source, width, height);

    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = fitted.to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
        }
        OutputFormat::Png => {
            fitted.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        }
    }

    Ok(OptimizedImage {
        bytes: out,
        width: fitted.width(),
        height: fitted.height(),
        format,
    })
}

/// Resize so the image covers the target box, then crop the overflow.
fn cover_fit(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    image.resize_to_fill(width, height, FilterType::Lanczos3)
}
