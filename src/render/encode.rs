use std::{fmt, str::FromStr};

use anyhow::Context;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::foundation::error::{CoverError, CoverResult};

/// Default quality carried with WebP requests.
pub const DEFAULT_QUALITY: u8 = 86;

/// Encoded output container.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    Png,
    /// Lossy WebP at the requested quality.
    #[default]
    Webp,
}

impl OutputFormat {
    /// MIME type of the encoded bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(CoverError::validation(
                "format",
                format!("unsupported output format '{other}' (expected png or webp)"),
            )),
        }
    }
}

/// Clamp a requested quality into `1..=100`.
pub fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Encode a straight-alpha image. `quality` is clamped into `1..=100` and drives the lossy WebP
/// encoder; PNG ignores it.
pub fn encode(img: &RgbaImage, format: OutputFormat, quality: u8) -> CoverResult<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let (w, h) = img.dimensions();
    let mut out = Vec::new();
    match format {
        OutputFormat::Png => image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
            .context("encode png")?,
        OutputFormat::Webp => {
            let encoded = webp::Encoder::from_rgba(img.as_raw(), w, h)
                .encode_simple(false, f32::from(quality))
                .map_err(|e| anyhow::anyhow!("encode webp: {e:?}"))?;
            out.extend_from_slice(&encoded);
        }
    }
    tracing::debug!(%format, quality, bytes = out.len(), "encoded cover");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
