use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use crate::assets::color::Rgba8;
use crate::foundation::error::{CopsError, CopsResult};
use crate::render::composite::flatten_to_rgb8;
use crate::render::surface::{Drawable, Surface};

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// `png`, `jpg` or `jpeg`, case-insensitive.
    pub fn from_name(name: &str) -> CopsResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(CopsError::unsupported_format(name)),
        }
    }

    /// Infer from the file extension. A path without an extension yields `None`.
    pub fn from_path(path: &Path) -> CopsResult<Option<Self>> {
        match path.extension() {
            None => Ok(None),
            Some(ext) => Self::from_name(&ext.to_string_lossy()).map(Some),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = CopsError;

    fn from_str(s: &str) -> CopsResult<Self> {
        Self::from_name(s)
    }
}

/// Encoder settings. Unset fields fall back to the destination's extension (format), the
/// `COPS_JPEG_QUALITY` environment variable or [`DEFAULT_JPEG_QUALITY`] (quality), and black
/// (the background JPEG output is flattened over).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodeOptions {
    pub format: Option<ImageFormat>,
    /// JPEG quality, 1..=100.
    pub quality: Option<u8>,
    pub background: Option<Rgba8>,
}

impl EncodeOptions {
    pub fn png() -> Self {
        Self {
            format: Some(ImageFormat::Png),
            ..Self::default()
        }
    }

    pub fn jpeg(quality: u8) -> Self {
        Self {
            format: Some(ImageFormat::Jpeg),
            quality: Some(quality),
            ..Self::default()
        }
    }

    fn jpeg_quality(&self) -> u8 {
        self.quality
            .or_else(jpeg_quality_from_env)
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(1, 100)
    }
}

fn jpeg_quality_from_env() -> Option<u8> {
    std::env::var("COPS_JPEG_QUALITY")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|&q| (1..=100).contains(&q))
}

/// Encode a surface. Alpha is kept for PNG and flattened over the background for JPEG.
pub fn encode_surface(
    surface: &Surface,
    format: ImageFormat,
    opts: &EncodeOptions,
) -> CopsResult<Vec<u8>> {
    let (width, height) = (surface.width(), surface.height());
    let mut buf = Vec::new();
    match format {
        ImageFormat::Png => {
            let img = image::RgbaImage::from_raw(width, height, surface.to_rgba8())
                .ok_or_else(|| CopsError::encode("surface buffer does not match its size"))?;
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| CopsError::encode(format!("png: {e}")))?;
        }
        ImageFormat::Jpeg => {
            let bg = opts.background.unwrap_or(Rgba8::BLACK);
            let rgb = flatten_to_rgb8(surface.rgba8_premul(), [bg.r, bg.g, bg.b]);
            let img = image::RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| CopsError::encode("surface buffer does not match its size"))?;
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, opts.jpeg_quality());
            encoder
                .encode_image(&img)
                .map_err(|e| CopsError::encode(format!("jpeg: {e}")))?;
        }
    }
    tracing::debug!(?format, width, height, len = buf.len(), "encoded surface");
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
