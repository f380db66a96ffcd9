use std::sync::Arc;

use crate::foundation::error::{CopsError, CopsResult};
use crate::render::composite::premultiply_rgba8_in_place;

/// A decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CopsResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| CopsError::invalid_dimensions("image size overflow"))?;
        if rgba8.len() != expected {
            return Err(CopsError::invalid_dimensions(format!(
                "expected {expected} bytes for {width}x{height} rgba8, got {}",
                rgba8.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Decode any format the `image` crate understands.
pub fn decode_image(bytes: &[u8]) -> CopsResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CopsError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba8(width, height, rgba.into_raw())
}

/// [`decode_image`] on the blocking pool, so a large decode does not stall the runtime.
pub async fn decode_image_async(bytes: Vec<u8>) -> CopsResult<DecodedImage> {
    tracing::debug!(len = bytes.len(), "decoding image");
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| CopsError::decode(format!("decode task failed: {e}")))?
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
