use crate::assets::color::Rgba8;
use crate::assets::decode::decode_image_async;
use crate::encode::format::{EncodeOptions, ImageFormat, encode_surface};
use crate::foundation::error::{CopsError, CopsResult};
use crate::foundation::position::Gravity;
use crate::foundation::units::{UnitValue, resolve_units};
use crate::render::surface::Surface;

/// Target size plus the fit policy.
///
/// With neither `letterbox` nor `preserve_aspect_ratio` the content is stretched to the exact
/// target size. `letterbox` fills the frame with its color and fits the whole content inside it.
/// `preserve_aspect_ratio` alone scales the content to cover the frame and clips the overflow.
/// In both cases the orientation (default center) decides where the content sits.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeOptions {
    pub width: UnitValue,
    pub height: UnitValue,
    pub letterbox: Option<Rgba8>,
    pub preserve_aspect_ratio: Option<Gravity>,
}

impl ResizeOptions {
    pub fn new(width: impl Into<UnitValue>, height: impl Into<UnitValue>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
            letterbox: None,
            preserve_aspect_ratio: None,
        }
    }

    /// Same expression for both axes, e.g. `"50%"`.
    pub fn uniform(value: impl Into<UnitValue>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }

    pub fn with_letterbox(mut self, color: Rgba8) -> Self {
        self.letterbox = Some(color);
        self
    }

    pub fn with_preserve_aspect_ratio(mut self, orientation: Gravity) -> Self {
        self.preserve_aspect_ratio = Some(orientation);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Resize {
    opts: ResizeOptions,
}

impl Resize {
    /// Unit expressions are checked here so a typo fails before any image is read.
    pub fn new(opts: ResizeOptions) -> CopsResult<Self> {
        resolve_units(&opts.width, 1.0)?;
        resolve_units(&opts.height, 1.0)?;
        Ok(Self { opts })
    }

    pub fn options(&self) -> &ResizeOptions {
        &self.opts
    }

    /// Resolve the target size against the current surface size, rounded to whole pixels.
    pub fn target_size(&self, width: u32, height: u32) -> CopsResult<(u32, u32)> {
        let w = resolve_units(&self.opts.width, f64::from(width))?.round();
        let h = resolve_units(&self.opts.height, f64::from(height))?.round();
        if !(w >= 1.0 && h >= 1.0) {
            return Err(CopsError::invalid_dimensions(format!(
                "resize of {width}x{height} resolves to {w}x{h}"
            )));
        }
        if w > f64::from(u16::MAX) || h > f64::from(u16::MAX) {
            return Err(CopsError::invalid_dimensions(format!(
                "resize target {w}x{h} is too large"
            )));
        }
        Ok((w as u32, h as u32))
    }

    #[tracing::instrument(level = "debug", name = "resize", skip_all, fields(from = ?(surface.width(), surface.height())))]
    pub async fn apply(&self, surface: Surface) -> CopsResult<Surface> {
        let (tw, th) = self.target_size(surface.width(), surface.height())?;
        tracing::debug!(width = tw, height = th, "resize target");

        let png = encode_surface(&surface, ImageFormat::Png, &EncodeOptions::png())?;
        drop(surface);
        let snapshot = decode_image_async(png).await?;

        let mut out = Surface::new(tw, th)?;
        let (fw, fh) = (f64::from(tw), f64::from(th));
        let (sw, sh) = (f64::from(snapshot.width()), f64::from(snapshot.height()));

        let scale = match (self.opts.letterbox, self.opts.preserve_aspect_ratio) {
            (None, None) => {
                out.draw_image(&snapshot, 0.0, 0.0, Some((fw, fh)))?;
                return Ok(out);
            }
            (Some(color), _) => {
                out.clear(color);
                (fw / sw).min(fh / sh)
            }
            (None, Some(_)) => (fw / sw).max(fh / sh),
        };

        let (dw, dh) = (sw * scale, sh * scale);
        let at = self
            .opts
            .preserve_aspect_ratio
            .unwrap_or(Gravity::Center)
            .resolve(fw, fh, dw, dh);
        tracing::trace!(x = at.x, y = at.y, dw, dh, "fitted content");
        out.draw_image(&snapshot, at.x, at.y, Some((dw, dh)))?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/resize.rs"]
mod tests;
