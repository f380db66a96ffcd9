use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Rect};

use crate::assets::color::Rgba8;
use crate::assets::decode::DecodedImage;
use crate::foundation::error::{CopsError, CopsResult};
use crate::render::composite::{over, over_in_place, unpremultiply_pixel, unpremultiply_rgba8};

/// Anything that can be drawn onto a [`Surface`].
pub trait Drawable {
    fn dimensions(&self) -> (u32, u32);
    /// Premultiplied RGBA8, row-major, tightly packed.
    fn rgba8_premul(&self) -> &[u8];
}

impl Drawable for DecodedImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rgba8_premul(&self) -> &[u8] {
        DecodedImage::rgba8_premul(self)
    }
}

/// The canonical mutable drawing target every operation works on.
///
/// Pixels are premultiplied RGBA8. Both sides must be between 1 and 65535 pixels.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Drawable for Surface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rgba8_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

impl Surface {
    /// Allocate a fully transparent surface.
    pub fn new(width: u32, height: u32) -> CopsResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Allocate a surface at the image's natural size with the image drawn at the origin.
    pub fn from_decoded(image: &DecodedImage) -> CopsResult<Self> {
        Self::from_premul_rgba8(image.rgba8_premul(), image.width(), image.height())
    }

    pub(crate) fn from_premul_rgba8(rgba8_premul: &[u8], width: u32, height: u32) -> CopsResult<Self> {
        Ok(Self {
            pixmap: premul_bytes_to_pixmap(rgba8_premul, width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Straight-alpha RGBA of one pixel, like a canvas `getImageData` read.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let data = self.pixmap.data_as_u8_slice();
        Some(unpremultiply_pixel([
            data[idx],
            data[idx + 1],
            data[idx + 2],
            data[idx + 3],
        ]))
    }

    /// All pixels as straight-alpha RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        unpremultiply_rgba8(self.pixmap.data_as_u8_slice())
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        let premul = premul_color(color);
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Draw `image` with its top-left corner at (`x`, `y`), scaled to `size` when given.
    ///
    /// Nothing is clamped: content falling outside the surface is clipped.
    pub fn draw_image(
        &mut self,
        image: &impl Drawable,
        x: f64,
        y: f64,
        size: Option<(f64, f64)>,
    ) -> CopsResult<()> {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 {
            return Ok(());
        }
        let natural = size.is_none_or(|(w, h)| w == f64::from(iw) && h == f64::from(ih));
        if natural && let (Some(dx), Some(dy)) = (integral(x), integral(y)) {
            self.blit_over(image.rgba8_premul(), iw, ih, dx, dy);
            return Ok(());
        }

        let (tw, th) = size.unwrap_or((f64::from(iw), f64::from(ih)));
        if tw <= 0.0 || th <= 0.0 {
            return Ok(());
        }
        let pixmap = premul_bytes_to_pixmap(image.rgba8_premul(), iw, ih)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let transform = Affine::translate((x, y))
            * Affine::scale_non_uniform(tw / f64::from(iw), th / f64::from(ih));

        self.paint_layer(|ctx| {
            ctx.set_paint_transform(Affine::IDENTITY);
            ctx.set_transform(transform);
            ctx.set_paint(paint);
            ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(iw), f64::from(ih)));
            Ok(())
        })
    }

    /// Fill an axis-aligned rectangle, blending "source over" the current content.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba8) -> CopsResult<()> {
        if width <= 0.0 || height <= 0.0 || color.a == 0 {
            return Ok(());
        }
        if let (Some(x0), Some(y0), Some(x1), Some(y1)) = (
            integral(x),
            integral(y),
            integral(x + width),
            integral(y + height),
        ) {
            self.fill_px_rect(x0, y0, x1, y1, premul_color(color));
            return Ok(());
        }

        self.paint_layer(|ctx| {
            ctx.set_paint_transform(Affine::IDENTITY);
            ctx.set_transform(Affine::IDENTITY);
            ctx.set_paint(color.to_peniko());
            ctx.fill_rect(&Rect::new(x, y, x + width, y + height));
            Ok(())
        })
    }

    /// Rasterize whatever `draw` records into a transparent layer the size of this surface, then
    /// composite that layer over the current pixels.
    pub(crate) fn paint_layer(
        &mut self,
        draw: impl FnOnce(&mut vello_cpu::RenderContext) -> CopsResult<()>,
    ) -> CopsResult<()> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        draw(&mut ctx)?;
        ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut layer);
        over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
        )
    }

    fn blit_over(&mut self, src: &[u8], sw: u32, sh: u32, dx: i64, dy: i64) {
        let (dw, dh) = (i64::from(self.width()), i64::from(self.height()));
        let (sw, sh) = (i64::from(sw), i64::from(sh));
        let (x0, x1) = (dx.max(0), (dx + sw).min(dw));
        let (y0, y1) = (dy.max(0), (dy + sh).min(dh));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let dst = self.pixmap.data_as_u8_slice_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let si = (((y - dy) * sw + (x - dx)) * 4) as usize;
                let di = ((y * dw + x) * 4) as usize;
                let out = over(
                    [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]],
                    [src[si], src[si + 1], src[si + 2], src[si + 3]],
                );
                dst[di..di + 4].copy_from_slice(&out);
            }
        }
    }

    fn fill_px_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, premul: [u8; 4]) {
        let (dw, dh) = (i64::from(self.width()), i64::from(self.height()));
        let (x0, x1) = (x0.max(0), x1.min(dw));
        let (y0, y1) = (y0.max(0), y1.min(dh));
        let dst = self.pixmap.data_as_u8_slice_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let di = ((y * dw + x) * 4) as usize;
                let out = over([dst[di], dst[di + 1], dst[di + 2], dst[di + 3]], premul);
                dst[di..di + 4].copy_from_slice(&out);
            }
        }
    }
}

fn checked_dims(width: u32, height: u32) -> CopsResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(CopsError::invalid_dimensions(format!(
            "surface must be at least 1x1, got {width}x{height}"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| CopsError::invalid_dimensions("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CopsError::invalid_dimensions("surface height exceeds u16"))?;
    Ok((w, h))
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < 1e9).then_some(v as i64)
}

fn premul_color(c: Rgba8) -> [u8; 4] {
    let a = u16::from(c.a);
    let premul = |v: u8| -> u8 { ((u16::from(v) * a + 127) / 255) as u8 };
    [premul(c.r), premul(c.g), premul(c.b), c.a]
}

fn premul_bytes_to_pixmap(rgba8_premul: &[u8], width: u32, height: u32) -> CopsResult<vello_cpu::Pixmap> {
    let (w, h) = checked_dims(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CopsError::invalid_dimensions(
            "premultiplied image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
