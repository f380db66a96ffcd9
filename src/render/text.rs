use std::collections::HashMap;
use std::str::FromStr;

use vello_cpu::kurbo::Affine;

use crate::assets::color::Rgba8;
use crate::foundation::error::{CopsError, CopsResult};
use crate::render::surface::Surface;

pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// The subset of the CSS `font` shorthand that canvas text drawing relies on:
/// `[italic|oblique] [bold|bolder|lighter|<100..900>] <size>(px|pt)[/<line-height>] [family list]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
    pub family: String,
    pub weight: Option<f32>,
    pub italic: bool,
}

impl FromStr for FontSpec {
    type Err = CopsError;

    fn from_str(s: &str) -> CopsResult<Self> {
        let mut italic = false;
        let mut weight = None;
        let mut tokens = s.split_whitespace();

        let size_px = loop {
            let Some(tok) = tokens.next() else {
                return Err(CopsError::invalid_option(format!(
                    "font '{s}' has no size (expected e.g. '50px Helvetica')"
                )));
            };
            match tok.to_ascii_lowercase().as_str() {
                "normal" | "small-caps" => {}
                "italic" | "oblique" => italic = true,
                "bold" => weight = Some(700.0),
                "bolder" => weight = Some(900.0),
                "lighter" => weight = Some(300.0),
                lower => {
                    if let Ok(w) = lower.parse::<f32>()
                        && (1.0..=1000.0).contains(&w)
                    {
                        weight = Some(w);
                        continue;
                    }
                    break parse_font_size(tok).ok_or_else(|| {
                        CopsError::invalid_option(format!("font '{s}': bad size '{tok}'"))
                    })?;
                }
            }
        };

        let family = tokens.collect::<Vec<_>>().join(" ");
        Ok(Self {
            size_px,
            family: if family.is_empty() {
                DEFAULT_FONT_FAMILY.to_owned()
            } else {
                family
            },
            weight,
            italic,
        })
    }
}

fn parse_font_size(tok: &str) -> Option<f32> {
    let size = tok.split('/').next()?;
    let (num, scale) = if let Some(n) = size.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = size.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else {
        return None;
    };
    num.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v * scale)
}

/// Horizontal placement of a line relative to its anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    fn anchor_fraction(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

impl FromStr for TextAlign {
    type Err = CopsError;

    fn from_str(s: &str) -> CopsResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "middle" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            _ => Err(CopsError::invalid_option(format!(
                "text align must be left, center or right, got '{s}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Shapes text with Parley and paints the glyph runs with `vello_cpu`.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    glyph_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            glyph_fonts: HashMap::new(),
        }
    }

    /// Register caller-supplied font bytes and return the family name they provide.
    pub(crate) fn register_font(&mut self, font_bytes: &[u8]) -> CopsResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CopsError::invalid_option("no font families registered from font bytes")
        })?;

        Ok(self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CopsError::invalid_option("registered font family has no name"))?
            .to_string())
    }

    pub(crate) fn layout(
        &mut self,
        text: &str,
        font: &FontSpec,
        family: &str,
        fill: Rgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_owned())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::from(fill)));
        if let Some(w) = font.weight {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::new(w),
            ));
        }
        if font.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Paint `layout` so that the first line's alphabetic baseline passes through `anchor`, with
    /// the measured line box shifted horizontally according to `align`.
    pub(crate) fn fill_layout(
        &mut self,
        surface: &mut Surface,
        layout: &parley::Layout<TextBrushRgba8>,
        anchor: kurbo::Point,
        align: TextAlign,
    ) -> CopsResult<()> {
        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or(0.0);
        let origin_x = anchor.x - f64::from(layout.width()) * align.anchor_fraction();
        let origin_y = anchor.y - baseline;
        tracing::trace!(origin_x, origin_y, "text origin");

        let glyph_fonts = &mut self.glyph_fonts;
        surface.paint_layer(|ctx| {
            ctx.set_paint_transform(Affine::IDENTITY);
            ctx.set_transform(Affine::translate((origin_x, origin_y)));

            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let font = run.run().font();
                    let key = (font.data.id(), font.index);
                    let glyph_font = glyph_fonts
                        .entry(key)
                        .or_insert_with(|| {
                            vello_cpu::peniko::FontData::new(
                                vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                                font.index,
                            )
                        })
                        .clone();

                    // Layout-space positions: run offset, advances and baseline applied.
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&glyph_font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
