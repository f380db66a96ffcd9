use std::sync::{Arc, Mutex, PoisonError};

use crate::assets::color::Rgba8;
use crate::foundation::error::CopsResult;
use crate::foundation::position::{Gravity, PositionSpec, resolve_position};
use crate::render::surface::Surface;
use crate::render::text::{FontSpec, TextAlign, TextEngine};

pub const DEFAULT_FONT: &str = "50px sans-serif";
pub const DEFAULT_FILL: &str = "#999";

/// Text drawing options. String fields use canvas syntax and are parsed by [`Entitle::new`].
#[derive(Clone, Debug, PartialEq)]
pub struct EntitleOptions {
    pub text: String,
    pub font: String,
    pub fill: String,
    pub align: String,
    /// Anchor of the first line's baseline. Resolved with a zero-size content box, so `center`
    /// is the middle of the surface.
    pub position: PositionSpec,
    /// Font file to use instead of a system family.
    pub font_data: Option<Vec<u8>>,
}

impl Default for EntitleOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: DEFAULT_FONT.to_owned(),
            fill: DEFAULT_FILL.to_owned(),
            align: "center".to_owned(),
            position: PositionSpec::Gravity(Gravity::Center),
            font_data: None,
        }
    }
}

impl EntitleOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_align(mut self, align: impl Into<String>) -> Self {
        self.align = align.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<PositionSpec>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_font_data(mut self, bytes: Vec<u8>) -> Self {
        self.font_data = Some(bytes);
        self
    }
}

/// Draw a line of text onto the surface.
#[derive(Clone)]
pub struct Entitle {
    text: String,
    font: FontSpec,
    family: String,
    fill: Rgba8,
    align: TextAlign,
    position: PositionSpec,
    engine: Arc<Mutex<TextEngine>>,
}

impl std::fmt::Debug for Entitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entitle")
            .field("text", &self.text)
            .field("font", &self.font)
            .field("family", &self.family)
            .field("fill", &self.fill)
            .field("align", &self.align)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl Entitle {
    pub fn new(opts: EntitleOptions) -> CopsResult<Self> {
        let font: FontSpec = opts.font.parse()?;
        let fill: Rgba8 = opts.fill.parse()?;
        let align: TextAlign = opts.align.parse()?;

        let mut engine = TextEngine::new();
        let family = match &opts.font_data {
            Some(bytes) => engine.register_font(bytes)?,
            None => font.family.clone(),
        };

        Ok(Self {
            text: opts.text,
            font,
            family,
            fill,
            align,
            position: opts.position,
            engine: Arc::new(Mutex::new(engine)),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[tracing::instrument(level = "debug", name = "entitle", skip_all, fields(text = %self.text))]
    pub fn apply(&self, mut surface: Surface) -> CopsResult<Surface> {
        if self.text.is_empty() {
            return Ok(surface);
        }

        let anchor = resolve_position(
            &self.position,
            f64::from(surface.width()),
            f64::from(surface.height()),
            0.0,
            0.0,
        )?;
        tracing::trace!(x = anchor.x, y = anchor.y, "text anchor");

        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let layout = engine.layout(&self.text, &self.font, &self.family, self.fill);
        engine.fill_layout(&mut surface, &layout, anchor, self.align)?;
        Ok(surface)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/entitle.rs"]
mod tests;
