use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::assets::color::Rgba8;
use crate::assets::source::ImageSource;
use crate::encode::format::{EncodeOptions, ImageFormat};
use crate::encode::sink::{Output, Sink};
use crate::foundation::error::{CopsError, CopsResult};
use crate::foundation::position::{Gravity, PositionSpec};
use crate::foundation::units::UnitValue;
use crate::ops::{ComposeOptions, EntitleOptions, Operation, ResizeOptions};
use crate::pipeline::run_pipeline;
use crate::render::surface::Surface;

#[derive(Clone, Debug, Deserialize)]
struct RecipeDef {
    input: String,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    quality: Option<u8>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    operations: Vec<OpDef>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum OpDef {
    Resize {
        #[serde(default)]
        size: Option<Value>,
        #[serde(default)]
        width: Option<Value>,
        #[serde(default)]
        height: Option<Value>,
        #[serde(default)]
        letterbox: Option<Value>,
        #[serde(default, alias = "preserveAspectRatio")]
        preserve_aspect_ratio: Option<Value>,
    },
    Compose {
        #[serde(default)]
        image: Option<Value>,
        #[serde(default)]
        position: Option<Value>,
        #[serde(default)]
        gravity: Option<String>,
    },
    Entitle {
        #[serde(default)]
        text: String,
        #[serde(default)]
        font: Option<String>,
        #[serde(default)]
        fill: Option<String>,
        #[serde(default)]
        align: Option<String>,
        #[serde(default)]
        position: Option<Value>,
        #[serde(default)]
        font_file: Option<String>,
    },
}

/// A whole pipeline described in JSON:
///
/// ```json
/// {
///   "input": "photo.jpg",
///   "output": "thumb.png",
///   "operations": [
///     { "op": "resize", "size": "50%" },
///     { "op": "compose", "image": "logo.png", "gravity": "southeast" },
///     { "op": "entitle", "text": "hello", "position": { "left": 10, "bottom": "10%" } }
///   ]
/// }
/// ```
///
/// Relative paths resolve against `base_dir` (the recipe file's directory when loaded from disk).
/// `"-"` as input or output means stdin or stdout. Font files named by `font_file` are read while
/// the recipe is loaded, together with the JSON itself.
#[derive(Clone, Debug)]
pub struct Recipe {
    def: RecipeDef,
    base_dir: PathBuf,
    fonts: HashMap<PathBuf, Vec<u8>>,
}

impl Recipe {
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: impl Into<PathBuf>) -> CopsResult<Self> {
        let def: RecipeDef = serde_json::from_reader(r)
            .map_err(|e| CopsError::config(format!("parse recipe JSON: {e}")))?;
        let mut recipe = Self {
            def,
            base_dir: base_dir.into(),
            fonts: HashMap::new(),
        };
        recipe.load_fonts()?;
        Ok(recipe)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CopsResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| CopsError::config(format!("open recipe '{}': {e}", path.display())))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_reader(BufReader::new(f), base_dir)
    }

    fn load_fonts(&mut self) -> CopsResult<()> {
        let paths: Vec<PathBuf> = self
            .def
            .operations
            .iter()
            .filter_map(|op| match op {
                OpDef::Entitle {
                    font_file: Some(f), ..
                } => Some(self.resolve_path(f)),
                _ => None,
            })
            .collect();
        for path in paths {
            if self.fonts.contains_key(&path) {
                continue;
            }
            let bytes = std::fs::read(&path)
                .map_err(|e| CopsError::read(format!("font '{}': {e}", path.display())))?;
            tracing::debug!(path = %path.display(), len = bytes.len(), "loaded recipe font");
            self.fonts.insert(path, bytes);
        }
        Ok(())
    }

    fn resolve_path(&self, p: &str) -> PathBuf {
        let p = Path::new(p);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    pub fn source(&self) -> ImageSource {
        match self.def.input.as_str() {
            "-" => ImageSource::stdin(),
            p => ImageSource::Path(self.resolve_path(p)),
        }
    }

    pub fn output(&self) -> CopsResult<Output> {
        let format = self
            .def
            .format
            .as_deref()
            .map(ImageFormat::from_name)
            .transpose()?;
        let background = self
            .def
            .background
            .as_deref()
            .map(str::parse::<Rgba8>)
            .transpose()?;
        let options = EncodeOptions {
            format,
            quality: self.def.quality,
            background,
        };
        let sink = match self.def.output.as_deref() {
            None | Some("-") => Sink::stdout(),
            Some(p) => Sink::File(self.resolve_path(p)),
        };
        Output::new(sink, options)
    }

    /// Build every operation, failing on the first invalid one.
    pub fn operations(&self) -> CopsResult<Vec<Operation>> {
        self.def
            .operations
            .iter()
            .map(|op| self.build_op(op))
            .collect()
    }

    fn build_op(&self, op: &OpDef) -> CopsResult<Operation> {
        match op {
            OpDef::Resize {
                size,
                width,
                height,
                letterbox,
                preserve_aspect_ratio,
            } => {
                let unit = |v: Option<&Value>, axis: &str| -> CopsResult<UnitValue> {
                    v.or(size.as_ref())
                        .ok_or_else(|| {
                            CopsError::invalid_option(format!("resize needs '{axis}' or 'size'"))
                        })
                        .and_then(UnitValue::try_from)
                };
                let mut opts =
                    ResizeOptions::new(unit(width.as_ref(), "width")?, unit(height.as_ref(), "height")?);
                opts.letterbox = letterbox.as_ref().map(letterbox_color).transpose()?.flatten();
                opts.preserve_aspect_ratio = preserve_aspect_ratio
                    .as_ref()
                    .map(orientation)
                    .transpose()?
                    .flatten();
                Operation::resize(opts)
            }
            OpDef::Compose {
                image,
                position,
                gravity,
            } => {
                let image = image
                    .as_ref()
                    .map(|v| self.image_source(v))
                    .transpose()?;
                let opts = ComposeOptions {
                    image,
                    position: position.as_ref().map(PositionSpec::try_from).transpose()?,
                    gravity: gravity.as_deref().map(str::parse::<Gravity>).transpose()?,
                };
                Operation::compose(opts)
            }
            OpDef::Entitle {
                text,
                font,
                fill,
                align,
                position,
                font_file,
            } => {
                let mut opts = EntitleOptions::new(text.clone());
                if let Some(font) = font {
                    opts.font = font.clone();
                }
                if let Some(fill) = fill {
                    opts.fill = fill.clone();
                }
                if let Some(align) = align {
                    opts.align = align.clone();
                }
                if let Some(position) = position {
                    opts.position = PositionSpec::try_from(position)?;
                }
                if let Some(font_file) = font_file {
                    let path = self.resolve_path(font_file);
                    let bytes = self.fonts.get(&path).ok_or_else(|| {
                        CopsError::read(format!("font '{}' was not loaded", path.display()))
                    })?;
                    opts.font_data = Some(bytes.clone());
                }
                Operation::entitle(opts)
            }
        }
    }

    fn image_source(&self, value: &Value) -> CopsResult<ImageSource> {
        match ImageSource::try_from(value)? {
            ImageSource::Path(p) if p.is_relative() => Ok(ImageSource::Path(self.base_dir.join(p))),
            other => Ok(other),
        }
    }

    /// Build, then run the whole pipeline.
    pub async fn run(&self) -> CopsResult<Surface> {
        let ops = self.operations()?;
        let output = self.output()?;
        run_pipeline(self.source(), &ops, output).await
    }
}

/// `true` letterboxes with black, `false` disables it, a string is a color.
fn letterbox_color(v: &Value) -> CopsResult<Option<Rgba8>> {
    match v {
        Value::Bool(true) => Ok(Some(Rgba8::BLACK)),
        Value::Bool(false) | Value::Null => Ok(None),
        Value::String(s) => s.parse().map(Some),
        other => Err(CopsError::invalid_option(format!(
            "letterbox must be a boolean or a color, got {other}"
        ))),
    }
}

/// `true` keeps the aspect ratio centered, `false` stretches, a string names the orientation.
fn orientation(v: &Value) -> CopsResult<Option<Gravity>> {
    match v {
        Value::Bool(true) => Ok(Some(Gravity::Center)),
        Value::Bool(false) | Value::Null => Ok(None),
        Value::String(s) => s.parse().map(Some),
        other => Err(CopsError::invalid_option(format!(
            "preserve_aspect_ratio must be a boolean or an orientation, got {other}"
        ))),
    }
}

#[cfg(test)]
#[path = "../tests/unit/recipe.rs"]
mod tests;
