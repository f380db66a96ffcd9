//! `cops` runs image transformation pipelines.
//!
//! An input of any supported kind (file, bytes, stream, decoded pixels) is coerced into a
//! [`Surface`], passed through an ordered list of [`Operation`]s, encoded, and written to an
//! [`Output`]:
//!
//! - [`Resize`] scales with an optional fit policy
//! - [`Compose`] draws another image on top
//! - [`Entitle`] draws text
//! - [`Draw`] runs caller-supplied drawing code
//!
//! The first failing stage aborts the run and nothing is written.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

/// Encoders and output sinks.
pub mod encode;
/// The operation family.
pub mod ops;
/// Pipeline runner.
pub mod pipeline;
/// JSON pipeline descriptions.
pub mod recipe;
/// Drawing surface.
pub mod render;

pub use crate::assets::color::Rgba8;
pub use crate::assets::decode::{DecodedImage, decode_image, decode_image_async};
pub use crate::assets::source::{ImageSource, coerce};
pub use crate::foundation::error::{CopsError, CopsResult};
pub use crate::foundation::position::{
    Gravity, HorizontalOffset, Offset, PositionSpec, VerticalOffset, resolve_gravity,
    resolve_position,
};
pub use crate::foundation::units::{UnitValue, resolve_units};

pub use crate::encode::format::{EncodeOptions, ImageFormat, encode_surface};
pub use crate::encode::sink::{MemorySink, Output, Sink};
pub use crate::ops::{
    Compose, ComposeOptions, Draw, DrawFuture, Entitle, EntitleOptions, Operation, Resize,
    ResizeOptions,
};
pub use crate::pipeline::{Pipeline, process, run_pipeline};
pub use crate::recipe::Recipe;
pub use crate::render::surface::{Drawable, Surface};
pub use crate::render::text::{FontSpec, TextAlign};
pub use kurbo::Point;
