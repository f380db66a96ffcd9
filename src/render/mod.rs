//! The drawing surface and what paints onto it.

/// Premultiplied RGBA8 blending helpers.
pub mod composite;
/// The mutable pixel target operations draw on.
pub mod surface;
/// Text shaping and glyph painting.
pub mod text;
