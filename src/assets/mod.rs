/// CSS-style color parsing.
pub mod color;
/// Byte decoding into premultiplied pixels.
pub mod decode;
/// Input kinds and their coercion into surfaces.
pub mod source;
