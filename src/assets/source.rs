use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::assets::decode::{DecodedImage, decode_image_async};
use crate::foundation::error::{CopsError, CopsResult};
use crate::foundation::units::json_type_name;
use crate::render::surface::Surface;

/// Any input a pipeline or an overlay can start from.
pub enum ImageSource {
    /// Read the whole file, then decode.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// Already decoded pixels.
    Decoded(DecodedImage),
    /// Drained to end-of-stream, then decoded.
    Stream(Box<dyn AsyncRead + Send + Unpin>),
    /// Already a surface; passed through untouched.
    Surface(Surface),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::Decoded(img) => write!(f, "Decoded({}x{})", img.width(), img.height()),
            Self::Stream(_) => f.write_str("Stream"),
            Self::Surface(s) => f.debug_tuple("Surface").field(s).finish(),
        }
    }
}

impl ImageSource {
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    pub fn stdin() -> Self {
        Self::stream(tokio::io::stdin())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Bytes(_) => "bytes",
            Self::Decoded(_) => "decoded",
            Self::Stream(_) => "stream",
            Self::Surface(_) => "surface",
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for ImageSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(p: &str) -> Self {
        Self::Path(PathBuf::from(p))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<DecodedImage> for ImageSource {
    fn from(img: DecodedImage) -> Self {
        Self::Decoded(img)
    }
}

impl From<Surface> for ImageSource {
    fn from(s: Surface) -> Self {
        Self::Surface(s)
    }
}

impl TryFrom<&serde_json::Value> for ImageSource {
    type Error = CopsError;

    /// Configuration files can only name image files.
    fn try_from(value: &serde_json::Value) -> CopsResult<Self> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Ok(Self::Path(PathBuf::from(s))),
            serde_json::Value::String(_) => Err(CopsError::unsupported_source("empty path")),
            other => Err(CopsError::unsupported_source(json_type_name(other))),
        }
    }
}

/// Turn any [`ImageSource`] into a [`Surface`].
///
/// Every encoded input funnels through one decode path: paths and streams are read fully into
/// memory first, then treated as bytes.
#[tracing::instrument(level = "debug", skip_all, fields(kind = source.kind()))]
pub async fn coerce(source: ImageSource) -> CopsResult<Surface> {
    match source {
        ImageSource::Surface(surface) => Ok(surface),
        ImageSource::Decoded(image) => Surface::from_decoded(&image),
        ImageSource::Bytes(bytes) => bytes_to_surface(bytes).await,
        ImageSource::Path(path) => {
            let bytes = read_file(&path).await?;
            bytes_to_surface(bytes).await
        }
        ImageSource::Stream(reader) => {
            let bytes = drain(reader).await?;
            bytes_to_surface(bytes).await
        }
    }
}

async fn bytes_to_surface(bytes: Vec<u8>) -> CopsResult<Surface> {
    let image = decode_image_async(bytes).await?;
    tracing::debug!(width = image.width(), height = image.height(), "decoded");
    Surface::from_decoded(&image)
}

async fn read_file(path: &Path) -> CopsResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| CopsError::read(format!("'{}': {e}", path.display())))
}

async fn drain(mut reader: Box<dyn AsyncRead + Send + Unpin>) -> CopsResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| CopsError::stream(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
