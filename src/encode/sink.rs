use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::encode::format::{EncodeOptions, ImageFormat, encode_surface};
use crate::foundation::error::{CopsError, CopsResult};
use crate::render::surface::Surface;

/// In-memory sink for tests and embedding. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn replace(&self, bytes: Vec<u8>) {
        *self.buf.lock().unwrap_or_else(PoisonError::into_inner) = bytes;
    }
}

/// Where encoded bytes go.
pub enum Sink {
    File(PathBuf),
    Stream(Box<dyn AsyncWrite + Send + Unpin>),
    Memory(MemorySink),
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => f.debug_tuple("File").field(p).finish(),
            Self::Stream(_) => f.write_str("Stream"),
            Self::Memory(m) => f.debug_tuple("Memory").field(m).finish(),
        }
    }
}

impl Sink {
    pub fn stream(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self::Stream(Box::new(writer))
    }

    pub fn stdout() -> Self {
        Self::stream(tokio::io::stdout())
    }
}

impl From<PathBuf> for Sink {
    fn from(p: PathBuf) -> Self {
        Self::File(p)
    }
}

impl From<&Path> for Sink {
    fn from(p: &Path) -> Self {
        Self::File(p.to_path_buf())
    }
}

impl From<&str> for Sink {
    fn from(p: &str) -> Self {
        Self::File(PathBuf::from(p))
    }
}

impl From<MemorySink> for Sink {
    fn from(m: MemorySink) -> Self {
        Self::Memory(m)
    }
}

/// The final pipeline stage: a destination plus the settings to encode for it.
///
/// The format is fixed at construction (explicit option, then file extension, then PNG), so a
/// bad destination is reported before any image is read.
#[derive(Debug)]
pub struct Output {
    sink: Sink,
    format: ImageFormat,
    options: EncodeOptions,
}

impl Output {
    pub fn new(sink: impl Into<Sink>, options: EncodeOptions) -> CopsResult<Self> {
        let sink = sink.into();
        if let Sink::File(path) = &sink {
            if path.as_os_str().is_empty() {
                return Err(CopsError::non_stream_sink("empty destination path"));
            }
            if path.is_dir() {
                return Err(CopsError::non_stream_sink(format!(
                    "'{}' is a directory",
                    path.display()
                )));
            }
        }

        let format = match (options.format, &sink) {
            (Some(format), _) => format,
            (None, Sink::File(path)) => ImageFormat::from_path(path)?.unwrap_or_default(),
            (None, _) => ImageFormat::Png,
        };
        Ok(Self {
            sink,
            format,
            options,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encode `surface` completely, then hand the bytes to the destination.
    #[tracing::instrument(level = "debug", skip_all, fields(format = ?self.format))]
    pub async fn write(self, surface: &Surface) -> CopsResult<()> {
        let bytes = encode_surface(surface, self.format, &self.options)?;
        match self.sink {
            Sink::File(path) => tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| CopsError::write(format!("'{}': {e}", path.display())))?,
            Sink::Stream(mut writer) => {
                writer
                    .write_all(&bytes)
                    .await
                    .map_err(|e| CopsError::write(e.to_string()))?;
                writer
                    .flush()
                    .await
                    .map_err(|e| CopsError::write(e.to_string()))?;
            }
            Sink::Memory(mem) => mem.replace(bytes),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
