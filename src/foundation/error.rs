pub type CopsResult<T> = Result<T, CopsError>;

/// Errors raised while building or running an image pipeline.
///
/// Every variant is terminal for the pipeline invocation that raised it. Messages are plain
/// strings so the error is `Clone`: a memoized overlay resolution hands the same failure to every
/// caller waiting on it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CopsError {
    #[error("invalid units: {0}")]
    InvalidUnits(String),

    #[error("unsupported unit type: {0}")]
    UnsupportedUnitType(String),

    #[error("invalid position: {0}")]
    InvalidPositionSpec(String),

    #[error("unrecognized gravity: '{0}'")]
    InvalidGravity(String),

    #[error("unable to load canvas: {0}")]
    UnsupportedSourceType(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("compose requires the 'image' option")]
    MissingImageOption,

    #[error("unrecognized image type: {0}")]
    UnsupportedFormat(String),

    #[error("destination is not a writable stream: {0}")]
    NonStreamSink(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("draw error: {0}")]
    Draw(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CopsError {
    pub fn invalid_units(msg: impl Into<String>) -> Self {
        Self::InvalidUnits(msg.into())
    }

    pub fn unsupported_unit_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedUnitType(msg.into())
    }

    pub fn invalid_position(msg: impl Into<String>) -> Self {
        Self::InvalidPositionSpec(msg.into())
    }

    pub fn invalid_gravity(keyword: impl Into<String>) -> Self {
        Self::InvalidGravity(keyword.into())
    }

    pub fn unsupported_source(msg: impl Into<String>) -> Self {
        Self::UnsupportedSourceType(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat(name.into())
    }

    pub fn non_stream_sink(msg: impl Into<String>) -> Self {
        Self::NonStreamSink(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
