//! Surface transformations.
//!
//! Every operation takes the current [`Surface`] by value and returns the next one. Option
//! structs are validated when the operation is built, so configuration mistakes surface before
//! any input is read.

/// Overlay another image.
pub mod compose;
/// Caller-supplied drawing.
pub mod draw;
/// Text.
pub mod entitle;
/// Scaling and fitting.
pub mod resize;

use crate::assets::source::{ImageSource, coerce};
use crate::foundation::error::CopsResult;
use crate::render::surface::Surface;

pub use compose::{Compose, ComposeOptions};
pub use draw::{Draw, DrawFuture};
pub use entitle::{Entitle, EntitleOptions};
pub use resize::{Resize, ResizeOptions};

/// One pipeline stage.
#[derive(Clone, Debug)]
pub enum Operation {
    Resize(Resize),
    Compose(Compose),
    Entitle(Entitle),
    Draw(Draw),
}

impl Operation {
    pub fn resize(opts: ResizeOptions) -> CopsResult<Self> {
        Resize::new(opts).map(Self::Resize)
    }

    pub fn compose(opts: ComposeOptions) -> CopsResult<Self> {
        Compose::new(opts).map(Self::Compose)
    }

    pub fn entitle(opts: EntitleOptions) -> CopsResult<Self> {
        Entitle::new(opts).map(Self::Entitle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize(_) => "resize",
            Self::Compose(_) => "compose",
            Self::Entitle(_) => "entitle",
            Self::Draw(_) => "draw",
        }
    }

    pub async fn apply(&self, surface: Surface) -> CopsResult<Surface> {
        match self {
            Self::Resize(op) => op.apply(surface).await,
            Self::Compose(op) => op.apply(surface).await,
            Self::Entitle(op) => op.apply(surface),
            Self::Draw(op) => op.apply(surface).await,
        }
    }

    /// Coerce `source` first, then apply.
    pub async fn apply_source(&self, source: ImageSource) -> CopsResult<Surface> {
        let surface = coerce(source).await?;
        self.apply(surface).await
    }
}

impl From<Resize> for Operation {
    fn from(op: Resize) -> Self {
        Self::Resize(op)
    }
}

impl From<Compose> for Operation {
    fn from(op: Compose) -> Self {
        Self::Compose(op)
    }
}

impl From<Entitle> for Operation {
    fn from(op: Entitle) -> Self {
        Self::Entitle(op)
    }
}

impl From<Draw> for Operation {
    fn from(op: Draw) -> Self {
        Self::Draw(op)
    }
}
