use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::foundation::error::CopsResult;
use crate::render::surface::Surface;

pub type DrawFuture = Pin<Box<dyn Future<Output = CopsResult<Surface>> + Send>>;

type SyncDrawFn = dyn Fn(&mut Surface) -> CopsResult<()> + Send + Sync;
type AsyncDrawFn = dyn Fn(Surface) -> DrawFuture + Send + Sync;

#[derive(Clone)]
enum DrawFn {
    Sync(Arc<SyncDrawFn>),
    Async(Arc<AsyncDrawFn>),
}

/// Caller-supplied drawing. The calling convention is chosen by the constructor.
#[derive(Clone)]
pub struct Draw {
    f: DrawFn,
}

impl std::fmt::Debug for Draw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.f {
            DrawFn::Sync(_) => "sync",
            DrawFn::Async(_) => "async",
        };
        f.debug_struct("Draw").field("kind", &kind).finish()
    }
}

impl Draw {
    /// Runs to completion on the pipeline task.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Surface) -> CopsResult<()> + Send + Sync + 'static,
    {
        Self {
            f: DrawFn::Sync(Arc::new(f)),
        }
    }

    /// Takes the surface by value and hands it back when the future completes.
    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Surface) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CopsResult<Surface>> + Send + 'static,
    {
        Self {
            f: DrawFn::Async(Arc::new(move |surface| -> DrawFuture { Box::pin(f(surface)) })),
        }
    }

    #[tracing::instrument(level = "debug", name = "draw", skip_all)]
    pub async fn apply(&self, mut surface: Surface) -> CopsResult<Surface> {
        match &self.f {
            DrawFn::Sync(f) => {
                f(&mut surface)?;
                Ok(surface)
            }
            DrawFn::Async(f) => f(surface).await,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/draw.rs"]
mod tests;
