use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::assets::source::{ImageSource, coerce};
use crate::foundation::error::{CopsError, CopsResult};
use crate::foundation::position::{Gravity, PositionSpec, resolve_position};
use crate::render::surface::Surface;

#[derive(Debug, Default)]
pub struct ComposeOptions {
    /// Required. Resolved once, on first use.
    pub image: Option<ImageSource>,
    /// Top-left of the overlay. Takes precedence over `gravity`.
    pub position: Option<PositionSpec>,
    /// Anchor that accounts for the overlay's own size.
    pub gravity: Option<Gravity>,
}

impl ComposeOptions {
    pub fn new(image: impl Into<ImageSource>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: PositionSpec) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = Some(gravity);
        self
    }
}

type SharedOverlay = Result<Arc<Surface>, CopsError>;

enum OverlayState {
    Unresolved(ImageSource),
    Pending(Vec<oneshot::Sender<SharedOverlay>>),
    Resolved(SharedOverlay),
}

/// Resolves the overlay source at most once and fans the outcome out to every caller, including
/// callers that arrived while the first resolution was still in flight. Failures are cached too.
struct OverlayCell {
    state: Mutex<OverlayState>,
}

enum Step {
    Ready(SharedOverlay),
    Wait(oneshot::Receiver<SharedOverlay>),
    Resolve(ImageSource),
}

impl OverlayCell {
    fn new(source: ImageSource) -> Self {
        Self {
            state: Mutex::new(OverlayState::Unresolved(source)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn get(&self) -> SharedOverlay {
        let step = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, OverlayState::Pending(Vec::new())) {
                OverlayState::Resolved(result) => {
                    *state = OverlayState::Resolved(result.clone());
                    Step::Ready(result)
                }
                OverlayState::Pending(mut waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    *state = OverlayState::Pending(waiters);
                    Step::Wait(rx)
                }
                OverlayState::Unresolved(source) => Step::Resolve(source),
            }
        };

        match step {
            Step::Ready(result) => result,
            Step::Wait(rx) => rx.await.unwrap_or_else(|_| Err(interrupted())),
            Step::Resolve(source) => {
                tracing::debug!(?source, "resolving overlay");
                let mut guard = SettleOnDrop {
                    cell: self,
                    armed: true,
                };
                let result = coerce(source).await.map(Arc::new);
                guard.armed = false;
                self.settle(result.clone());
                result
            }
        }
    }

    fn settle(&self, result: SharedOverlay) {
        let waiters = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, OverlayState::Resolved(result.clone())) {
                OverlayState::Pending(waiters) => waiters,
                _ => Vec::new(),
            }
        };
        tracing::debug!(waiters = waiters.len(), ok = result.is_ok(), "overlay settled");
        for tx in waiters {
            let _ = tx.send(result.clone());
        }
    }
}

fn interrupted() -> CopsError {
    CopsError::read("overlay resolution was interrupted")
}

/// Keeps waiters from hanging if the resolving future is dropped mid-flight.
struct SettleOnDrop<'a> {
    cell: &'a OverlayCell,
    armed: bool,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cell.settle(Err(interrupted()));
        }
    }
}

/// Draw another image on top of the surface. Clones share the resolved overlay.
#[derive(Clone)]
pub struct Compose {
    overlay: Arc<OverlayCell>,
    position: Option<PositionSpec>,
    gravity: Option<Gravity>,
}

impl std::fmt::Debug for Compose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compose")
            .field("position", &self.position)
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl Compose {
    pub fn new(opts: ComposeOptions) -> CopsResult<Self> {
        let image = opts.image.ok_or(CopsError::MissingImageOption)?;
        Ok(Self {
            overlay: Arc::new(OverlayCell::new(image)),
            position: opts.position,
            gravity: opts.gravity,
        })
    }

    /// The overlay surface, resolving it on first call.
    pub async fn overlay(&self) -> CopsResult<Arc<Surface>> {
        self.overlay.get().await
    }

    #[tracing::instrument(level = "debug", name = "compose", skip_all)]
    pub async fn apply(&self, mut surface: Surface) -> CopsResult<Surface> {
        let overlay = self.overlay().await?;
        let (cw, ch) = (f64::from(surface.width()), f64::from(surface.height()));
        let (ow, oh) = (f64::from(overlay.width()), f64::from(overlay.height()));

        let at = match (&self.position, self.gravity) {
            (Some(position), _) => resolve_position(position, cw, ch, 0.0, 0.0)?,
            (None, Some(gravity)) => gravity.resolve(cw, ch, ow, oh),
            (None, None) => Gravity::Center.resolve(cw, ch, ow, oh),
        };
        tracing::trace!(x = at.x, y = at.y, "overlay origin");

        surface.draw_image(overlay.as_ref(), at.x, at.y, None)?;
        Ok(surface)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/compose.rs"]
mod tests;
