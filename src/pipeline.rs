use crate::assets::source::{ImageSource, coerce};
use crate::encode::sink::Output;
use crate::foundation::error::CopsResult;
use crate::ops::Operation;
use crate::render::surface::Surface;

/// Coerce `source` and apply `ops` in order. The first failure stops the chain.
pub async fn process(source: ImageSource, ops: &[Operation]) -> CopsResult<Surface> {
    let mut surface = coerce(source).await?;
    for (index, op) in ops.iter().enumerate() {
        tracing::debug!(index, op = op.name(), "apply");
        surface = op.apply(surface).await?;
    }
    Ok(surface)
}

/// Coerce, transform, encode, write.
///
/// Stages run strictly in order and the first error is the one returned; nothing is written to
/// `output` unless every operation succeeded. The final surface is handed back to the caller.
#[tracing::instrument(level = "info", skip_all, fields(ops = ops.len(), format = ?output.format()))]
pub async fn run_pipeline(
    source: ImageSource,
    ops: &[Operation],
    output: Output,
) -> CopsResult<Surface> {
    let surface = process(source, ops).await?;
    output.write(&surface).await?;
    tracing::info!(
        width = surface.width(),
        height = surface.height(),
        "pipeline complete"
    );
    Ok(surface)
}

/// A reusable list of operations.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    ops: Vec<Operation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, op: impl Into<Operation>) -> Self {
        self.ops.push(op.into());
        self
    }

    pub fn push(&mut self, op: impl Into<Operation>) {
        self.ops.push(op.into());
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub async fn process(&self, source: impl Into<ImageSource>) -> CopsResult<Surface> {
        process(source.into(), &self.ops).await
    }

    pub async fn run(&self, source: impl Into<ImageSource>, output: Output) -> CopsResult<Surface> {
        run_pipeline(source.into(), &self.ops, output).await
    }
}

impl FromIterator<Operation> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
