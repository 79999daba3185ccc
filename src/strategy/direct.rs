use crate::error::ResizeError;
use crate::strategy::{Execution, ExecutionContext, Job};

/// One render of the full source.
pub(super) fn run(job: &Job<'_>, ctx: &ExecutionContext<'_>) -> Result<Execution, ResizeError> {
    let surface = ctx
        .renderer
        .render(job.source, &job.layout, &job.background, job.filter)?;
    ctx.report(100, "direct pass complete");

    Ok(Execution {
        peak_bytes: surface.byte_size(),
        surface,
    })
}
