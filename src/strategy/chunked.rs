use fit_layout::Dimensions;

use crate::error::ResizeError;
use crate::strategy::region::{band_height, paint_regions, plan_bands};
use crate::strategy::{Execution, ExecutionContext, Job, PeakTracker};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Horizontal bands sized to the chunk budget, rendered into one output.
pub(super) fn run(job: &Job<'_>, ctx: &ExecutionContext<'_>) -> Result<Execution, ResizeError> {
    let source = Dimensions::new(job.source.width(), job.source.height());
    let image = job.layout.image_size;
    let budget = (ctx.config.chunk_budget_mb * BYTES_PER_MB) as u64;
    let rows = band_height(source, image, budget);
    let bands = plan_bands(image, rows);
    tracing::debug!(bands = bands.len(), rows, "Chunked plan");

    let mut tracker = PeakTracker::default();
    let mut output = ctx.renderer.canvas(job.layout.canvas_size, &job.background)?;
    tracker.add(output.byte_size());

    if let Err(e) = paint_regions(job, ctx, &mut output, &bands, "band", &mut tracker) {
        ctx.renderer.release(output);
        return Err(e);
    }

    Ok(Execution {
        peak_bytes: tracker.peak_bytes(),
        surface: output,
    })
}
