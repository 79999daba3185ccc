use fit_layout::Dimensions;

use crate::error::ResizeError;
use crate::strategy::region::{paint_regions, plan_tiles, tile_side_for_scale};
use crate::strategy::{Execution, ExecutionContext, Job, PeakTracker};

/// Square tile grid rendered into one output. Tiles shrink with the scale so
/// that both the scratch tile and its source window stay within one
/// `tile_side` square, whatever the source size.
pub(super) fn run(job: &Job<'_>, ctx: &ExecutionContext<'_>) -> Result<Execution, ResizeError> {
    let source = Dimensions::new(job.source.width(), job.source.height());
    let side = tile_side_for_scale(ctx.config.tile_side, job.layout.scale_from(source));
    let tiles = plan_tiles(job.layout.image_size, side);
    tracing::debug!(tiles = tiles.len(), side, "Tiled plan");

    let mut tracker = PeakTracker::default();
    let mut output = ctx.renderer.canvas(job.layout.canvas_size, &job.background)?;
    tracker.add(output.byte_size());

    if let Err(e) = paint_regions(job, ctx, &mut output, &tiles, "tile", &mut tracker) {
        ctx.renderer.release(output);
        return Err(e);
    }

    Ok(Execution {
        peak_bytes: tracker.peak_bytes(),
        surface: output,
    })
}
