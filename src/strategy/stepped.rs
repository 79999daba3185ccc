use fit_layout::{Dimensions, LayoutResult};

use crate::error::ResizeError;
use crate::models::Background;
use crate::rendering::Surface;
use crate::strategy::region::percent;
use crate::strategy::{Execution, ExecutionContext, Job, PeakTracker};

/// Intermediate sizes for a halving downscale from `source` towards `target`.
///
/// Each step halves an axis but never goes below the target on it; steps
/// stop once both axes are within 2x of the target. The final render to the
/// exact target is not part of the plan.
pub fn plan_steps(source: Dimensions, target: Dimensions) -> Vec<Dimensions> {
    let mut steps = Vec::new();
    let mut current = source;

    while current.width > target.width.saturating_mul(2)
        || current.height > target.height.saturating_mul(2)
    {
        let next = Dimensions::new(
            (current.width / 2).max(target.width),
            (current.height / 2).max(target.height),
        );
        if next == current {
            break;
        }
        steps.push(next);
        current = next;
    }
    steps
}

pub(super) fn run(job: &Job<'_>, ctx: &ExecutionContext<'_>) -> Result<Execution, ResizeError> {
    let source = Dimensions::new(job.source.width(), job.source.height());
    let steps = plan_steps(source, job.layout.image_size);
    let total = steps.len() + 1;
    let mut tracker = PeakTracker::default();
    let mut current: Option<Surface> = None;

    for (index, step) in steps.iter().enumerate() {
        let next = {
            let input = current.as_ref().map_or(job.source, |s| s.pixmap().as_ref());
            ctx.renderer.render(
                input,
                &LayoutResult::unpadded(*step),
                &Background::Transparent,
                job.filter,
            )
        };

        let next = match next {
            Ok(surface) => surface,
            Err(e) => {
                if let Some(previous) = current.take() {
                    ctx.renderer.release(previous);
                }
                return Err(e);
            }
        };
        tracker.add(next.byte_size());

        if let Some(previous) = current.replace(next) {
            tracker.remove(previous.byte_size());
            ctx.renderer.release(previous);
        }

        tracing::debug!(
            step = index + 1,
            width = step.width,
            height = step.height,
            "Stepped intermediate"
        );
        ctx.report(
            percent(index + 1, total),
            &format!("step {}/{total} at {}x{}", index + 1, step.width, step.height),
        );
    }

    let output = {
        let input = current.as_ref().map_or(job.source, |s| s.pixmap().as_ref());
        ctx.renderer
            .render(input, &job.layout, &job.background, job.filter)
    };
    if let Some(previous) = current.take() {
        ctx.renderer.release(previous);
    }
    let output = output?;
    tracker.add(output.byte_size());
    ctx.report(100, &format!("step {total}/{total} final"));

    Ok(Execution {
        peak_bytes: tracker.peak_bytes(),
        surface: output,
    })
}
