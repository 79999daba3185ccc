//! Splitting the destination image into bands or tiles.
//!
//! Regions are expressed in image coordinates (the resized image, without
//! padding). Each region maps back to a window of the source, enlarged by a
//! sampling margin so the filter sees the same neighbours it would in a
//! single-pass render. Regions partition the image exactly: they never
//! overlap and never leave gaps.

use fit_layout::Dimensions;
use tiny_skia::{IntRect, Transform};

use crate::error::ResizeError;
use crate::rendering::Surface;
use crate::strategy::{ExecutionContext, Job, PeakTracker};

/// Destination rectangle inside the resized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Source rectangle read for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rows per band so that one destination band plus its source window stay
/// under `budget_bytes`.
pub fn band_height(source: Dimensions, image: Dimensions, budget_bytes: u64) -> u32 {
    let rows_per_row = source.height as f64 / image.height.max(1) as f64;
    let bytes_per_row = image.width as f64 * 4.0 + source.width as f64 * 4.0 * rows_per_row;
    let rows = (budget_bytes as f64 / bytes_per_row).floor();
    (rows as u32).clamp(1, image.height.max(1))
}

/// Full-width horizontal bands of `band_height` rows.
pub fn plan_bands(image: Dimensions, band_height: u32) -> Vec<Region> {
    plan_grid(image, image.width.max(1), band_height)
}

/// Destination tile side whose source window stays within `tile_side`
/// pixels per axis when shrinking by `scale`.
pub fn tile_side_for_scale(tile_side: u32, scale: (f64, f64)) -> u32 {
    let shrink = scale.0.min(scale.1).min(1.0);
    ((tile_side as f64 * shrink).floor() as u32).clamp(1, tile_side.max(1))
}

/// Square tiles of `tile_side`, row-major.
pub fn plan_tiles(image: Dimensions, tile_side: u32) -> Vec<Region> {
    plan_grid(image, tile_side, tile_side)
}

fn plan_grid(image: Dimensions, cell_width: u32, cell_height: u32) -> Vec<Region> {
    let cell_width = cell_width.max(1);
    let cell_height = cell_height.max(1);
    let mut regions = Vec::new();

    let mut y = 0;
    while y < image.height {
        let height = cell_height.min(image.height - y);
        let mut x = 0;
        while x < image.width {
            let width = cell_width.min(image.width - x);
            regions.push(Region { x, y, width, height });
            x += width;
        }
        y += height;
    }
    regions
}

/// Source pixels needed to render `region`, plus `margin` on every side,
/// clamped to the source bounds.
pub fn source_window(
    region: &Region,
    source: Dimensions,
    image: Dimensions,
    margin: u32,
) -> SourceWindow {
    let sx = image.width as f64 / source.width as f64;
    let sy = image.height as f64 / source.height as f64;

    let x0 = ((region.x as f64 / sx).floor() as u32).saturating_sub(margin);
    let y0 = ((region.y as f64 / sy).floor() as u32).saturating_sub(margin);
    let x1 = (((region.x + region.width) as f64 / sx).ceil() as u32)
        .saturating_add(margin)
        .min(source.width);
    let y1 = (((region.y + region.height) as f64 / sy).ceil() as u32)
        .saturating_add(margin)
        .min(source.height);

    let x0 = x0.min(source.width.saturating_sub(1));
    let y0 = y0.min(source.height.saturating_sub(1));
    SourceWindow {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0).max(1),
        height: y1.saturating_sub(y0).max(1),
    }
}

/// Transform placing `window` so that the global image scale applies and
/// the region's top-left lands at the scratch origin.
pub fn window_transform(window: &SourceWindow, region: &Region, scale: (f64, f64)) -> Transform {
    let (sx, sy) = scale;
    Transform::from_scale(sx as f32, sy as f32).post_translate(
        (window.x as f64 * sx - region.x as f64) as f32,
        (window.y as f64 * sy - region.y as f64) as f32,
    )
}

/// Render each region from its source window into a scratch surface and
/// composite it into `output` at its offset.
pub(crate) fn paint_regions(
    job: &Job<'_>,
    ctx: &ExecutionContext<'_>,
    output: &mut Surface,
    regions: &[Region],
    unit: &str,
    tracker: &mut PeakTracker,
) -> Result<(), ResizeError> {
    let source = Dimensions::new(job.source.width(), job.source.height());
    let image = job.layout.image_size;
    let scale = job.layout.scale_from(source);
    let origin = job.layout.position;
    let total = regions.len();

    for (index, region) in regions.iter().enumerate() {
        let window = source_window(region, source, image, ctx.config.sample_margin);
        let rect = IntRect::from_xywh(
            window.x as i32,
            window.y as i32,
            window.width,
            window.height,
        )
        .ok_or(ResizeError::SurfaceAllocation {
            width: window.width,
            height: window.height,
        })?;
        let pixels = job
            .source
            .clone_rect(rect)
            .ok_or(ResizeError::SurfaceAllocation {
                width: window.width,
                height: window.height,
            })?;
        let window_bytes = pixels.data().len() as u64;
        tracker.add(window_bytes);

        let transform = window_transform(&window, region, scale);
        let scratch = ctx
            .renderer
            .render_window(pixels.as_ref(), transform, region.size(), job.filter)?;
        tracker.add(scratch.byte_size());

        output.blit(&scratch, origin.x + region.x, origin.y + region.y);

        tracker.remove(scratch.byte_size());
        ctx.renderer.release(scratch);
        tracker.remove(window_bytes);

        ctx.report(
            percent(index + 1, total),
            &format!("{unit} {}/{total}", index + 1),
        );
    }
    Ok(())
}

pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}
