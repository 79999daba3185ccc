use std::sync::Arc;

use fit_layout::{Dimensions, LayoutResult};
use tiny_skia::{FilterQuality, PixmapRef, Transform};

use crate::error::ResizeError;
use crate::models::{Background, Quality};
use crate::rendering::Surface;
use crate::services::SurfacePool;

/// Map a quality level and an optional explicit smoothing override to a
/// resampling filter. The override always wins.
pub fn filter_quality(quality: Quality, smoothing: Option<bool>) -> FilterQuality {
    match (smoothing, quality) {
        (Some(false), _) => FilterQuality::Nearest,
        (None, Quality::Low) => FilterQuality::Nearest,
        (_, Quality::Low) | (_, Quality::Medium) => FilterQuality::Bilinear,
        (_, Quality::High) => FilterQuality::Bicubic,
    }
}

/// Draws a source onto pooled surfaces.
///
/// Every method performs a single `draw_pixmap` per call; the multi-pass
/// strategies are built on top of it.
pub struct Renderer {
    pool: Arc<SurfacePool>,
}

impl Renderer {
    pub fn new(pool: Arc<SurfacePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<SurfacePool> {
        &self.pool
    }

    /// Acquire a canvas and paint the background unless it is transparent.
    pub fn canvas(&self, size: Dimensions, background: &Background) -> Result<Surface, ResizeError> {
        let mut surface = self.pool.acquire(Some(size.width), Some(size.height))?;
        if let Some(color) = background.fill_color() {
            surface.pixmap_mut().fill(color);
        }
        Ok(surface)
    }

    /// Render the whole source into the image rectangle of `layout` with one
    /// copy. The source is never modified.
    pub fn render(
        &self,
        source: PixmapRef<'_>,
        layout: &LayoutResult,
        background: &Background,
        filter: FilterQuality,
    ) -> Result<Surface, ResizeError> {
        let mut canvas = self.canvas(layout.canvas_size, background)?;

        let (sx, sy) = layout.scale_from(Dimensions::new(source.width(), source.height()));
        let state = canvas.state_mut();
        state.transform = Transform::from_scale(sx as f32, sy as f32)
            .post_translate(layout.position.x as f32, layout.position.y as f32);
        state.quality = filter;

        canvas.draw(source);
        Ok(canvas)
    }

    /// Render a source window into a transparent scratch surface of `size`
    /// using a precomputed transform.
    pub fn render_window(
        &self,
        window: PixmapRef<'_>,
        transform: Transform,
        size: Dimensions,
        filter: FilterQuality,
    ) -> Result<Surface, ResizeError> {
        let mut scratch = self.pool.acquire(Some(size.width), Some(size.height))?;
        let state = scratch.state_mut();
        state.transform = transform;
        state.quality = filter;

        scratch.draw(window);
        Ok(scratch)
    }

    pub fn release(&self, surface: Surface) {
        self.pool.release(surface);
    }
}
