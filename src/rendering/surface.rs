//! Owned raster surfaces handed out by the pool.
//!
//! A [`Surface`] wraps a `tiny_skia::Pixmap` together with the drawing state
//! the renderer applies when it copies into it. Ownership encodes the
//! lifecycle: the pool owns idle surfaces, a caller owns an in-use one, and
//! [`Surface::dispose`] consumes the value so a disposed surface cannot be
//! touched again. A surface handed out by a pool carries a [`Lease`], so
//! dropping it without a release still clears the pool's in-use record.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use fit_layout::Dimensions;
use tiny_skia::{
    BlendMode, Color, FilterQuality, Pixmap, PixmapPaint, PixmapRef, PremultipliedColorU8,
    Transform,
};

use crate::error::ResizeError;
use crate::models::PoolConfig;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Raster limits a surface allocation must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLimits {
    pub max_side: u32,
    pub max_pixels: u64,
}

impl SurfaceLimits {
    pub fn check(&self, width: u32, height: u32) -> Result<(), ResizeError> {
        let area = width as u64 * height as u64;
        if width == 0
            || height == 0
            || width > self.max_side
            || height > self.max_side
            || area > self.max_pixels
        {
            return Err(ResizeError::SurfaceAllocation { width, height });
        }
        Ok(())
    }

    fn allocate(&self, width: u32, height: u32) -> Result<Pixmap, ResizeError> {
        self.check(width, height)?;
        Pixmap::new(width, height).ok_or(ResizeError::SurfaceAllocation { width, height })
    }
}

impl Default for SurfaceLimits {
    fn default() -> Self {
        Self::from(&PoolConfig::default())
    }
}

impl From<&PoolConfig> for SurfaceLimits {
    fn from(config: &PoolConfig) -> Self {
        Self {
            max_side: config.max_surface_side,
            max_pixels: config.max_surface_pixels,
        }
    }
}

/// Drawing state applied when a source is copied onto a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Transform,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub quality: FilterQuality,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        }
    }
}

/// Ids of surfaces a pool has handed out and not yet taken back.
pub(crate) type InUseIds = Mutex<HashSet<u64>>;

/// A pool's claim on one handed-out surface. Dropping it removes the id
/// from the pool's in-use set; a pool that is already gone is ignored.
#[derive(Debug)]
pub(crate) struct Lease {
    id: u64,
    in_use: Weak<InUseIds>,
}

impl Lease {
    /// Record `id` as in use and return the claim that clears it.
    pub(crate) fn register(id: u64, in_use: &Arc<InUseIds>) -> Self {
        in_use
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        Self {
            id,
            in_use: Arc::downgrade(in_use),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(in_use) = self.in_use.upgrade() {
            in_use
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

pub struct Surface {
    id: u64,
    pixmap: Pixmap,
    state: DrawState,
    lease: Option<Lease>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// Allocate a fresh, fully transparent surface.
    pub fn allocate(width: u32, height: u32, limits: &SurfaceLimits) -> Result<Self, ResizeError> {
        let pixmap = limits.allocate(width, height)?;
        Ok(Self {
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            pixmap,
            state: DrawState::default(),
            lease: None,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// Bytes held by the pixel buffer (RGBA, 4 bytes per pixel).
    pub fn byte_size(&self) -> u64 {
        self.pixmap.data().len() as u64
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }

    /// True while a pool tracks this surface as handed out.
    pub fn is_leased(&self) -> bool {
        self.lease.is_some()
    }

    pub(crate) fn set_lease(&mut self, lease: Lease) {
        self.lease = Some(lease);
    }

    pub(crate) fn take_lease(&mut self) -> Option<Lease> {
        self.lease.take()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    /// Clear the pixels and restore the default drawing state.
    pub fn reset(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.state = DrawState::default();
    }

    /// Reset, reallocating the pixel buffer when the size changes.
    ///
    /// On failure the surface keeps its previous buffer.
    pub fn reshape(
        &mut self,
        width: u32,
        height: u32,
        limits: &SurfaceLimits,
    ) -> Result<(), ResizeError> {
        if self.width() == width && self.height() == height {
            self.reset();
            return Ok(());
        }
        self.pixmap = limits.allocate(width, height)?;
        self.state = DrawState::default();
        Ok(())
    }

    /// Copy `source` onto this surface using the current drawing state.
    pub fn draw(&mut self, source: PixmapRef<'_>) {
        let paint = PixmapPaint {
            opacity: self.state.opacity,
            blend_mode: self.state.blend_mode,
            quality: self.state.quality,
        };
        self.pixmap
            .draw_pixmap(0, 0, source, &paint, self.state.transform, None);
    }

    /// Composite another surface 1:1 at an integer offset.
    pub fn blit(&mut self, source: &Surface, x: u32, y: u32) {
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Nearest,
        };
        self.pixmap.draw_pixmap(
            x as i32,
            y as i32,
            source.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ResizeError> {
        self.pixmap
            .encode_png()
            .map_err(|e| ResizeError::Encode(e.to_string()))
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Free the pixel buffer.
    pub fn dispose(self) {
        tracing::trace!(id = self.id, bytes = self.byte_size(), "Disposing surface");
    }
}
