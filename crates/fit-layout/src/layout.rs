//! Output geometry for a resize request.
//!
//! [`compute_layout`] is a pure function of the source dimensions and the
//! request. The result always satisfies
//! `canvas = image + padding` on both axes, with the image placed at
//! `(padding.left, padding.top)`. Padding is an additive inset, never a
//! centering frame.

use crate::error::{Axis, LayoutError};
use crate::fit::FitMode;
use crate::geometry::{Dimensions, Padding, PaddingSpec, Point};

/// Geometric part of a resize request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutRequest {
    /// Target width; derived from the aspect ratio when absent (except for `Fill`).
    pub width: Option<u32>,
    /// Target height; derived from the aspect ratio when absent (except for `Fill`).
    pub height: Option<u32>,
    pub fit: FitMode,
    pub padding: Padding,
    /// Clamp the scale to at most 1 regardless of fit mode.
    pub without_enlargement: bool,
    /// Clamp the scale to at least 1 regardless of fit mode.
    pub without_reduction: bool,
}

impl LayoutRequest {
    pub fn new(width: Option<u32>, height: Option<u32>, fit: FitMode) -> Self {
        Self {
            width,
            height,
            fit,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, padding: impl Into<PaddingSpec>) -> Self {
        self.padding = padding.into().normalize();
        self
    }
}

/// Computed output geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutResult {
    /// Full output surface: image plus padding.
    pub canvas_size: Dimensions,
    /// Rounded size of the resized image.
    pub image_size: Dimensions,
    /// Top-left corner of the image inside the canvas.
    pub position: Point,
}

impl LayoutResult {
    /// Layout that fills the whole canvas with the image (no padding).
    pub fn unpadded(size: Dimensions) -> Self {
        Self {
            canvas_size: size,
            image_size: size,
            position: Point::default(),
        }
    }

    /// Effective horizontal and vertical scale when `source` is drawn into
    /// `image_size`.
    pub fn scale_from(&self, source: Dimensions) -> (f64, f64) {
        (
            self.image_size.width as f64 / source.width as f64,
            self.image_size.height as f64 / source.height as f64,
        )
    }

    /// Padding implied by the canvas, image and position.
    pub fn padding(&self) -> Padding {
        Padding {
            top: self.position.y,
            left: self.position.x,
            right: self.canvas_size.width - self.image_size.width - self.position.x,
            bottom: self.canvas_size.height - self.image_size.height - self.position.y,
        }
    }
}

/// Compute the output geometry for `source` under `request`.
///
/// # Errors
///
/// - [`LayoutError::InvalidSource`] if the source has a zero side
/// - [`LayoutError::NonFinite`] if a scale factor is NaN or infinite
/// - [`LayoutError::EmptyDimension`] if the image rounds to zero on an axis
/// - [`LayoutError::TooLarge`] if the canvas does not fit in `u32`
///
/// # Example
///
/// ```
/// use fit_layout::{compute_layout, Dimensions, FitMode, LayoutRequest, PaddingSpec, Point};
///
/// let request = LayoutRequest::new(Some(400), Some(300), FitMode::Contain)
///     .with_padding(PaddingSpec::sides().top(10).bottom(30));
/// let layout = compute_layout(Dimensions::new(1000, 500), &request).unwrap();
///
/// assert_eq!(layout.image_size, Dimensions::new(400, 200));
/// assert_eq!(layout.canvas_size, Dimensions::new(400, 240));
/// assert_eq!(layout.position, Point::new(0, 10));
/// ```
pub fn compute_layout(
    source: Dimensions,
    request: &LayoutRequest,
) -> Result<LayoutResult, LayoutError> {
    if source.is_empty() {
        return Err(LayoutError::InvalidSource {
            width: source.width,
            height: source.height,
        });
    }

    let (scale_x, scale_y) = scale_factors(source, request);
    let image_w = finite(source.width as f64 * scale_x, Axis::Horizontal)?;
    let image_h = finite(source.height as f64 * scale_y, Axis::Vertical)?;

    let image_size = Dimensions::new(
        round_dimension(image_w, Axis::Horizontal)?,
        round_dimension(image_h, Axis::Vertical)?,
    );

    let padding = request.padding;
    let canvas_w = image_size
        .width
        .checked_add(padding.horizontal())
        .ok_or(LayoutError::TooLarge {
            axis: Axis::Horizontal,
            value: image_w + padding.horizontal() as f64,
        })?;
    let canvas_h = image_size
        .height
        .checked_add(padding.vertical())
        .ok_or(LayoutError::TooLarge {
            axis: Axis::Vertical,
            value: image_h + padding.vertical() as f64,
        })?;

    Ok(LayoutResult {
        canvas_size: Dimensions::new(canvas_w, canvas_h),
        image_size,
        position: Point::new(padding.left, padding.top),
    })
}

/// Per-axis scale factors, after fit-mode and enlargement/reduction clamps.
fn scale_factors(source: Dimensions, request: &LayoutRequest) -> (f64, f64) {
    let src_w = source.width as f64;
    let src_h = source.height as f64;

    if request.fit == FitMode::Fill {
        let target_w = request.width.map_or(src_w, |w| w as f64);
        let target_h = request.height.map_or(src_h, |h| h as f64);
        return (
            clamp_scale(target_w / src_w, request),
            clamp_scale(target_h / src_h, request),
        );
    }

    // Missing side follows the source aspect ratio.
    let (target_w, target_h) = match (request.width, request.height) {
        (Some(w), Some(h)) => (w as f64, h as f64),
        (Some(w), None) => (w as f64, src_h * w as f64 / src_w),
        (None, Some(h)) => (src_w * h as f64 / src_h, h as f64),
        (None, None) => (src_w, src_h),
    };

    let ratio_x = target_w / src_w;
    let ratio_y = target_h / src_h;
    let scale = match request.fit {
        FitMode::Cover => ratio_x.max(ratio_y),
        _ => ratio_x.min(ratio_y),
    };
    let scale = clamp_scale(scale, request);
    (scale, scale)
}

fn clamp_scale(scale: f64, request: &LayoutRequest) -> f64 {
    let mut scale = match request.fit {
        FitMode::MaxFit => scale.min(1.0),
        FitMode::MinFit => scale.max(1.0),
        _ => scale,
    };
    if request.without_enlargement {
        scale = scale.min(1.0);
    }
    if request.without_reduction {
        scale = scale.max(1.0);
    }
    scale
}

fn finite(value: f64, axis: Axis) -> Result<f64, LayoutError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::NonFinite { axis })
    }
}

fn round_dimension(value: f64, axis: Axis) -> Result<u32, LayoutError> {
    let rounded = value.round();
    if rounded < 1.0 {
        return Err(LayoutError::EmptyDimension { axis, value });
    }
    if rounded > u32::MAX as f64 {
        return Err(LayoutError::TooLarge { axis, value });
    }
    Ok(rounded as u32)
}
