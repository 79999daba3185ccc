//! fit-layout: output geometry for fit-mode image resizing
//!
//! Given source dimensions and a [`LayoutRequest`], [`compute_layout`]
//! returns the exact canvas size, resized image size and image position.
//! The computation is pure and deterministic, so it can be tested from a
//! table of `(source, request) -> result` rows.
//!
//! # Quick Start
//!
//! ```
//! use fit_layout::{compute_layout, Dimensions, FitMode, LayoutRequest, Point};
//!
//! let request = LayoutRequest::new(Some(300), Some(200), FitMode::Contain).with_padding(20u32);
//! let layout = compute_layout(Dimensions::new(300, 200), &request).unwrap();
//!
//! assert_eq!(layout.image_size, Dimensions::new(300, 200));
//! assert_eq!(layout.canvas_size, Dimensions::new(340, 240));
//! assert_eq!(layout.position, Point::new(20, 20));
//! ```
//!
//! # Fit Modes
//!
//! | Mode | Scale |
//! |------|-------|
//! | `cover` | `max(tw/sw, th/sh)`; overflow is kept, not cropped |
//! | `contain` | `min(tw/sw, th/sh)` |
//! | `fill` | `tw/sw` and `th/sh` independently |
//! | `maxFit` | `min(...)`, clamped to at most 1 |
//! | `minFit` | `min(...)`, clamped to at least 1 |
//!
//! `without_enlargement` and `without_reduction` apply the same clamps on top
//! of any mode. Padding is added around the rounded image size; it is never
//! used to center the image in the target box.

mod error;
mod fit;
mod geometry;
mod layout;


pub use error::{Axis, LayoutError, ParseFitModeError};
pub use fit::FitMode;
pub use geometry::{Dimensions, Padding, PaddingSpec, Point};
pub use layout::{compute_layout, LayoutRequest, LayoutResult};
