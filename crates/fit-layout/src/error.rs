//! Error types for layout computation.

use std::fmt;

/// Axis a geometry error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "width"),
            Axis::Vertical => write!(f, "height"),
        }
    }
}

/// Error type for layout computation.
///
/// Returned by [`compute_layout`](crate::compute_layout) before any pixel
/// work happens; a request that produces a `LayoutError` never reaches a
/// renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Source image has a zero dimension
    InvalidSource {
        /// Source width
        width: u32,
        /// Source height
        height: u32,
    },
    /// A scale factor or coordinate evaluated to NaN or infinity
    NonFinite {
        /// Axis on which the value was produced
        axis: Axis,
    },
    /// A resulting dimension rounded to zero
    EmptyDimension {
        /// Axis of the empty dimension
        axis: Axis,
        /// The unrounded value that was computed
        value: f64,
    },
    /// A resulting dimension does not fit in 32 bits
    TooLarge {
        /// Axis of the oversized dimension
        axis: Axis,
        /// The unrounded value that was computed
        value: f64,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidSource { width, height } => {
                write!(f, "invalid source dimensions {}x{}", width, height)
            }
            LayoutError::NonFinite { axis } => {
                write!(f, "non-finite {} in computed layout", axis)
            }
            LayoutError::EmptyDimension { axis, value } => {
                write!(f, "computed {} {} rounds to zero", axis, value)
            }
            LayoutError::TooLarge { axis, value } => {
                write!(f, "computed {} {} exceeds the addressable range", axis, value)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Error type for parsing a [`FitMode`](crate::FitMode) token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFitModeError(pub String);

impl fmt::Display for ParseFitModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown fit mode '{}' (expected cover, contain, fill, maxFit or minFit)",
            self.0
        )
    }
}

impl std::error::Error for ParseFitModeError {}
