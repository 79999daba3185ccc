//! Integer geometry primitives shared by the layout computation and its callers.

/// Width and height in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered (as u64 to avoid overflow on huge sources).
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either side is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Top-left offset in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Normalized padding: an additive inset on each side of the resized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    /// Same inset on all four sides.
    pub const fn uniform(value: u32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// `left + right`
    #[inline]
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// `top + bottom`
    #[inline]
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Padding as callers supply it: a single scalar or a partial set of sides.
///
/// Unspecified sides of [`PaddingSpec::Sides`] default to 0.
///
/// ```
/// use fit_layout::{Padding, PaddingSpec};
///
/// assert_eq!(PaddingSpec::from(20).normalize(), Padding::uniform(20));
///
/// let partial = PaddingSpec::sides().top(10).bottom(30);
/// assert_eq!(
///     partial.normalize(),
///     Padding { top: 10, right: 0, bottom: 30, left: 0 }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingSpec {
    Uniform(u32),
    Sides {
        top: Option<u32>,
        right: Option<u32>,
        bottom: Option<u32>,
        left: Option<u32>,
    },
}

impl PaddingSpec {
    /// Empty partial spec, to be filled with the side setters.
    pub fn sides() -> Self {
        PaddingSpec::Sides {
            top: None,
            right: None,
            bottom: None,
            left: None,
        }
    }

    pub fn top(self, value: u32) -> Self {
        let (_, right, bottom, left) = self.parts();
        Self::from_parts(Some(value), right, bottom, left)
    }

    pub fn right(self, value: u32) -> Self {
        let (top, _, bottom, left) = self.parts();
        Self::from_parts(top, Some(value), bottom, left)
    }

    pub fn bottom(self, value: u32) -> Self {
        let (top, right, _, left) = self.parts();
        Self::from_parts(top, right, Some(value), left)
    }

    pub fn left(self, value: u32) -> Self {
        let (top, right, bottom, _) = self.parts();
        Self::from_parts(top, right, bottom, Some(value))
    }

    fn parts(self) -> (Option<u32>, Option<u32>, Option<u32>, Option<u32>) {
        match self {
            PaddingSpec::Uniform(v) => (Some(v), Some(v), Some(v), Some(v)),
            PaddingSpec::Sides {
                top,
                right,
                bottom,
                left,
            } => (top, right, bottom, left),
        }
    }

    fn from_parts(
        top: Option<u32>,
        right: Option<u32>,
        bottom: Option<u32>,
        left: Option<u32>,
    ) -> Self {
        PaddingSpec::Sides {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Resolve to concrete per-side padding.
    pub fn normalize(&self) -> Padding {
        match *self {
            PaddingSpec::Uniform(v) => Padding::uniform(v),
            PaddingSpec::Sides {
                top,
                right,
                bottom,
                left,
            } => Padding {
                top: top.unwrap_or(0),
                right: right.unwrap_or(0),
                bottom: bottom.unwrap_or(0),
                left: left.unwrap_or(0),
            },
        }
    }
}

impl Default for PaddingSpec {
    fn default() -> Self {
        PaddingSpec::Uniform(0)
    }
}

impl From<u32> for PaddingSpec {
    fn from(value: u32) -> Self {
        PaddingSpec::Uniform(value)
    }
}

impl From<Padding> for PaddingSpec {
    fn from(p: Padding) -> Self {
        PaddingSpec::Sides {
            top: Some(p.top),
            right: Some(p.right),
            bottom: Some(p.bottom),
            left: Some(p.left),
        }
    }
}

impl From<PaddingSpec> for Padding {
    fn from(spec: PaddingSpec) -> Self {
        spec.normalize()
    }
}
