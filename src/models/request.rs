use std::str::FromStr;

use fit_layout::{FitMode, LayoutRequest, PaddingSpec};
use serde::Deserialize;

use crate::error::ParseTokenError;
use crate::models::Background;

/// What the caller cares about most when the engine picks a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Speed,
    #[default]
    Balanced,
    Quality,
}

/// Resampling quality for the copy operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

impl FromStr for Priority {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speed" => Ok(Priority::Speed),
            "balanced" => Ok(Priority::Balanced),
            "quality" => Ok(Priority::Quality),
            _ => Err(ParseTokenError {
                kind: "priority",
                token: s.to_string(),
            }),
        }
    }
}

impl FromStr for Quality {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            _ => Err(ParseTokenError {
                kind: "quality",
                token: s.to_string(),
            }),
        }
    }
}

/// A single resize job: target geometry plus rendering preferences.
///
/// ```
/// use rasterfit::{FitMode, Priority, ResizeRequest};
///
/// let request = ResizeRequest::new()
///     .width(400)
///     .height(300)
///     .fit(FitMode::Contain)
///     .padding(10u32)
///     .priority(Priority::Quality);
///
/// assert_eq!(request.layout.width, Some(400));
/// assert_eq!(request.layout.padding.top, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResizeRequest {
    pub layout: LayoutRequest,
    pub background: Background,
    pub priority: Priority,
    /// `None` uses the engine's configured default
    pub quality: Option<Quality>,
    /// Explicit smoothing override, wins over the quality-derived default
    pub smoothing: Option<bool>,
}

impl ResizeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.layout.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.layout.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: FitMode) -> Self {
        self.layout.fit = fit;
        self
    }

    pub fn padding(mut self, padding: impl Into<PaddingSpec>) -> Self {
        self.layout = self.layout.with_padding(padding);
        self
    }

    pub fn background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn without_enlargement(mut self, value: bool) -> Self {
        self.layout.without_enlargement = value;
        self
    }

    pub fn without_reduction(mut self, value: bool) -> Self {
        self.layout.without_reduction = value;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn smoothing(mut self, enabled: bool) -> Self {
        self.smoothing = Some(enabled);
        self
    }
}
