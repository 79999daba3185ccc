use fit_layout::LayoutError;
use thiserror::Error;

use crate::strategy::Strategy;

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Failed to allocate {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Strategy {strategy} failed: {source}")]
    StrategyExecution {
        strategy: Strategy,
        #[source]
        source: Box<ResizeError>,
    },

    #[error("Job {index} timed out after {timeout_ms} ms")]
    Timeout { index: usize, timeout_ms: u64 },

    #[error("Resize task failed: {0}")]
    Task(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl ResizeError {
    /// Wrap an error raised inside a non-direct executor.
    pub fn strategy(strategy: Strategy, source: ResizeError) -> Self {
        ResizeError::StrategyExecution {
            strategy,
            source: Box::new(source),
        }
    }

    /// True for failures the engine answers with a direct-strategy retry.
    pub fn is_strategy_failure(&self) -> bool {
        matches!(self, ResizeError::StrategyExecution { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Invalid color function: {0}")]
    InvalidFunction(String),

    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// A priority or quality token that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{token}'")]
pub struct ParseTokenError {
    pub kind: &'static str,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_layout::Axis;

    #[test]
    fn test_resize_error_surface_allocation() {
        let error = ResizeError::SurfaceAllocation {
            width: 40000,
            height: 10,
        };
        assert_eq!(error.to_string(), "Failed to allocate 40000x10 surface");
    }

    #[test]
    fn test_resize_error_timeout() {
        let error = ResizeError::Timeout {
            index: 3,
            timeout_ms: 250,
        };
        assert_eq!(error.to_string(), "Job 3 timed out after 250 ms");
    }

    #[test]
    fn test_resize_error_from_layout_error() {
        let layout = LayoutError::NonFinite {
            axis: Axis::Horizontal,
        };
        let error: ResizeError = layout.into();
        match error {
            ResizeError::Layout(_) => {}
            _ => panic!("Expected Layout variant"),
        }
    }

    #[test]
    fn test_strategy_error_keeps_source() {
        use std::error::Error;

        let error = ResizeError::strategy(
            Strategy::Tiled,
            ResizeError::SurfaceAllocation {
                width: 1,
                height: 2,
            },
        );
        assert!(error.is_strategy_failure());
        assert_eq!(
            error.to_string(),
            "Strategy tiled failed: Failed to allocate 1x2 surface"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_config_error_invalid() {
        let error = ConfigError::Invalid {
            field: "batch.concurrency",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid config value for batch.concurrency: must be at least 1"
        );
    }

    #[test]
    fn test_parse_color_error() {
        let error = ParseColorError::UnknownName("chartreuse".to_string());
        assert_eq!(error.to_string(), "Unknown color name: chartreuse");
    }

    #[test]
    fn test_parse_token_error() {
        let error = ParseTokenError {
            kind: "quality",
            token: "ultra".to_string(),
        };
        assert_eq!(error.to_string(), "unknown quality 'ultra'");
    }
}
