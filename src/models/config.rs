use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::Quality;

/// Engine configuration, usually parsed from YAML supplied by the host.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct EngineConfig {
    /// Strategy selection thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Surface pool sizing and eviction
    #[serde(default)]
    pub pool: PoolConfig,

    /// Memory monitor behaviour
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Executor tuning
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Batch defaults
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Thresholds consulted by the strategy selector.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Thresholds {
    /// Below this many source pixels the selector always picks `direct`
    #[serde(default = "default_high_res_pixel_threshold")]
    pub high_res_pixel_threshold: u64,

    /// Above this many source pixels memory-driven choices become `tiled`
    #[serde(default = "default_tile_pixel_threshold")]
    pub tile_pixel_threshold: u64,

    /// Estimated memory (MB) at which memory is considered constrained
    #[serde(default = "default_memory_warning_mb")]
    pub memory_warning_mb: f64,

    /// Estimated memory (MB) above which chunked/tiled is forced
    #[serde(default = "default_auto_tile_mb")]
    pub auto_tile_mb: f64,

    /// Jobs slower than this are reported as slow
    #[serde(default = "default_time_warning_secs")]
    pub time_warning_secs: f64,

    /// Shrink factor at which `quality` priority prefers `stepped`
    #[serde(default = "default_stepped_min_ratio")]
    pub stepped_min_ratio: f64,
}

fn default_high_res_pixel_threshold() -> u64 {
    8_000_000
}

fn default_tile_pixel_threshold() -> u64 {
    16_000_000
}

fn default_memory_warning_mb() -> f64 {
    200.0
}

fn default_auto_tile_mb() -> f64 {
    300.0
}

fn default_time_warning_secs() -> f64 {
    10.0
}

fn default_stepped_min_ratio() -> f64 {
    2.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_res_pixel_threshold: default_high_res_pixel_threshold(),
            tile_pixel_threshold: default_tile_pixel_threshold(),
            memory_warning_mb: default_memory_warning_mb(),
            auto_tile_mb: default_auto_tile_mb(),
            time_warning_secs: default_time_warning_secs(),
            stepped_min_ratio: default_stepped_min_ratio(),
        }
    }
}

/// Surface pool configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PoolConfig {
    /// Fixed slot count; derived from available memory when absent
    #[serde(default)]
    pub max_size: Option<usize>,

    /// Surfaces with more than `max_pooled_side²` pixels are never pooled
    #[serde(default = "default_max_pooled_side")]
    pub max_pooled_side: u32,

    /// Retained memory (MB) above which the pool evicts
    #[serde(default = "default_pressure_threshold_mb")]
    pub pressure_threshold_mb: f64,

    /// Fraction of idle surfaces evicted under pressure (rounded up)
    #[serde(default = "default_eviction_ratio")]
    pub eviction_ratio: f64,

    /// Largest side a surface may have
    #[serde(default = "default_max_surface_side")]
    pub max_surface_side: u32,

    /// Largest pixel count a surface may have
    #[serde(default = "default_max_surface_pixels")]
    pub max_surface_pixels: u64,
}

fn default_max_pooled_side() -> u32 {
    2048
}

fn default_pressure_threshold_mb() -> f64 {
    256.0
}

fn default_eviction_ratio() -> f64 {
    0.3
}

fn default_max_surface_side() -> u32 {
    32_767
}

fn default_max_surface_pixels() -> u64 {
    268_435_456
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            max_pooled_side: default_max_pooled_side(),
            pressure_threshold_mb: default_pressure_threshold_mb(),
            eviction_ratio: default_eviction_ratio(),
            max_surface_side: default_max_surface_side(),
            max_surface_pixels: default_max_surface_pixels(),
        }
    }
}

/// Memory monitor configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Pressure above which `check_and_optimize` clears the pool
    #[serde(default = "default_critical_pressure")]
    pub critical_pressure: f64,

    /// Pressure above which the monitor recommends memory-efficient execution
    #[serde(default = "default_recommend_pressure")]
    pub recommend_pressure: f64,

    /// Projected share of the limit above which memory-efficient execution is recommended
    #[serde(default = "default_projected_usage_ratio")]
    pub projected_usage_ratio: f64,

    /// Minimum time between two optimizations
    #[serde(default = "default_optimize_interval_ms")]
    pub optimize_interval_ms: u64,

    /// Assumed usage when the platform reports nothing
    #[serde(default = "default_fallback_used_mb")]
    pub fallback_used_mb: u64,

    /// Assumed limit when the platform reports nothing
    #[serde(default = "default_fallback_limit_mb")]
    pub fallback_limit_mb: u64,

    /// Processing overhead multiplier applied to raw RGBA size
    #[serde(default = "default_overhead_factor")]
    pub overhead_factor: u64,
}

fn default_critical_pressure() -> f64 {
    0.8
}

fn default_recommend_pressure() -> f64 {
    0.7
}

fn default_projected_usage_ratio() -> f64 {
    0.9
}

fn default_optimize_interval_ms() -> u64 {
    5000
}

fn default_fallback_used_mb() -> u64 {
    256
}

fn default_fallback_limit_mb() -> u64 {
    512
}

fn default_overhead_factor() -> u64 {
    2
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            critical_pressure: default_critical_pressure(),
            recommend_pressure: default_recommend_pressure(),
            projected_usage_ratio: default_projected_usage_ratio(),
            optimize_interval_ms: default_optimize_interval_ms(),
            fallback_used_mb: default_fallback_used_mb(),
            fallback_limit_mb: default_fallback_limit_mb(),
            overhead_factor: default_overhead_factor(),
        }
    }
}

/// Executor tuning.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Memory budget (MB) for one chunked band
    #[serde(default = "default_chunk_budget_mb")]
    pub chunk_budget_mb: f64,

    /// Side of one destination tile
    #[serde(default = "default_tile_side")]
    pub tile_side: u32,

    /// Extra source pixels read around each band or tile for filtering
    #[serde(default = "default_sample_margin")]
    pub sample_margin: u32,

    /// Quality used when a request does not set one
    #[serde(default)]
    pub default_quality: Quality,
}

fn default_chunk_budget_mb() -> f64 {
    32.0
}

fn default_tile_side() -> u32 {
    1024
}

fn default_sample_margin() -> u32 {
    2
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            chunk_budget_mb: default_chunk_budget_mb(),
            tile_side: default_tile_side(),
            sample_margin: default_sample_margin(),
            default_quality: Quality::default(),
        }
    }
}

/// Batch defaults.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Jobs per concurrent window
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-job timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_concurrency() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document, falling back to defaults when it is malformed.
    pub fn parse_or_default(content: &str) -> Self {
        match Self::from_yaml_str(content) {
            Ok(config) => {
                tracing::info!(
                    high_res_pixels = config.thresholds.high_res_pixel_threshold,
                    auto_tile_mb = config.thresholds.auto_tile_mb,
                    concurrency = config.batch.concurrency,
                    "Loaded engine configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to parse engine config, using defaults");
                Self::default()
            }
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit_ratio(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not in (0, 1]"),
                })
            }
        }

        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be positive"),
                })
            }
        }

        positive("thresholds.memory_warning_mb", self.thresholds.memory_warning_mb)?;
        positive("thresholds.auto_tile_mb", self.thresholds.auto_tile_mb)?;
        positive("thresholds.time_warning_secs", self.thresholds.time_warning_secs)?;
        if self.thresholds.stepped_min_ratio <= 1.0 {
            return Err(ConfigError::Invalid {
                field: "thresholds.stepped_min_ratio",
                reason: "must be greater than 1".to_string(),
            });
        }

        if self.pool.max_size == Some(0) {
            return Err(ConfigError::Invalid {
                field: "pool.max_size",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("pool.max_pooled_side", self.pool.max_pooled_side as f64)?;
        positive("pool.pressure_threshold_mb", self.pool.pressure_threshold_mb)?;
        unit_ratio("pool.eviction_ratio", self.pool.eviction_ratio)?;
        positive("pool.max_surface_side", self.pool.max_surface_side as f64)?;
        positive("pool.max_surface_pixels", self.pool.max_surface_pixels as f64)?;

        unit_ratio("monitor.critical_pressure", self.monitor.critical_pressure)?;
        unit_ratio("monitor.recommend_pressure", self.monitor.recommend_pressure)?;
        unit_ratio("monitor.projected_usage_ratio", self.monitor.projected_usage_ratio)?;
        positive("monitor.fallback_limit_mb", self.monitor.fallback_limit_mb as f64)?;
        positive("monitor.overhead_factor", self.monitor.overhead_factor as f64)?;

        positive("execution.chunk_budget_mb", self.execution.chunk_budget_mb)?;
        positive("execution.tile_side", self.execution.tile_side as f64)?;

        positive("batch.concurrency", self.batch.concurrency as f64)?;
        positive("batch.timeout_ms", self.batch.timeout_ms as f64)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.thresholds.high_res_pixel_threshold, 8_000_000);
        assert_eq!(config.thresholds.tile_pixel_threshold, 16_000_000);
        assert_eq!(config.thresholds.memory_warning_mb, 200.0);
        assert_eq!(config.thresholds.auto_tile_mb, 300.0);
        assert_eq!(config.thresholds.time_warning_secs, 10.0);
        assert_eq!(config.pool.max_size, None);
        assert_eq!(config.pool.max_pooled_side, 2048);
        assert_eq!(config.monitor.optimize_interval_ms, 5000);
        assert_eq!(config.execution.default_quality, Quality::High);
        assert_eq!(config.batch.concurrency, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
thresholds:
  high_res_pixel_threshold: 1000
  auto_tile_mb: 50
pool:
  max_size: 4
  eviction_ratio: 0.5
execution:
  tile_side: 64
  default_quality: low
batch:
  concurrency: 2
  timeout_ms: 100
"#;

        let config = EngineConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.thresholds.high_res_pixel_threshold, 1000);
        assert_eq!(config.thresholds.auto_tile_mb, 50.0);
        // untouched fields keep their defaults
        assert_eq!(config.thresholds.memory_warning_mb, 200.0);
        assert_eq!(config.pool.max_size, Some(4));
        assert_eq!(config.pool.eviction_ratio, 0.5);
        assert_eq!(config.execution.tile_side, 64);
        assert_eq!(config.execution.default_quality, Quality::Low);
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.batch.timeout_ms, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_yaml_str("batch:\n  concurrency: 0\n").unwrap_err();
        assert!(err.to_string().contains("batch.concurrency"));

        let err = EngineConfig::from_yaml_str("pool:\n  eviction_ratio: 1.5\n").unwrap_err();
        assert!(err.to_string().contains("pool.eviction_ratio"));

        let err = EngineConfig::from_yaml_str("execution:\n  tile_side: 0\n").unwrap_err();
        assert!(err.to_string().contains("execution.tile_side"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = EngineConfig::from_yaml_str("thresholds: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_or_default_falls_back() {
        let config = EngineConfig::parse_or_default("pool:\n  max_size: 0\n");
        assert_eq!(config, EngineConfig::default());

        let config = EngineConfig::parse_or_default("batch:\n  concurrency: 7\n");
        assert_eq!(config.batch.concurrency, 7);
    }
}
