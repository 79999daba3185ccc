//! Memory pressure estimation and mitigation.
//!
//! The platform reading comes from a [`MemoryProbe`]; when the probe has no
//! data the monitor assumes the configured fallback (256 of 512 MB, i.e. a
//! pressure of 0.5). Pressure never fails a request: the monitor only
//! clears the surface pool and reports through the warning callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::models::MonitorConfig;
use crate::services::SurfacePool;
use crate::strategy::Strategy;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Callback receiving human-readable memory warnings.
pub type MemoryWarningCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// One reading of process memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

/// Source of memory readings.
pub trait MemoryProbe: Send + Sync {
    /// Current usage, or `None` when the platform does not report it.
    fn sample(&self) -> Option<MemorySample>;

    /// Best-effort request to give memory back to the system.
    fn reclaim_hint(&self) {}
}

/// Probe for platforms without a memory API.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProbe;

impl MemoryProbe for UnavailableProbe {
    fn sample(&self) -> Option<MemorySample> {
        None
    }
}

/// Probe whose values are pushed by the host.
#[derive(Debug, Default)]
pub struct SharedProbe {
    used: AtomicU64,
    limit: AtomicU64,
    reclaims: AtomicU64,
}

impl SharedProbe {
    pub fn new(used_bytes: u64, limit_bytes: u64) -> Self {
        Self {
            used: AtomicU64::new(used_bytes),
            limit: AtomicU64::new(limit_bytes),
            reclaims: AtomicU64::new(0),
        }
    }

    pub fn set(&self, used_bytes: u64, limit_bytes: u64) {
        self.used.store(used_bytes, Ordering::Relaxed);
        self.limit.store(limit_bytes, Ordering::Relaxed);
    }

    /// Number of reclaim hints received.
    pub fn reclaim_count(&self) -> u64 {
        self.reclaims.load(Ordering::Relaxed)
    }
}

impl MemoryProbe for SharedProbe {
    fn sample(&self) -> Option<MemorySample> {
        let limit_bytes = self.limit.load(Ordering::Relaxed);
        if limit_bytes == 0 {
            return None;
        }
        Some(MemorySample {
            used_bytes: self.used.load(Ordering::Relaxed),
            limit_bytes,
        })
    }

    fn reclaim_hint(&self) {
        self.reclaims.fetch_add(1, Ordering::Relaxed);
    }
}

/// Strategy advice derived from pressure and source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Memory is tight: avoid full-resolution single-pass work
    MemoryEfficient,
    Strategy(Strategy),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonitorStats {
    pub checks: u64,
    pub optimizations: u64,
    pub last_pressure: f64,
}

#[derive(Debug, Default)]
struct MonitorState {
    last_optimization: Option<Instant>,
    stats: MonitorStats,
}

pub struct MemoryMonitor {
    config: MonitorConfig,
    probe: Arc<dyn MemoryProbe>,
    pool: Arc<SurfacePool>,
    state: Mutex<MonitorState>,
    warning: RwLock<Option<MemoryWarningCallback>>,
}

impl MemoryMonitor {
    pub fn new(config: MonitorConfig, probe: Arc<dyn MemoryProbe>, pool: Arc<SurfacePool>) -> Self {
        Self {
            config,
            probe,
            pool,
            state: Mutex::new(MonitorState::default()),
            warning: RwLock::new(None),
        }
    }

    pub fn set_warning_callback(&self, callback: MemoryWarningCallback) {
        *self.warning.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Log a memory warning and forward it to the registered callback.
    pub fn warn(&self, message: &str) {
        tracing::warn!(warning = message, "Memory warning");
        let callback = self
            .warning
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(message);
        }
    }

    /// Current reading, or the configured fallback.
    pub fn sample(&self) -> MemorySample {
        self.probe
            .sample()
            .filter(|s| s.limit_bytes > 0)
            .unwrap_or(MemorySample {
                used_bytes: self.config.fallback_used_mb * BYTES_PER_MB,
                limit_bytes: self.config.fallback_limit_mb * BYTES_PER_MB,
            })
    }

    /// Used/limit ratio in 0..=1.
    pub fn pressure(&self) -> f64 {
        let sample = self.sample();
        (sample.used_bytes as f64 / sample.limit_bytes as f64).clamp(0.0, 1.0)
    }

    /// Memory still available, in MB.
    pub fn available_mb(&self) -> u64 {
        let sample = self.sample();
        sample.limit_bytes.saturating_sub(sample.used_bytes) / BYTES_PER_MB
    }

    /// Bytes needed to process a `width`×`height` RGBA surface.
    pub fn estimate_surface_memory(&self, width: u32, height: u32) -> u64 {
        (width as u64)
            .saturating_mul(height as u64)
            .saturating_mul(4)
            .saturating_mul(self.config.overhead_factor)
    }

    pub fn estimate_surface_memory_mb(&self, width: u32, height: u32) -> f64 {
        self.estimate_surface_memory(width, height) as f64 / BYTES_PER_MB as f64
    }

    /// Clear the pool under critical pressure, at most once per interval.
    ///
    /// Returns true when an optimization ran.
    pub fn check_and_optimize(&self) -> bool {
        let pressure = self.pressure();
        let interval = Duration::from_millis(self.config.optimize_interval_ms);

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.stats.checks += 1;
            state.stats.last_pressure = pressure;

            if pressure <= self.config.critical_pressure {
                return false;
            }
            if let Some(last) = state.last_optimization {
                if last.elapsed() < interval {
                    tracing::debug!(pressure, "Memory optimization rate-limited");
                    return false;
                }
            }
            state.last_optimization = Some(Instant::now());
            state.stats.optimizations += 1;
        }

        self.pool.clear();
        self.probe.reclaim_hint();
        self.warn(&format!(
            "Memory pressure at {:.0}%, cleared surface pool",
            pressure * 100.0
        ));
        true
    }

    /// Recommend how to process a `width`×`height` source.
    pub fn recommend_strategy(&self, width: u32, height: u32) -> Recommendation {
        let sample = self.sample();
        let pressure = (sample.used_bytes as f64 / sample.limit_bytes as f64).clamp(0.0, 1.0);
        let projected = sample
            .used_bytes
            .saturating_add(self.estimate_surface_memory(width, height));

        if pressure > self.config.recommend_pressure
            || projected as f64 > sample.limit_bytes as f64 * self.config.projected_usage_ratio
        {
            return Recommendation::MemoryEfficient;
        }

        let pixels = width as u64 * height as u64;
        let strategy = if pixels > 16_000_000 {
            Strategy::Tiled
        } else if pixels > 4_000_000 {
            Strategy::Chunked
        } else {
            Strategy::Direct
        };
        Recommendation::Strategy(strategy)
    }

    pub fn stats(&self) -> MonitorStats {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stats
    }

    /// Forget the last optimization time and zero the counters.
    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = MonitorState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoolConfig;
    use std::sync::atomic::AtomicUsize;

    const MB: u64 = BYTES_PER_MB;

    fn pool() -> Arc<SurfacePool> {
        Arc::new(SurfacePool::new(4, PoolConfig::default()))
    }

    fn monitor_with(probe: Arc<dyn MemoryProbe>, config: MonitorConfig) -> MemoryMonitor {
        MemoryMonitor::new(config, probe, pool())
    }

    #[test]
    fn test_fallback_pressure_is_half() {
        let monitor = monitor_with(Arc::new(UnavailableProbe), MonitorConfig::default());
        assert_eq!(monitor.pressure(), 0.5);
        assert_eq!(monitor.available_mb(), 256);
    }

    #[test]
    fn test_shared_probe_pressure() {
        let probe = Arc::new(SharedProbe::new(300 * MB, 400 * MB));
        let monitor = monitor_with(probe.clone(), MonitorConfig::default());
        assert_eq!(monitor.pressure(), 0.75);

        probe.set(100 * MB, 400 * MB);
        assert_eq!(monitor.pressure(), 0.25);
    }

    #[test]
    fn test_estimate_surface_memory() {
        let monitor = monitor_with(Arc::new(UnavailableProbe), MonitorConfig::default());
        assert_eq!(monitor.estimate_surface_memory(100, 50), 100 * 50 * 4 * 2);
        assert_eq!(monitor.estimate_surface_memory_mb(1024, 1024), 8.0);
    }

    #[test]
    fn test_check_and_optimize_requires_critical_pressure() {
        let probe = Arc::new(SharedProbe::new(70 * MB, 100 * MB));
        let pool = pool();
        let monitor = MemoryMonitor::new(MonitorConfig::default(), probe.clone(), pool.clone());

        let surface = pool.acquire(Some(4), Some(4)).unwrap();
        pool.release(surface);

        assert!(!monitor.check_and_optimize());
        assert_eq!(pool.len(), 1);
        assert_eq!(probe.reclaim_count(), 0);

        probe.set(90 * MB, 100 * MB);
        assert!(monitor.check_and_optimize());
        assert!(pool.is_empty());
        assert_eq!(probe.reclaim_count(), 1);

        let stats = monitor.stats();
        assert_eq!(stats.checks, 2);
        assert_eq!(stats.optimizations, 1);
        assert_eq!(stats.last_pressure, 0.9);
    }

    #[test]
    fn test_optimization_is_rate_limited() {
        let probe = Arc::new(SharedProbe::new(95 * MB, 100 * MB));
        let monitor = monitor_with(probe.clone(), MonitorConfig::default());

        assert!(monitor.check_and_optimize());
        assert!(!monitor.check_and_optimize());
        assert_eq!(monitor.stats().optimizations, 1);

        monitor.reset();
        assert_eq!(monitor.stats(), MonitorStats::default());
        assert!(monitor.check_and_optimize());
        assert_eq!(probe.reclaim_count(), 2);
    }

    #[test]
    fn test_zero_interval_allows_back_to_back() {
        let config = MonitorConfig {
            optimize_interval_ms: 0,
            ..Default::default()
        };
        let monitor = monitor_with(Arc::new(SharedProbe::new(99 * MB, 100 * MB)), config);
        assert!(monitor.check_and_optimize());
        assert!(monitor.check_and_optimize());
    }

    #[test]
    fn test_warning_callback_fires_on_optimization() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let monitor = monitor_with(
            Arc::new(SharedProbe::new(90 * MB, 100 * MB)),
            MonitorConfig::default(),
        );
        monitor.set_warning_callback(Arc::new(move |message: &str| {
            assert!(message.contains("90%"));
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        monitor.check_and_optimize();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recommendation_by_pixel_count() {
        let probe = Arc::new(SharedProbe::new(0, 64 * 1024 * MB));
        let monitor = monitor_with(probe, MonitorConfig::default());

        assert_eq!(
            monitor.recommend_strategy(1000, 1000),
            Recommendation::Strategy(Strategy::Direct)
        );
        assert_eq!(
            monitor.recommend_strategy(3000, 2000),
            Recommendation::Strategy(Strategy::Chunked)
        );
        assert_eq!(
            monitor.recommend_strategy(6000, 4000),
            Recommendation::Strategy(Strategy::Tiled)
        );
    }

    #[test]
    fn test_recommendation_under_pressure() {
        let probe = Arc::new(SharedProbe::new(75 * MB, 100 * MB));
        let monitor = monitor_with(probe.clone(), MonitorConfig::default());
        assert_eq!(
            monitor.recommend_strategy(10, 10),
            Recommendation::MemoryEfficient
        );

        // low pressure, but the projected surface would not fit
        probe.set(10 * MB, 100 * MB);
        assert_eq!(
            monitor.recommend_strategy(4000, 4000),
            Recommendation::MemoryEfficient
        );
    }
}
