//! Pool of reusable scratch surfaces.
//!
//! Idle surfaces are kept oldest-first in a `VecDeque`; acquisition takes
//! from the back (LIFO) and pressure eviction drops from the front. Every
//! surface handed out is tracked by id until it is released or dropped, so
//! the pool can never hand out a surface that is still in use.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ResizeError;
use crate::models::PoolConfig;
use crate::rendering::{InUseIds, Lease, Surface, SurfaceLimits};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Snapshot of pool counters.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStats {
    /// Idle surfaces currently retained
    pub size: usize,
    pub max_size: usize,
    /// Surfaces handed out and not yet released
    pub in_use: usize,
    pub total_created: u64,
    pub total_acquired: u64,
    pub total_released: u64,
    pub total_disposed: u64,
    pub hits: u64,
    pub hit_ratio: f64,
    /// Memory retained by idle surfaces
    pub memory_usage_mb: f64,
    pub eviction_count: u64,
    pub exhaustion_warnings: u64,
    /// Diagnostic load score in 0..=1, never used for decisions
    pub complexity: f64,
}

#[derive(Debug, Default)]
struct Counters {
    created: u64,
    acquired: u64,
    released: u64,
    disposed: u64,
    hits: u64,
    evictions: u64,
    exhaustion_warnings: u64,
}

#[derive(Debug)]
struct PoolState {
    idle: VecDeque<Surface>,
    max_size: usize,
    counters: Counters,
}

impl PoolState {
    fn retained_bytes(&self) -> u64 {
        self.idle.iter().map(Surface::byte_size).sum()
    }
}

/// Slot count for a given amount of available memory.
pub fn pool_size_for_memory(available_mb: u64) -> usize {
    match available_mb {
        0..=255 => 8,
        256..=511 => 10,
        512..=1023 => 12,
        _ => 15,
    }
}

pub struct SurfacePool {
    config: PoolConfig,
    limits: SurfaceLimits,
    state: Mutex<PoolState>,
    in_use: Arc<InUseIds>,
}

impl SurfacePool {
    /// Create a pool with an explicit slot count.
    pub fn new(max_size: usize, config: PoolConfig) -> Self {
        let limits = SurfaceLimits::from(&config);
        Self {
            config,
            limits,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                max_size: max_size.max(1),
                counters: Counters::default(),
            }),
            in_use: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Create a pool sized from available memory, unless the config fixes
    /// `max_size`.
    pub fn for_available_memory(available_mb: u64, config: PoolConfig) -> Self {
        let max_size = config
            .max_size
            .unwrap_or_else(|| pool_size_for_memory(available_mb));
        tracing::debug!(available_mb, max_size, "Creating surface pool");
        Self::new(max_size, config)
    }

    pub fn limits(&self) -> &SurfaceLimits {
        &self.limits
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_use_count(&self) -> usize {
        self.in_use
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Hand out a cleared surface of the requested size.
    ///
    /// Missing dimensions keep the reused surface's size, or 1 for a new one.
    pub fn acquire(&self, width: Option<u32>, height: Option<u32>) -> Result<Surface, ResizeError> {
        let reused = {
            let mut state = self.lock();
            self.check_memory_pressure(&mut state);
            state.counters.acquired += 1;

            let exact = match (width, height) {
                (Some(w), Some(h)) => state
                    .idle
                    .iter()
                    .rposition(|s| s.width() == w && s.height() == h),
                _ => None,
            };
            let reused = match exact {
                Some(index) => state.idle.remove(index),
                None => state.idle.pop_back(),
            };

            match &reused {
                Some(surface) => {
                    state.counters.hits += 1;
                    tracing::debug!(id = surface.id(), "Surface pool hit");
                }
                None => {
                    let live = self.in_use_count();
                    if live >= state.max_size {
                        state.counters.exhaustion_warnings += 1;
                        tracing::warn!(
                            in_use = live,
                            max_size = state.max_size,
                            "Surface pool exhausted, allocating beyond capacity"
                        );
                    }
                }
            }
            reused
        };

        let mut surface = match reused {
            Some(mut surface) => {
                let w = width.unwrap_or(surface.width());
                let h = height.unwrap_or(surface.height());
                if let Err(e) = surface.reshape(w, h, &self.limits) {
                    self.lock().idle.push_back(surface);
                    return Err(e);
                }
                surface
            }
            None => {
                let w = width.unwrap_or(1);
                let h = height.unwrap_or(1);
                let surface = Surface::allocate(w, h, &self.limits)?;
                self.lock().counters.created += 1;
                tracing::debug!(id = surface.id(), width = w, height = h, "Surface pool miss");
                surface
            }
        };

        let lease = Lease::register(surface.id(), &self.in_use);
        surface.set_lease(lease);
        Ok(surface)
    }

    /// Return a surface. It is kept only while the pool has room and the
    /// surface is below the pooling size cap; otherwise it is disposed.
    ///
    /// Dropping a surface instead of releasing it only clears its in-use
    /// record; the buffer is freed rather than pooled.
    pub fn release(&self, mut surface: Surface) {
        let max_side = self.config.max_pooled_side as u64;
        let poolable = surface.dimensions().area() <= max_side * max_side;
        if poolable {
            surface.reset();
        }

        if surface.take_lease().is_none() {
            tracing::debug!(id = surface.id(), "Released surface was not handed out by a pool");
        }

        let mut state = self.lock();
        state.counters.released += 1;

        if poolable && state.idle.len() < state.max_size {
            state.idle.push_back(surface);
        } else {
            tracing::debug!(
                id = surface.id(),
                width = surface.width(),
                height = surface.height(),
                "Disposing surface instead of pooling"
            );
            state.counters.disposed += 1;
            surface.dispose();
        }
    }

    /// Evict the oldest idle surfaces when retained memory is above the
    /// pressure threshold.
    fn check_memory_pressure(&self, state: &mut PoolState) {
        let retained = state.retained_bytes();
        let threshold = (self.config.pressure_threshold_mb * BYTES_PER_MB) as u64;
        if retained <= threshold {
            return;
        }

        let count = (state.idle.len() as f64 * self.config.eviction_ratio).ceil() as usize;
        let count = count.min(state.idle.len());
        for surface in state.idle.drain(..count) {
            surface.dispose();
        }
        state.counters.evictions += count as u64;
        state.counters.disposed += count as u64;
        tracing::debug!(
            evicted = count,
            remaining = state.idle.len(),
            retained_mb = retained as f64 / BYTES_PER_MB,
            "Surface pool evicted under memory pressure"
        );
    }

    pub fn max_size(&self) -> usize {
        self.lock().max_size
    }

    /// Change the slot count, disposing idle surfaces above the new cap.
    pub fn set_max_size(&self, max_size: usize) {
        let mut state = self.lock();
        state.max_size = max_size.max(1);
        while state.idle.len() > state.max_size {
            if let Some(surface) = state.idle.pop_front() {
                state.counters.disposed += 1;
                surface.dispose();
            }
        }
    }

    /// Dispose every idle surface and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        let count = state.idle.len();
        for surface in state.idle.drain(..) {
            surface.dispose();
        }
        state.counters = Counters::default();
        tracing::debug!(disposed = count, "Surface pool cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let in_use = self.in_use_count();
        let state = self.lock();
        let c = &state.counters;
        let retained = state.retained_bytes();
        let hit_ratio = if c.acquired == 0 {
            0.0
        } else {
            c.hits as f64 / c.acquired as f64
        };

        let threshold = self.config.pressure_threshold_mb * BYTES_PER_MB;
        let memory_ratio = (retained as f64 / threshold).min(1.0);
        let utilization = (in_use as f64 / state.max_size as f64).min(1.0);
        let complexity = 0.5 * memory_ratio + 0.3 * utilization + 0.2 * (1.0 - hit_ratio);

        PoolStats {
            size: state.idle.len(),
            max_size: state.max_size,
            in_use,
            total_created: c.created,
            total_acquired: c.acquired,
            total_released: c.released,
            total_disposed: c.disposed,
            hits: c.hits,
            hit_ratio,
            memory_usage_mb: retained as f64 / BYTES_PER_MB,
            eviction_count: c.evictions,
            exhaustion_warnings: c.exhaustion_warnings,
            complexity,
        }
    }
}
