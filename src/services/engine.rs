//! Top-level resize entry point.
//!
//! [`ResizeEngine`] owns one surface pool, one memory monitor and one
//! renderer. Nothing is process-global: tests build a fresh engine (or call
//! [`MemoryMonitor::reset`]) to start from a clean state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fit_layout::{compute_layout, Dimensions};
use tiny_skia::Pixmap;

use crate::error::ResizeError;
use crate::models::{EngineConfig, Quality, ResizeRequest};
use crate::rendering::{filter_quality, Renderer, Surface};
use crate::services::{
    BatchScheduler, MemoryMonitor, MemoryProbe, MemoryWarningCallback, Recommendation,
    SurfacePool, UnavailableProbe,
};
use crate::strategy::{
    execute, select_strategy, ExecutionContext, Job, ProcessingResult, ProgressCallback,
    SelectionInput, Strategy,
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct ResizeEngine {
    config: EngineConfig,
    pool: Arc<SurfacePool>,
    monitor: Arc<MemoryMonitor>,
    renderer: Renderer,
    progress: Option<ProgressCallback>,
}

impl ResizeEngine {
    /// Engine without platform memory readings.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_probe(config, Arc::new(UnavailableProbe))
    }

    pub fn with_probe(config: EngineConfig, probe: Arc<dyn MemoryProbe>) -> Self {
        let available_mb = probe
            .sample()
            .map(|s| s.limit_bytes.saturating_sub(s.used_bytes) / (1024 * 1024))
            .unwrap_or(
                config
                    .monitor
                    .fallback_limit_mb
                    .saturating_sub(config.monitor.fallback_used_mb),
            );
        let pool = Arc::new(SurfacePool::for_available_memory(
            available_mb,
            config.pool.clone(),
        ));
        let monitor = Arc::new(MemoryMonitor::new(
            config.monitor.clone(),
            probe,
            pool.clone(),
        ));

        tracing::info!(
            available_mb,
            pool_size = pool.max_size(),
            "Resize engine initialized"
        );

        Self {
            renderer: Renderer::new(pool.clone()),
            config,
            pool,
            monitor,
            progress: None,
        }
    }

    /// Receive `(stage, percent, message)` progress events.
    pub fn on_progress(
        mut self,
        callback: impl Fn(&str, u8, &str) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Receive memory warnings (large inputs, strategy downgrades, pool
    /// clears under pressure).
    pub fn on_memory_warning(self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let callback: MemoryWarningCallback = Arc::new(callback);
        self.monitor.set_warning_callback(callback);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<SurfacePool> {
        &self.pool
    }

    pub fn monitor(&self) -> &Arc<MemoryMonitor> {
        &self.monitor
    }

    /// Hand an output surface back to the pool. The caller must not keep
    /// using the pixels afterwards.
    pub fn release(&self, surface: Surface) {
        self.pool.release(surface);
    }

    /// Strategy the engine would use for `source` and `request`, after the
    /// memory monitor's veto.
    pub fn plan(
        &self,
        source: Dimensions,
        request: &ResizeRequest,
    ) -> Result<Strategy, ResizeError> {
        let layout = compute_layout(source, &request.layout)?;
        Ok(self.choose_strategy(source, layout.image_size, request))
    }

    fn choose_strategy(
        &self,
        source: Dimensions,
        image: Dimensions,
        request: &ResizeRequest,
    ) -> Strategy {
        let thresholds = &self.config.thresholds;
        let estimated_memory_mb = self
            .monitor
            .estimate_surface_memory_mb(source.width, source.height);
        let shrink_factor = (source.width as f64 / image.width as f64)
            .max(source.height as f64 / image.height as f64);

        let input = SelectionInput {
            pixel_count: source.area(),
            estimated_memory_mb,
            priority: request.priority,
            shrink_factor,
        };
        let selected = select_strategy(&input, thresholds);

        if estimated_memory_mb > thresholds.memory_warning_mb {
            self.monitor.warn(&format!(
                "Large image {}x{} needs about {:.0} MB",
                source.width, source.height, estimated_memory_mb
            ));
        }

        let memory_hungry = matches!(selected, Strategy::Direct | Strategy::Stepped);
        if memory_hungry
            && source.area() >= thresholds.high_res_pixel_threshold
            && self.monitor.recommend_strategy(source.width, source.height)
                == Recommendation::MemoryEfficient
        {
            self.monitor.warn(&format!(
                "Memory is constrained, switching {selected} to chunked for {}x{}",
                source.width, source.height
            ));
            return Strategy::Chunked;
        }

        selected
    }

    /// Resize `source` according to `request`.
    ///
    /// The layout is computed before anything is rendered, so geometry
    /// errors never allocate. A failing non-direct strategy is retried once
    /// with `direct` at medium quality.
    pub fn resize(
        &self,
        source: &Pixmap,
        request: &ResizeRequest,
    ) -> Result<ProcessingResult, ResizeError> {
        let start = Instant::now();
        let source_dims = Dimensions::new(source.width(), source.height());
        let layout = compute_layout(source_dims, &request.layout)?;
        let strategy = self.choose_strategy(source_dims, layout.image_size, request);

        let quality = request
            .quality
            .unwrap_or(self.config.execution.default_quality);
        let mut job = Job {
            source: source.as_ref(),
            layout,
            background: request.background,
            filter: filter_quality(quality, request.smoothing),
        };
        let ctx = ExecutionContext {
            renderer: &self.renderer,
            config: &self.config.execution,
            progress: self.progress.as_ref(),
        };

        tracing::info!(
            strategy = %strategy,
            source_width = source_dims.width,
            source_height = source_dims.height,
            width = layout.canvas_size.width,
            height = layout.canvas_size.height,
            "Resizing"
        );

        let (execution, used) = match execute(strategy, &job, &ctx) {
            Ok(execution) => (execution, strategy),
            Err(e) if e.is_strategy_failure() => {
                tracing::warn!(error = %e, "Strategy failed, retrying with direct");
                job.filter = filter_quality(Quality::Medium, request.smoothing);
                (execute(Strategy::Direct, &job, &ctx)?, Strategy::Direct)
            }
            Err(e) => return Err(e),
        };

        let elapsed = start.elapsed();
        let user_message = self.slow_job_message(elapsed);
        let result = ProcessingResult {
            surface: execution.surface,
            strategy: used,
            layout,
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
            peak_memory_mb: execution.peak_bytes as f64 / BYTES_PER_MB,
            user_message,
        };

        tracing::info!(
            strategy = %result.strategy,
            elapsed_ms = result.processing_time_ms,
            peak_mb = result.peak_memory_mb,
            "Resize complete"
        );
        Ok(result)
    }

    fn slow_job_message(&self, elapsed: Duration) -> Option<String> {
        let limit = self.config.thresholds.time_warning_secs;
        let secs = elapsed.as_secs_f64();
        if secs <= limit {
            return None;
        }
        tracing::warn!(elapsed_secs = secs, limit_secs = limit, "Slow resize");
        Some(format!(
            "Processing took {secs:.1}s; a smaller target or the speed priority will be faster"
        ))
    }

    /// Run [`resize`](Self::resize) on the blocking thread pool.
    pub async fn resize_async(
        self: Arc<Self>,
        source: Arc<Pixmap>,
        request: ResizeRequest,
    ) -> Result<ProcessingResult, ResizeError> {
        tokio::task::spawn_blocking(move || self.resize(&source, &request))
            .await
            .map_err(|e| ResizeError::Task(e.to_string()))?
    }

    /// Resize many sources with bounded concurrency and per-job timeouts.
    ///
    /// All-or-nothing: any failure rejects the whole call.
    pub async fn resize_batch(
        self: &Arc<Self>,
        jobs: Vec<(Arc<Pixmap>, ResizeRequest)>,
        concurrency: Option<usize>,
        timeout: Option<Duration>,
    ) -> Result<Vec<ProcessingResult>, ResizeError> {
        let scheduler = BatchScheduler::new(self.monitor.clone(), self.config.batch.clone());
        let tasks = jobs.into_iter().map(|(source, request)| {
            let engine = Arc::clone(self);
            move || engine.resize_async(source, request)
        });
        scheduler.process_all(tasks, concurrency, timeout).await
    }
}
