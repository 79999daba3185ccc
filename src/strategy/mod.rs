//! Execution strategies.
//!
//! [`select_strategy`] classifies a request and [`execute`] dispatches to
//! one executor per [`Strategy`] variant. Executors all build on the
//! single-copy [`Renderer`](crate::rendering::Renderer) and only differ in
//! how they split the work.

mod chunked;
mod direct;
pub mod region;
mod selector;
mod stepped;
mod tiled;
mod tracker;

use std::fmt;
use std::sync::Arc;

use fit_layout::LayoutResult;
use tiny_skia::{FilterQuality, PixmapRef};

use crate::error::ResizeError;
use crate::models::{Background, ExecutionConfig};
use crate::rendering::{Renderer, Surface};

pub use selector::{select_strategy, SelectionInput};
pub use stepped::plan_steps;
pub use tracker::PeakTracker;

/// Callback receiving `(stage, percent, message)` progress events.
pub type ProgressCallback = Arc<dyn Fn(&str, u8, &str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One full-source render
    Direct,
    /// Repeated halving, then a final render
    Stepped,
    /// Horizontal bands into one shared output
    Chunked,
    /// Bounded tile grid into one shared output
    Tiled,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::Stepped,
        Strategy::Chunked,
        Strategy::Tiled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Stepped => "stepped",
            Strategy::Chunked => "chunked",
            Strategy::Tiled => "tiled",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a resize.
#[derive(Debug)]
pub struct ProcessingResult {
    pub surface: Surface,
    pub strategy: Strategy,
    pub layout: LayoutResult,
    pub processing_time_ms: f64,
    /// Best-effort high-water mark of executor-held surfaces
    pub peak_memory_mb: f64,
    /// Set when the job was slow enough to tell the user about
    pub user_message: Option<String>,
}

/// Everything an executor needs to know about one job.
#[derive(Clone, Copy)]
pub struct Job<'a> {
    pub source: PixmapRef<'a>,
    pub layout: LayoutResult,
    pub background: Background,
    pub filter: FilterQuality,
}

/// Shared collaborators for executors.
pub struct ExecutionContext<'a> {
    pub renderer: &'a Renderer,
    pub config: &'a ExecutionConfig,
    pub progress: Option<&'a ProgressCallback>,
}

impl ExecutionContext<'_> {
    pub(crate) fn report(&self, percent: u8, message: &str) {
        tracing::debug!(percent, detail = message, "Resize progress");
        if let Some(progress) = self.progress {
            progress("resize", percent, message);
        }
    }
}

/// What an executor hands back.
#[derive(Debug)]
pub struct Execution {
    pub surface: Surface,
    pub peak_bytes: u64,
}

/// Run `strategy` on `job`. Failures of non-direct strategies are wrapped
/// in [`ResizeError::StrategyExecution`].
pub fn execute(
    strategy: Strategy,
    job: &Job<'_>,
    ctx: &ExecutionContext<'_>,
) -> Result<Execution, ResizeError> {
    let result = match strategy {
        Strategy::Direct => direct::run(job, ctx),
        Strategy::Stepped => stepped::run(job, ctx),
        Strategy::Chunked => chunked::run(job, ctx),
        Strategy::Tiled => tiled::run(job, ctx),
    };

    match strategy {
        Strategy::Direct => result,
        other => result.map_err(|e| ResizeError::strategy(other, e)),
    }
}
