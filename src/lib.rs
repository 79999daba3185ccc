//! Rasterfit - adaptive raster resizing
//!
//! Computes exact output geometry for a resize request, renders it with a
//! single copy, and for very large inputs picks a stepped, chunked or tiled
//! execution strategy to keep peak memory bounded. Scratch surfaces are
//! reused through a pool that evicts under memory pressure.
//!
//! ```
//! use rasterfit::{EngineConfig, FitMode, ResizeEngine, ResizeRequest};
//! use tiny_skia::Pixmap;
//!
//! let engine = ResizeEngine::new(EngineConfig::default());
//! let source = Pixmap::new(300, 200).unwrap();
//! let request = ResizeRequest::new()
//!     .width(300)
//!     .height(200)
//!     .fit(FitMode::Contain)
//!     .padding(20u32);
//!
//! let result = engine.resize(&source, &request).unwrap();
//! assert_eq!(result.surface.width(), 340);
//! assert_eq!(result.surface.height(), 240);
//! engine.release(result.surface);
//! ```

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
pub mod strategy;

pub use error::{ConfigError, ParseColorError, ParseTokenError, ResizeError};
pub use fit_layout::{
    compute_layout, Dimensions, FitMode, LayoutError, LayoutRequest, LayoutResult, Padding,
    PaddingSpec, Point,
};
pub use models::{Background, EngineConfig, Priority, Quality, ResizeRequest};
pub use rendering::Surface;
pub use services::{
    BatchScheduler, MemoryMonitor, MemoryProbe, MemorySample, ResizeEngine, SharedProbe,
    SurfacePool, UnavailableProbe,
};
pub use strategy::{select_strategy, ProcessingResult, SelectionInput, Strategy};
