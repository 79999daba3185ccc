pub mod batch_scheduler;
pub mod engine;
pub mod memory_monitor;
pub mod surface_pool;

pub use batch_scheduler::BatchScheduler;
pub use engine::ResizeEngine;
pub use memory_monitor::{
    MemoryMonitor, MemoryProbe, MemorySample, MemoryWarningCallback, MonitorStats,
    Recommendation, SharedProbe, UnavailableProbe,
};
pub use surface_pool::{pool_size_for_memory, PoolStats, SurfacePool};
