pub mod background;
pub mod config;
pub mod request;

pub use background::Background;
pub use config::{BatchConfig, EngineConfig, ExecutionConfig, MonitorConfig, PoolConfig, Thresholds};
pub use request::{Priority, Quality, ResizeRequest};
