//! Engine builders with thresholds shrunk to test-sized images.

use std::sync::{Arc, Mutex};

use rasterfit::{EngineConfig, ResizeEngine};

/// Thresholds scaled so that `fixtures::sizes` hit every strategy:
/// high-res at 5,000 px, tiles above 20,000 px, tiny chunk budget and tiles.
pub const SMALL_CONFIG: &str = r#"
thresholds:
  high_res_pixel_threshold: 5000
  tile_pixel_threshold: 20000
pool:
  max_size: 8
execution:
  chunk_budget_mb: 0.02
  tile_side: 24
  default_quality: medium
batch:
  concurrency: 2
  timeout_ms: 5000
"#;

pub fn small_config() -> EngineConfig {
    EngineConfig::from_yaml_str(SMALL_CONFIG).unwrap()
}

pub fn small_engine() -> ResizeEngine {
    super::init_tracing();
    ResizeEngine::new(small_config())
}

/// Collected `(stage, percent, message)` progress events
pub type ProgressLog = Arc<Mutex<Vec<(String, u8, String)>>>;

pub fn with_progress_log(engine: ResizeEngine) -> (ResizeEngine, ProgressLog) {
    let log: ProgressLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let engine = engine.on_progress(move |stage: &str, percent: u8, message: &str| {
        sink.lock()
            .unwrap()
            .push((stage.to_string(), percent, message.to_string()));
    });
    (engine, log)
}

/// Collected memory warnings
pub type WarningLog = Arc<Mutex<Vec<String>>>;

pub fn with_warning_log(engine: ResizeEngine) -> (ResizeEngine, WarningLog) {
    let log: WarningLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let engine = engine.on_memory_warning(move |message: &str| {
        sink.lock().unwrap().push(message.to_string());
    });
    (engine, log)
}
