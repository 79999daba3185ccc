use crate::models::{Priority, Thresholds};
use crate::strategy::Strategy;

/// Facts the selector decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionInput {
    pub pixel_count: u64,
    pub estimated_memory_mb: f64,
    pub priority: Priority,
    /// Largest per-axis source/target ratio; above 1 means shrinking
    pub shrink_factor: f64,
}

/// Pick an execution strategy. Pure: equal inputs give equal answers.
pub fn select_strategy(input: &SelectionInput, thresholds: &Thresholds) -> Strategy {
    let memory_driven = if input.pixel_count > thresholds.tile_pixel_threshold {
        Strategy::Tiled
    } else {
        Strategy::Chunked
    };

    if input.estimated_memory_mb > thresholds.auto_tile_mb {
        return memory_driven;
    }

    if input.pixel_count < thresholds.high_res_pixel_threshold {
        return Strategy::Direct;
    }

    match input.priority {
        Priority::Speed => Strategy::Direct,
        Priority::Quality => {
            if input.estimated_memory_mb > thresholds.memory_warning_mb {
                Strategy::Tiled
            } else if input.shrink_factor >= thresholds.stepped_min_ratio {
                Strategy::Stepped
            } else {
                Strategy::Direct
            }
        }
        Priority::Balanced => memory_driven,
    }
}
