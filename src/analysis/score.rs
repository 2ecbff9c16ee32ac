//! Composite health score.
//!
//! ```text
//! frame     = min(100, fps / min_fps * 100)
//! processor = max(0, 100 - cpu / max_cpu * 100)
//! memory    = max(0, 100 - mem / max_mem * 100)
//! base      = trunc(0.4 * frame + 0.3 * processor + 0.3 * memory)
//! score     = max(0, base - min(50, anomalies * 5))
//! ```

use super::types::ThresholdConfig;

/// Weight of the frame rate component.
pub const FRAME_WEIGHT: f64 = 0.4;

/// Weight of the processor load component.
pub const PROCESSOR_WEIGHT: f64 = 0.3;

/// Weight of the memory component.
pub const MEMORY_WEIGHT: f64 = 0.3;

/// Points deducted per anomaly.
pub const PENALTY_PER_ANOMALY: i64 = 5;

/// Cap on the total anomaly penalty.
pub const MAX_PENALTY: i64 = 50;

/// Reduce aggregate metrics and an anomaly count to a score in `0..=100`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn calculate(
    mean_frame_rate: f64,
    mean_processor_load: f64,
    mean_memory: f64,
    anomaly_count: usize,
    thresholds: &ThresholdConfig,
) -> u8 {
    let frame = component(mean_frame_rate / thresholds.min_frame_rate * 100.0);
    let processor = component(100.0 - mean_processor_load / thresholds.max_processor_load * 100.0);
    let memory = component(100.0 - mean_memory / thresholds.max_memory * 100.0);

    // Components are within 0..=100, so the cast truncates toward zero.
    let base =
        (FRAME_WEIGHT * frame + PROCESSOR_WEIGHT * processor + MEMORY_WEIGHT * memory) as i64;

    let count = i64::try_from(anomaly_count).unwrap_or(i64::MAX);
    let penalty = count.saturating_mul(PENALTY_PER_ANOMALY).min(MAX_PENALTY);

    (base - penalty).clamp(0, 100) as u8
}

/// Clamp a component to `0..=100`; undefined ratios count as zero.
fn component(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
