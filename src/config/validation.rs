//! Configuration validation.
//!
//! This module checks that sampling and storage settings are within
//! acceptable ranges. Thresholds are deliberately left unchecked.

use super::MonitorConfig;
use crate::error::ConfigError;

/// Minimum sampling interval in milliseconds.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 10;

/// Maximum sampling interval in milliseconds (1 hour).
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 3_600_000;

/// Maximum store capacity.
pub const MAX_STORE_CAPACITY: usize = 1_000_000;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `PERF_SAMPLE_INTERVAL_MS` must be between 10 and 3600000
/// - `PERF_STORE_CAPACITY` must be between 1 and 1000000
/// - `PERF_REPORT_DIR` must not be empty
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    if !(MIN_SAMPLE_INTERVAL_MS..=MAX_SAMPLE_INTERVAL_MS).contains(&config.sample_interval_ms) {
        return Err(ConfigError::InvalidValue {
            var: "PERF_SAMPLE_INTERVAL_MS".into(),
            reason: format!(
                "must be between {MIN_SAMPLE_INTERVAL_MS} and {MAX_SAMPLE_INTERVAL_MS} ms"
            ),
        });
    }

    if !(1..=MAX_STORE_CAPACITY).contains(&config.store_capacity) {
        return Err(ConfigError::InvalidValue {
            var: "PERF_STORE_CAPACITY".into(),
            reason: format!("must be between 1 and {MAX_STORE_CAPACITY}"),
        });
    }

    if config.report_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "PERF_REPORT_DIR".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(())
}
