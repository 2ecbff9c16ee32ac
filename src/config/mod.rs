//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (a `.env` file is read when present)
//! - Configuration validation
//! - Default value handling
//!
//! Threshold variables are parsed but never range-checked: odd thresholds
//! produce an odd analysis, not a startup failure.
//!
//! # Example
//!
//! ```
//! use perf_monitor::config::{MonitorConfig, DEFAULT_SAMPLE_INTERVAL_MS};
//!
//! // Use MonitorConfig::from_env() in production
//! let config = MonitorConfig::default();
//!
//! assert_eq!(config.sample_interval_ms, DEFAULT_SAMPLE_INTERVAL_MS);
//! assert_eq!(config.sample_interval().as_millis(), 1000);
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_SAMPLE_INTERVAL_MS, MAX_STORE_CAPACITY, MIN_SAMPLE_INTERVAL_MS,
};

use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::ThresholdConfig;
use crate::error::ConfigError;
use crate::store::DEFAULT_CAPACITY;

/// Default sampling interval in milliseconds.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;

/// Default report directory.
pub const DEFAULT_REPORT_DIR: &str = "./reports";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default run length of the command-line session, in seconds.
pub const DEFAULT_RUN_SECS: u64 = 5;

/// Monitor configuration.
///
/// Use [`MonitorConfig::from_env`] to load it from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Sampling interval in milliseconds.
    pub sample_interval_ms: u64,
    /// Samples retained before the oldest are evicted.
    pub store_capacity: usize,
    /// Directory reports are written into.
    pub report_dir: PathBuf,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Anomaly thresholds.
    pub thresholds: ThresholdConfig,
    /// How long the command-line session samples, in seconds.
    pub run_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            store_capacity: DEFAULT_CAPACITY,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            thresholds: ThresholdConfig::default(),
            run_secs: DEFAULT_RUN_SECS,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `PERF_SAMPLE_INTERVAL_MS`: Sampling interval (default: `1000`)
    /// - `PERF_STORE_CAPACITY`: Samples retained (default: `1000`)
    /// - `PERF_REPORT_DIR`: Report directory (default: `./reports`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `PERF_MIN_FPS`: Minimum frame rate (default: `50`)
    /// - `PERF_MAX_CPU`: Maximum processor load in percent (default: `80`)
    /// - `PERF_MAX_MEMORY_MB`: Maximum memory (default: `200`)
    /// - `PERF_MAX_NETWORK_SECS`: Maximum request duration (default: `5`)
    /// - `PERF_MEMORY_SPIKE_FACTOR`: Memory spike ratio (default: `1.5`)
    /// - `PERF_RUN_SECS`: Command-line session length (default: `5`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable does not parse or
    /// fails validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let defaults = ThresholdConfig::default();
        let thresholds = ThresholdConfig {
            min_frame_rate: parse_env_f64("PERF_MIN_FPS", defaults.min_frame_rate)?,
            max_processor_load: parse_env_f64("PERF_MAX_CPU", defaults.max_processor_load)?,
            max_memory: parse_env_f64("PERF_MAX_MEMORY_MB", defaults.max_memory)?,
            max_network_duration: parse_env_f64(
                "PERF_MAX_NETWORK_SECS",
                defaults.max_network_duration,
            )?,
            memory_spike_factor: parse_env_f64(
                "PERF_MEMORY_SPIKE_FACTOR",
                defaults.memory_spike_factor,
            )?,
        };

        let config = Self {
            sample_interval_ms: parse_env_u64(
                "PERF_SAMPLE_INTERVAL_MS",
                DEFAULT_SAMPLE_INTERVAL_MS,
            )?,
            store_capacity: parse_env_usize("PERF_STORE_CAPACITY", DEFAULT_CAPACITY)?,
            report_dir: std::env::var("PERF_REPORT_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_REPORT_DIR), PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
            thresholds,
            run_secs: parse_env_u64("PERF_RUN_SECS", DEFAULT_RUN_SECS)?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Sampling interval as a [`Duration`].
    #[must_use]
    pub const fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Command-line session length as a [`Duration`].
    #[must_use]
    pub const fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_secs)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as usize, using a default if not set.
fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as a finite f64, using a default if not set.
fn parse_env_f64(name: &str, default: f64) -> Result<f64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ConfigError::InvalidValue {
                var: name.into(),
                reason: "must be a number".into(),
            })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 10] = [
        "PERF_SAMPLE_INTERVAL_MS",
        "PERF_STORE_CAPACITY",
        "PERF_REPORT_DIR",
        "LOG_LEVEL",
        "PERF_MIN_FPS",
        "PERF_MAX_CPU",
        "PERF_MAX_MEMORY_MB",
        "PERF_MAX_NETWORK_SECS",
        "PERF_MEMORY_SPIKE_FACTOR",
        "PERF_RUN_SECS",
    ];

    /// Helper to set up a clean test environment.
    fn setup_test_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        setup_test_env();

        let config = MonitorConfig::from_env().expect("should load config");
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_all_vars() {
        setup_test_env();

        env::set_var("PERF_SAMPLE_INTERVAL_MS", "250");
        env::set_var("PERF_STORE_CAPACITY", "50");
        env::set_var("PERF_REPORT_DIR", "/tmp/perf");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("PERF_MIN_FPS", "30");
        env::set_var("PERF_MAX_CPU", "90.5");
        env::set_var("PERF_MAX_MEMORY_MB", "512");
        env::set_var("PERF_MAX_NETWORK_SECS", "2");
        env::set_var("PERF_MEMORY_SPIKE_FACTOR", "2.0");
        env::set_var("PERF_RUN_SECS", "10");

        let config = MonitorConfig::from_env().expect("should load config");
        setup_test_env();

        assert_eq!(config.sample_interval(), Duration::from_millis(250));
        assert_eq!(config.store_capacity, 50);
        assert_eq!(config.report_dir, PathBuf::from("/tmp/perf"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.thresholds.min_frame_rate, 30.0);
        assert_eq!(config.thresholds.max_processor_load, 90.5);
        assert_eq!(config.thresholds.max_memory, 512.0);
        assert_eq!(config.thresholds.max_network_duration, 2.0);
        assert_eq!(config.thresholds.memory_spike_factor, 2.0);
        assert_eq!(config.run_duration(), Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_config_invalid_interval_format() {
        setup_test_env();
        env::set_var("PERF_SAMPLE_INTERVAL_MS", "fast");

        let err = MonitorConfig::from_env().unwrap_err();
        setup_test_env();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, .. } if var == "PERF_SAMPLE_INTERVAL_MS"
        ));
    }

    #[test]
    #[serial]
    fn test_config_interval_validation_failure() {
        setup_test_env();
        env::set_var("PERF_SAMPLE_INTERVAL_MS", "5");

        let err = MonitorConfig::from_env().unwrap_err();
        setup_test_env();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, .. } if var == "PERF_SAMPLE_INTERVAL_MS"
        ));
    }

    #[test]
    #[serial]
    fn test_config_invalid_threshold() {
        setup_test_env();
        env::set_var("PERF_MAX_CPU", "lots");

        let err = MonitorConfig::from_env().unwrap_err();
        setup_test_env();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, .. } if var == "PERF_MAX_CPU"
        ));
    }

    #[test]
    #[serial]
    fn test_config_negative_threshold_is_accepted() {
        setup_test_env();
        env::set_var("PERF_MIN_FPS", "-10");

        let config = MonitorConfig::from_env().expect("thresholds are not range-checked");
        setup_test_env();
        assert_eq!(config.thresholds.min_frame_rate, -10.0);
    }

    #[test]
    #[serial]
    fn test_config_empty_report_dir() {
        setup_test_env();
        env::set_var("PERF_REPORT_DIR", "");

        let err = MonitorConfig::from_env().unwrap_err();
        setup_test_env();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, .. } if var == "PERF_REPORT_DIR"
        ));
    }

    #[test]
    fn test_parse_env_f64_rejects_non_finite() {
        env::set_var("TEST_PERF_F64_NAN", "NaN");
        let result = parse_env_f64("TEST_PERF_F64_NAN", 1.0);
        env::remove_var("TEST_PERF_F64_NAN");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_env_u64_default() {
        env::remove_var("TEST_PERF_U64_MISSING");
        assert_eq!(parse_env_u64("TEST_PERF_U64_MISSING", 999).unwrap(), 999);
    }

    #[test]
    fn test_parse_env_usize_invalid() {
        env::set_var("TEST_PERF_USIZE_INVALID", "-3");
        let result = parse_env_usize("TEST_PERF_USIZE_INVALID", 0);
        env::remove_var("TEST_PERF_USIZE_INVALID");
        assert!(result.is_err());
    }
}
