//! Analysis data types.
//!
//! - [`ThresholdConfig`]: Limits samples are judged against
//! - [`Anomaly`] / [`AnomalyKind`]: A detected violation
//! - [`ScreenPerformance`]: Aggregates for one UI screen
//! - [`Analysis`]: The full result of one analysis pass
//! - [`MetricStatistics`] / [`PerformanceStatistics`]: Descriptive statistics

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default minimum acceptable frame rate.
pub const DEFAULT_MIN_FRAME_RATE: f64 = 50.0;

/// Default maximum acceptable processor load in percent.
pub const DEFAULT_MAX_PROCESSOR_LOAD: f64 = 80.0;

/// Default maximum acceptable memory in megabytes.
pub const DEFAULT_MAX_MEMORY_MB: f64 = 200.0;

/// Default maximum acceptable request duration in seconds.
pub const DEFAULT_MAX_NETWORK_DURATION_SECS: f64 = 5.0;

/// Default consecutive-sample memory growth ratio counted as a spike.
pub const DEFAULT_MEMORY_SPIKE_FACTOR: f64 = 1.5;

/// Thresholds used for anomaly detection and scoring.
///
/// Values are expected to be positive but are not validated: out-of-range
/// thresholds simply yield a degenerate analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    /// Frame rates below this are anomalous.
    pub min_frame_rate: f64,
    /// Processor load above this is anomalous.
    pub max_processor_load: f64,
    /// Memory above this (MB) is anomalous.
    pub max_memory: f64,
    /// Requests slower than this (seconds) are anomalous.
    pub max_network_duration: f64,
    /// Memory growth ratio between consecutive samples counted as a spike.
    pub memory_spike_factor: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_frame_rate: DEFAULT_MIN_FRAME_RATE,
            max_processor_load: DEFAULT_MAX_PROCESSOR_LOAD,
            max_memory: DEFAULT_MAX_MEMORY_MB,
            max_network_duration: DEFAULT_MAX_NETWORK_DURATION_SECS,
            memory_spike_factor: DEFAULT_MEMORY_SPIKE_FACTOR,
        }
    }
}

/// Category of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// Frame rate below the minimum.
    #[serde(rename = "low_fps")]
    LowFrameRate,
    /// Processor load above the maximum.
    #[serde(rename = "high_cpu")]
    HighProcessorLoad,
    /// Memory above the maximum.
    #[serde(rename = "high_memory")]
    HighMemory,
    /// Memory grew faster than the spike factor between two samples.
    #[serde(rename = "memory_spike")]
    MemorySpike,
    /// A network request exceeded the duration limit.
    #[serde(rename = "slow_network")]
    SlowNetworkRequest,
    /// Battery level is falling quickly.
    #[serde(rename = "battery_drain")]
    BatteryDrain,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowFrameRate => write!(f, "low_fps"),
            Self::HighProcessorLoad => write!(f, "high_cpu"),
            Self::HighMemory => write!(f, "high_memory"),
            Self::MemorySpike => write!(f, "memory_spike"),
            Self::SlowNetworkRequest => write!(f, "slow_network"),
            Self::BatteryDrain => write!(f, "battery_drain"),
        }
    }
}

/// A detected threshold violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    /// What was violated.
    pub kind: AnomalyKind,
    /// When the offending observation was made.
    pub timestamp: DateTime<Utc>,
    /// The offending value.
    pub observed_value: f64,
    /// The threshold it crossed.
    pub threshold: f64,
    /// Screen active at the time, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    /// Human-readable summary.
    pub description: String,
}

impl Anomaly {
    /// Create a new anomaly.
    #[must_use]
    pub fn new(
        kind: AnomalyKind,
        timestamp: DateTime<Utc>,
        observed_value: f64,
        threshold: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            timestamp,
            observed_value,
            threshold,
            screen_name: None,
            description: description.into(),
        }
    }

    /// Attach a screen name.
    #[must_use]
    pub fn with_screen(mut self, screen_name: Option<String>) -> Self {
        self.screen_name = screen_name;
        self
    }
}

/// Aggregates for the samples taken while one screen was active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenPerformance {
    /// Screen name.
    pub screen_name: String,
    /// Mean frame rate.
    pub average_frame_rate: f64,
    /// Mean processor load.
    pub average_processor_load: f64,
    /// Mean memory.
    pub average_memory: f64,
    /// Seconds between the first and last sample on this screen.
    pub time_on_screen: f64,
    /// Anomalies detected within this screen's samples.
    pub anomaly_count: usize,
    /// Samples taken on this screen.
    pub sample_count: usize,
}

/// Result of one analysis pass.
///
/// A stand-alone snapshot: it is never updated when the store changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Mean frame rate.
    pub average_frame_rate: f64,
    /// Mean processor load.
    pub average_processor_load: f64,
    /// Mean memory.
    pub average_memory: f64,
    /// Highest memory observed.
    pub peak_memory: f64,
    /// Anomalies in detection order.
    pub anomalies: Vec<Anomaly>,
    /// Recommendations in priority order.
    pub recommendations: Vec<String>,
    /// Per-screen breakdown.
    pub screen_performance: BTreeMap<String, ScreenPerformance>,
    /// Health score in `0..=100`.
    pub overall_score: u8,
    /// Number of samples analysed.
    pub total_data_points: usize,
}

impl Analysis {
    /// Number of anomalies of a given kind.
    #[must_use]
    pub fn count_of(&self, kind: AnomalyKind) -> usize {
        self.anomalies.iter().filter(|a| a.kind == kind).count()
    }
}

/// Descriptive statistics of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub average: f64,
    /// Median.
    pub median: f64,
}

/// Descriptive statistics of the core metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStatistics {
    /// Frame rate statistics.
    pub frame_rate: MetricStatistics,
    /// Processor load statistics.
    pub processor_load: MetricStatistics,
    /// Memory statistics.
    pub memory: MetricStatistics,
}
