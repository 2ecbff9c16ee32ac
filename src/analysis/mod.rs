//! Sample analysis.
//!
//! This module turns a snapshot of samples into an [`Analysis`]:
//! - [`detector`]: per-sample threshold and spike checks
//! - [`score`]: weighted 0-100 health score
//! - [`recommendations`]: advice derived from aggregates and anomalies
//! - [`screens`]: per-screen aggregates
//!
//! Analysis is a pure function of the samples, the thresholds and any
//! anomalies reported by probes; nothing is cached between calls.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use perf_monitor::analysis::{analyze, AnomalyKind, ThresholdConfig};
//! use perf_monitor::traits::MetricSample;
//!
//! let now = Utc::now();
//! let samples = vec![
//!     MetricSample::new(now, 30.0, 10.0, 50.0),
//!     MetricSample::new(now, 60.0, 10.0, 50.0),
//! ];
//!
//! let analysis = analyze(&samples, &ThresholdConfig::default());
//! assert_eq!(analysis.total_data_points, 2);
//! assert_eq!(analysis.anomalies.len(), 1);
//! assert_eq!(analysis.anomalies[0].kind, AnomalyKind::LowFrameRate);
//! ```

pub mod detector;
pub mod recommendations;
pub mod score;
pub mod screens;
mod types;

pub use types::{
    Analysis, Anomaly, AnomalyKind, MetricStatistics, PerformanceStatistics, ScreenPerformance,
    ThresholdConfig, DEFAULT_MAX_MEMORY_MB, DEFAULT_MAX_NETWORK_DURATION_SECS,
    DEFAULT_MAX_PROCESSOR_LOAD, DEFAULT_MEMORY_SPIKE_FACTOR, DEFAULT_MIN_FRAME_RATE,
};

use std::collections::BTreeMap;

use crate::traits::MetricSample;
use recommendations::Aggregates;

/// Analyse samples with the detector alone.
#[must_use]
pub fn analyze(samples: &[MetricSample], thresholds: &ThresholdConfig) -> Analysis {
    analyze_with_reported(samples, thresholds, Vec::new())
}

/// Analyse samples, merging anomalies that probes detected on their own.
///
/// Probe-reported anomalies are appended after the detector's output and
/// count towards the score penalty. Callers are expected to pass only those
/// that fall within the sampled period.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_with_reported(
    samples: &[MetricSample],
    thresholds: &ThresholdConfig,
    reported: Vec<Anomaly>,
) -> Analysis {
    if samples.is_empty() {
        return Analysis {
            average_frame_rate: 0.0,
            average_processor_load: 0.0,
            average_memory: 0.0,
            peak_memory: 0.0,
            anomalies: Vec::new(),
            recommendations: vec![recommendations::NO_DATA.to_string()],
            screen_performance: BTreeMap::new(),
            overall_score: 0,
            total_data_points: 0,
        };
    }

    let n = samples.len() as f64;
    let aggregates = Aggregates {
        average_frame_rate: samples.iter().map(|s| s.frame_rate).sum::<f64>() / n,
        average_processor_load: samples.iter().map(|s| s.processor_load).sum::<f64>() / n,
        average_memory: samples.iter().map(|s| s.memory_usage).sum::<f64>() / n,
        peak_memory: samples
            .iter()
            .map(|s| s.memory_usage)
            .fold(f64::NEG_INFINITY, f64::max),
    };

    let mut anomalies = detector::detect(samples, thresholds);
    anomalies.extend(reported);

    let recommendations = recommendations::generate(&aggregates, &anomalies, thresholds);
    let screen_performance = screens::breakdown(samples, thresholds);
    let overall_score = score::calculate(
        aggregates.average_frame_rate,
        aggregates.average_processor_load,
        aggregates.average_memory,
        anomalies.len(),
        thresholds,
    );

    Analysis {
        average_frame_rate: aggregates.average_frame_rate,
        average_processor_load: aggregates.average_processor_load,
        average_memory: aggregates.average_memory,
        peak_memory: aggregates.peak_memory,
        anomalies,
        recommendations,
        screen_performance,
        overall_score,
        total_data_points: samples.len(),
    }
}

/// Min, max, mean and median of frame rate, processor load and memory.
#[must_use]
pub fn statistics(samples: &[MetricSample]) -> PerformanceStatistics {
    PerformanceStatistics {
        frame_rate: metric_statistics(samples.iter().map(|s| s.frame_rate).collect()),
        processor_load: metric_statistics(samples.iter().map(|s| s.processor_load).collect()),
        memory: metric_statistics(samples.iter().map(|s| s.memory_usage).collect()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn metric_statistics(mut values: Vec<f64>) -> MetricStatistics {
    if values.is_empty() {
        return MetricStatistics::default();
    }
    values.sort_by(f64::total_cmp);

    let len = values.len();
    let mid = len / 2;
    let median = if len % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    MetricStatistics {
        min: values[0],
        max: values[len - 1],
        average: values.iter().sum::<f64>() / len as f64,
        median,
    }
}
