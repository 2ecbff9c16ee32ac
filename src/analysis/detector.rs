//! Per-sample anomaly detection.
//!
//! Each sample is checked in a fixed order: frame rate, processor load,
//! memory, memory spike against the previous sample, then every network
//! request it carries. Checks are independent, so one sample can produce
//! several anomalies. Battery drain needs slope-over-time reasoning and is
//! reported by the battery probe instead.

use super::types::{Anomaly, AnomalyKind, ThresholdConfig};
use crate::traits::MetricSample;

/// Detect anomalies across an ordered slice of samples.
///
/// Deterministic and side-effect free; output follows input order.
#[must_use]
pub fn detect(samples: &[MetricSample], thresholds: &ThresholdConfig) -> Vec<Anomaly> {
    detect_iter(samples.iter(), thresholds)
}

/// Detect anomalies across any ordered sequence of sample references.
#[must_use]
pub fn detect_iter<'a, I>(samples: I, thresholds: &ThresholdConfig) -> Vec<Anomaly>
where
    I: IntoIterator<Item = &'a MetricSample>,
{
    let mut anomalies = Vec::new();
    let mut previous_memory: Option<f64> = None;

    for sample in samples {
        check_sample(sample, previous_memory, thresholds, &mut anomalies);
        previous_memory = Some(sample.memory_usage);
    }

    anomalies
}

fn check_sample(
    sample: &MetricSample,
    previous_memory: Option<f64>,
    thresholds: &ThresholdConfig,
    anomalies: &mut Vec<Anomaly>,
) {
    let screen = || sample.active_screen_name.clone();

    if sample.frame_rate < thresholds.min_frame_rate {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::LowFrameRate,
                sample.timestamp,
                sample.frame_rate,
                thresholds.min_frame_rate,
                format!(
                    "Low frame rate: {:.1} fps (threshold: {:.1} fps)",
                    sample.frame_rate, thresholds.min_frame_rate
                ),
            )
            .with_screen(screen()),
        );
    }

    if sample.processor_load > thresholds.max_processor_load {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::HighProcessorLoad,
                sample.timestamp,
                sample.processor_load,
                thresholds.max_processor_load,
                format!(
                    "High processor load: {:.1}% (threshold: {:.1}%)",
                    sample.processor_load, thresholds.max_processor_load
                ),
            )
            .with_screen(screen()),
        );
    }

    if sample.memory_usage > thresholds.max_memory {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::HighMemory,
                sample.timestamp,
                sample.memory_usage,
                thresholds.max_memory,
                format!(
                    "High memory usage: {:.1} MB (threshold: {:.1} MB)",
                    sample.memory_usage, thresholds.max_memory
                ),
            )
            .with_screen(screen()),
        );
    }

    if let Some(ratio) = previous_memory.and_then(|prev| growth_ratio(prev, sample.memory_usage)) {
        if ratio > thresholds.memory_spike_factor {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::MemorySpike,
                    sample.timestamp,
                    ratio,
                    thresholds.memory_spike_factor,
                    format!("Memory spike: grew {ratio:.1}x since the previous sample"),
                )
                .with_screen(screen()),
            );
        }
    }

    for request in &sample.network_requests {
        if request.duration > thresholds.max_network_duration {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::SlowNetworkRequest,
                    request.timestamp,
                    request.duration,
                    thresholds.max_network_duration,
                    format!(
                        "Slow network request: {:.2}s to {}",
                        request.duration, request.url
                    ),
                )
                .with_screen(screen()),
            );
        }
    }
}

/// `current / previous`, or `None` when the previous value is zero.
fn growth_ratio(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some(current / previous)
}
