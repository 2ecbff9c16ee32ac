//! Per-screen breakdown.

use std::collections::BTreeMap;

use super::detector;
use super::types::{ScreenPerformance, ThresholdConfig};
use crate::traits::MetricSample;

/// Group samples by active screen and aggregate each group.
///
/// Samples without a screen name are skipped. Anomalies are counted by
/// running the detector over the screen's own samples, so a memory spike is
/// judged against the previous sample *on that screen*.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn breakdown(
    samples: &[MetricSample],
    thresholds: &ThresholdConfig,
) -> BTreeMap<String, ScreenPerformance> {
    let mut groups: BTreeMap<&str, Vec<&MetricSample>> = BTreeMap::new();
    for sample in samples {
        if let Some(name) = sample.active_screen_name.as_deref() {
            groups.entry(name).or_default().push(sample);
        }
    }

    groups
        .into_iter()
        .filter_map(|(name, group)| {
            let first = group.first()?;
            let last = group.last()?;
            let n = group.len() as f64;

            let time_on_screen = (last.timestamp - first.timestamp)
                .to_std()
                .map_or(0.0, |d| d.as_secs_f64());

            let performance = ScreenPerformance {
                screen_name: name.to_string(),
                average_frame_rate: group.iter().map(|s| s.frame_rate).sum::<f64>() / n,
                average_processor_load: group.iter().map(|s| s.processor_load).sum::<f64>() / n,
                average_memory: group.iter().map(|s| s.memory_usage).sum::<f64>() / n,
                time_on_screen,
                anomaly_count: detector::detect_iter(group.iter().copied(), thresholds).len(),
                sample_count: group.len(),
            };
            Some((name.to_string(), performance))
        })
        .collect()
}
