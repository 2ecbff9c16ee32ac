//! Recommendation rules.

use std::collections::BTreeSet;

use super::types::{Anomaly, AnomalyKind, ThresholdConfig};

/// Recommendation emitted when there is nothing to analyse.
pub const NO_DATA: &str = "No data available for analysis";

/// Share of a limit at which average load already warrants advice.
const WARNING_RATIO: f64 = 0.8;

/// Share of the memory limit at which a peak is critical.
const CRITICAL_PEAK_RATIO: f64 = 1.2;

/// Aggregates the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct Aggregates {
    /// Mean frame rate.
    pub average_frame_rate: f64,
    /// Mean processor load.
    pub average_processor_load: f64,
    /// Mean memory.
    pub average_memory: f64,
    /// Highest memory.
    pub peak_memory: f64,
}

/// Build the ordered recommendation list.
#[must_use]
pub fn generate(
    aggregates: &Aggregates,
    anomalies: &[Anomaly],
    thresholds: &ThresholdConfig,
) -> Vec<String> {
    let mut out = Vec::new();

    if aggregates.average_frame_rate < thresholds.min_frame_rate {
        out.push(format!(
            "Optimize rendering: average frame rate ({:.1} fps) is below the {:.1} fps target",
            aggregates.average_frame_rate, thresholds.min_frame_rate
        ));
        out.push("- Reduce animation complexity".to_string());
        out.push("- Decode and scale images off the render path".to_string());
        out.push("- Cache complex drawing instead of redrawing each frame".to_string());
    }

    if aggregates.average_processor_load > thresholds.max_processor_load * WARNING_RATIO {
        out.push(format!(
            "Reduce processor load: average load ({:.1}%) is high",
            aggregates.average_processor_load
        ));
        out.push("- Move heavy computation to background workers".to_string());
        out.push("- Optimize data-processing algorithms".to_string());
        out.push("- Load expensive resources lazily".to_string());
    }

    if aggregates.average_memory > thresholds.max_memory * WARNING_RATIO {
        out.push(format!(
            "Reduce memory usage: average footprint ({:.1} MB) is high",
            aggregates.average_memory
        ));
        out.push("- Release resources that are no longer used".to_string());
        out.push("- Break reference cycles".to_string());
        out.push("- Bound image and data caches".to_string());
    }

    if aggregates.peak_memory > thresholds.max_memory * CRITICAL_PEAK_RATIO {
        out.push(format!("Critical memory peak: {:.1} MB", aggregates.peak_memory));
        out.push("- Check for memory leaks".to_string());
        out.push("- Shrink cache sizes".to_string());
    }

    let kinds: BTreeSet<AnomalyKind> = anomalies.iter().map(|a| a.kind).collect();

    if kinds.contains(&AnomalyKind::LowFrameRate) {
        out.push("Interface smoothness problems detected".to_string());
    }
    if kinds.contains(&AnomalyKind::MemorySpike) {
        out.push("Sudden memory spikes detected - review how data is loaded".to_string());
    }
    if kinds.contains(&AnomalyKind::SlowNetworkRequest) {
        out.push("Slow network requests detected - optimize the API or add caching".to_string());
    }
    if kinds.contains(&AnomalyKind::BatteryDrain) {
        out.push("Fast battery drain detected - reduce background work".to_string());
    }

    if out.is_empty() {
        out.push("Application performance is healthy".to_string());
        out.push("Keep monitoring to maintain quality".to_string());
    } else {
        out.push("Profile the application to locate hotspots".to_string());
        out.push("Monitor performance regularly across usage scenarios".to_string());
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::base_time;

    fn healthy() -> Aggregates {
        Aggregates {
            average_frame_rate: 60.0,
            average_processor_load: 20.0,
            average_memory: 100.0,
            peak_memory: 120.0,
        }
    }

    #[test]
    fn test_healthy_run() {
        let recs = generate(&healthy(), &[], &ThresholdConfig::default());
        assert_eq!(
            recs,
            vec![
                "Application performance is healthy".to_string(),
                "Keep monitoring to maintain quality".to_string(),
            ]
        );
    }

    #[test]
    fn test_low_frame_rate_rule() {
        let aggregates = Aggregates {
            average_frame_rate: 40.0,
            ..healthy()
        };
        let recs = generate(&aggregates, &[], &ThresholdConfig::default());
        assert!(recs[0].starts_with("Optimize rendering"));
        assert!(recs[0].contains("40.0 fps"));
        assert_eq!(recs.len(), 6);
        assert_eq!(
            recs.last().map(String::as_str),
            Some("Monitor performance regularly across usage scenarios")
        );
    }

    #[test]
    fn test_processor_rule_uses_warning_ratio() {
        // 80% of the 80% limit is 64%.
        let below = Aggregates {
            average_processor_load: 64.0,
            ..healthy()
        };
        let above = Aggregates {
            average_processor_load: 64.5,
            ..healthy()
        };
        let t = ThresholdConfig::default();
        assert!(!generate(&below, &[], &t)[0].starts_with("Reduce processor load"));
        assert!(generate(&above, &[], &t)[0].starts_with("Reduce processor load"));
    }

    #[test]
    fn test_memory_rules() {
        let aggregates = Aggregates {
            average_memory: 170.0,
            peak_memory: 250.0,
            ..healthy()
        };
        let recs = generate(&aggregates, &[], &ThresholdConfig::default());
        assert!(recs.iter().any(|r| r.starts_with("Reduce memory usage")));
        assert!(recs.iter().any(|r| r == "Critical memory peak: 250.0 MB"));
    }

    #[test]
    fn test_anomaly_kind_hints() {
        let anomalies = vec![
            Anomaly::new(AnomalyKind::MemorySpike, base_time(), 2.0, 1.5, "spike"),
            Anomaly::new(AnomalyKind::SlowNetworkRequest, base_time(), 7.0, 5.0, "slow"),
            Anomaly::new(AnomalyKind::BatteryDrain, base_time(), 8.0, 5.0, "drain"),
        ];
        let recs = generate(&healthy(), &anomalies, &ThresholdConfig::default());
        assert!(recs.iter().any(|r| r.starts_with("Sudden memory spikes")));
        assert!(recs.iter().any(|r| r.starts_with("Slow network requests")));
        assert!(recs.iter().any(|r| r.starts_with("Fast battery drain")));
        assert!(!recs.iter().any(|r| r.starts_with("Interface smoothness")));
    }
}
