//! Plain-text report rendering.
//!
//! Also serves as the fallback for [`super::ReportFormat::Pdf`].

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::analysis::Analysis;
use crate::traits::MetricSample;

/// Anomalies listed before the remainder is summarised.
pub const MAX_LISTED_ANOMALIES: usize = 20;

const RULE: &str = "==================================================";

/// Render a sectioned, human-readable report.
#[must_use]
pub fn render(
    analysis: &Analysis,
    samples: &[MetricSample],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, analysis, samples, generated_at);
    out
}

fn write_report(
    out: &mut String,
    analysis: &Analysis,
    samples: &[MetricSample],
    generated_at: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "PERFORMANCE REPORT")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        writeln!(
            out,
            "Period: {} - {}",
            first.timestamp.format("%Y-%m-%d %H:%M:%S"),
            last.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    writeln!(out)?;

    writeln!(out, "SUMMARY")?;
    writeln!(out, "  Overall score: {}/100", analysis.overall_score)?;
    writeln!(out, "  Data points: {}", analysis.total_data_points)?;
    writeln!(out, "  Average frame rate: {:.1} fps", analysis.average_frame_rate)?;
    writeln!(out, "  Average processor load: {:.1}%", analysis.average_processor_load)?;
    writeln!(out, "  Average memory: {:.1} MB", analysis.average_memory)?;
    writeln!(out, "  Peak memory: {:.1} MB", analysis.peak_memory)?;
    writeln!(out)?;

    if !analysis.anomalies.is_empty() {
        writeln!(out, "ANOMALIES ({})", analysis.anomalies.len())?;
        for (index, anomaly) in analysis
            .anomalies
            .iter()
            .take(MAX_LISTED_ANOMALIES)
            .enumerate()
        {
            write!(
                out,
                "  {}. [{}] {}",
                index + 1,
                anomaly.timestamp.format("%H:%M:%S"),
                anomaly.description
            )?;
            if let Some(screen) = &anomaly.screen_name {
                write!(out, " (screen: {screen})")?;
            }
            writeln!(out)?;
        }
        let hidden = analysis.anomalies.len().saturating_sub(MAX_LISTED_ANOMALIES);
        if hidden > 0 {
            writeln!(out, "  +{hidden} more")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "RECOMMENDATIONS")?;
    for (index, recommendation) in analysis.recommendations.iter().enumerate() {
        writeln!(out, "  {}. {recommendation}", index + 1)?;
    }
    writeln!(out)?;

    if !analysis.screen_performance.is_empty() {
        writeln!(out, "SCREENS")?;
        for (name, screen) in &analysis.screen_performance {
            writeln!(out, "  {name}")?;
            writeln!(out, "    Frame rate: {:.1} fps", screen.average_frame_rate)?;
            writeln!(out, "    Processor load: {:.1}%", screen.average_processor_load)?;
            writeln!(out, "    Memory: {:.1} MB", screen.average_memory)?;
            writeln!(out, "    Time on screen: {:.1}s", screen.time_on_screen)?;
            writeln!(out, "    Samples: {}", screen.sample_count)?;
            writeln!(out, "    Anomalies: {}", screen.anomaly_count)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{RULE}")
}
