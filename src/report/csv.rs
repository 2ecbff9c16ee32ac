//! CSV report rendering.

use std::fmt::Write as _;

use crate::traits::MetricSample;

/// Header row of every CSV report.
pub const HEADER: &str =
    "Timestamp,FPS,CPU_Usage,Memory_Usage,Battery_Level,Screen_Name,Network_Requests_Count";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one row per sample under [`HEADER`].
///
/// Missing battery levels and screen names become empty fields; commas in
/// screen names are replaced with semicolons.
#[must_use]
pub fn render(samples: &[MetricSample]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + samples.len() * 64);
    out.push_str(HEADER);
    out.push('\n');

    for sample in samples {
        let battery = sample
            .battery_level
            .map(|level| format!("{level:?}"))
            .unwrap_or_default();
        let screen = sample
            .active_screen_name
            .as_deref()
            .map(|name| name.replace(',', ";"))
            .unwrap_or_default();

        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{},{:?},{:?},{:?},{},{},{}",
            sample.timestamp.format(TIMESTAMP_FORMAT),
            sample.frame_rate,
            sample.processor_load,
            sample.memory_usage,
            battery,
            screen,
            sample.network_requests.len(),
        );
    }

    out
}
