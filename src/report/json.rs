//! JSON report rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::DeviceInfo;
use crate::analysis::Analysis;
use crate::error::ExportError;
use crate::traits::MetricSample;

/// Top-level JSON report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The analysis the report was built from.
    pub analysis: Analysis,
    /// Every sample the analysis covered.
    pub raw_data: Vec<MetricSample>,
    /// Host identification.
    pub device_info: DeviceInfo,
}

/// Render a pretty-printed JSON report with sorted keys.
///
/// # Errors
///
/// Returns [`ExportError::Serialization`] if a value cannot be encoded.
pub fn render(
    analysis: &Analysis,
    samples: &[MetricSample],
    device_info: &DeviceInfo,
    generated_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let report = JsonReport {
        generated_at,
        analysis: analysis.clone(),
        raw_data: samples.to_vec(),
        device_info: device_info.clone(),
    };

    // `serde_json::Map` is ordered by key, so going through a `Value`
    // sorts every object.
    let value = serde_json::to_value(&report).map_err(serialization_error)?;
    serde_json::to_string_pretty(&value).map_err(serialization_error)
}

/// Parse a JSON report back into memory.
///
/// # Errors
///
/// Returns [`ExportError::Serialization`] if the document is malformed.
pub fn parse(content: &str) -> Result<JsonReport, ExportError> {
    serde_json::from_str(content).map_err(serialization_error)
}

fn serialization_error(err: serde_json::Error) -> ExportError {
    ExportError::Serialization {
        format: "json".to_string(),
        message: err.to_string(),
    }
}
