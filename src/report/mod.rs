//! Report export.
//!
//! [`ReportExporter`] renders an [`Analysis`] and the samples it was built
//! from into one file per requested [`ReportFormat`]. Rendering is pure: the
//! exporter never touches probes or the store.
//!
//! - [`json`]: Full document with sorted keys and ISO 8601 dates
//! - [`csv`]: One row per sample
//! - [`text`]: Human-readable summary, also used for [`ReportFormat::Pdf`]
//!
//! # Example
//!
//! ```no_run
//! use perf_monitor::analysis::{analyze, ThresholdConfig};
//! use perf_monitor::report::{ReportExporter, ReportFormat};
//!
//! let analysis = analyze(&[], &ThresholdConfig::default());
//! let exporter = ReportExporter::new("./reports");
//! let paths = exporter.export(&analysis, &[], &[ReportFormat::Json])?;
//! println!("wrote {}", paths[0].display());
//! # Ok::<(), perf_monitor::error::ExportError>(())
//! ```

pub mod csv;
mod device;
pub mod json;
pub mod text;

pub use device::DeviceInfo;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::analysis::Analysis;
use crate::error::ExportError;
use crate::traits::MetricSample;

/// Prefix of every report file name.
pub const FILE_PREFIX: &str = "performance_report_";

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Output format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Sorted-key JSON document.
    Json,
    /// Comma-separated samples.
    Csv,
    /// Plain-text summary.
    Text,
    /// Paged document. No renderer is bundled, so this is written as text.
    Pdf,
}

impl ReportFormat {
    /// File extension actually written for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text | Self::Pdf => "txt",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Writes reports into a directory.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
    device_info: DeviceInfo,
}

impl ReportExporter {
    /// Create an exporter writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            device_info: DeviceInfo::current(),
        }
    }

    /// Override the device block embedded in JSON reports.
    #[must_use]
    pub fn with_device_info(mut self, device_info: DeviceInfo) -> Self {
        self.device_info = device_info;
        self
    }

    /// Directory reports are written into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Device block embedded in JSON reports.
    #[must_use]
    pub const fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Export using the current time for file names and headers.
    ///
    /// # Errors
    ///
    /// See [`ReportExporter::export_at`].
    pub fn export(
        &self,
        analysis: &Analysis,
        samples: &[MetricSample],
        formats: &[ReportFormat],
    ) -> Result<Vec<PathBuf>, ExportError> {
        self.export_at(Utc::now(), analysis, samples, formats)
    }

    /// Write one file per format, in request order.
    ///
    /// Returns the written paths in the same order. Duplicate formats map to
    /// the same path and are written once.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Files written for earlier formats are left
    /// in place.
    pub fn export_at(
        &self,
        generated_at: DateTime<Utc>,
        analysis: &Analysis,
        samples: &[MetricSample],
        formats: &[ReportFormat],
    ) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            error!(
                dir = %self.output_dir.display(),
                error = %e,
                "Failed to create report directory"
            );
            ExportError::create_directory(&self.output_dir, &e)
        })?;

        let stamp = generated_at.format(FILE_TIMESTAMP_FORMAT).to_string();
        let mut written: Vec<PathBuf> = Vec::with_capacity(formats.len());

        for &format in formats {
            let path = self
                .output_dir
                .join(format!("{FILE_PREFIX}{stamp}.{}", format.extension()));
            if written.contains(&path) {
                continue;
            }

            let content = self
                .render(format, generated_at, analysis, samples)
                .inspect_err(|e| error!(%format, error = %e, "Failed to render report"))?;

            std::fs::write(&path, content).map_err(|e| {
                error!(path = %path.display(), error = %e, "Failed to write report");
                ExportError::write(&path, &e)
            })?;

            info!(%format, path = %path.display(), "Report written");
            written.push(path);
        }

        Ok(written)
    }

    fn render(
        &self,
        format: ReportFormat,
        generated_at: DateTime<Utc>,
        analysis: &Analysis,
        samples: &[MetricSample],
    ) -> Result<String, ExportError> {
        match format {
            ReportFormat::Json => json::render(analysis, samples, &self.device_info, generated_at),
            ReportFormat::Csv => Ok(csv::render(samples)),
            ReportFormat::Text | ReportFormat::Pdf => {
                Ok(text::render(analysis, samples, generated_at))
            }
        }
    }
}
