//! Error types for the performance monitor.
//!
//! This module defines a hierarchical error system:
//! - [`MonitorError`]: Top-level errors returned by the controller
//! - [`ExportError`]: Report rendering and file output errors
//! - [`ConfigError`]: Configuration errors
//! - [`SchedulerError`]: Background sampling errors
//!
//! Threshold values are never validated, so there is no threshold error:
//! out-of-range thresholds produce a degenerate analysis instead.
//!
//! All errors implement `Send + Sync` for async compatibility.

use std::path::Path;

use thiserror::Error;

/// Top-level monitor error.
///
/// This is the main error type returned by the controller's lifecycle API.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Report export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scheduler error.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// A global monitor instance is already installed.
    #[error("Global monitor already initialized")]
    AlreadyInitialized,
}

/// Report export errors.
///
/// A failure in one format fails the export as a whole. Files written for
/// earlier formats are left on disk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("Failed to create report directory {path}: {message}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },

    /// A report file could not be written.
    #[error("Failed to write report {path}: {message}")]
    Write {
        /// File that could not be written.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },

    /// A report could not be serialized.
    #[error("Failed to serialize {format} report: {message}")]
    Serialization {
        /// Format being rendered.
        format: String,
        /// Description of the serialization failure.
        message: String,
    },

    /// The background export worker did not complete.
    #[error("Export worker failed: {message}")]
    WorkerFailed {
        /// Description of the worker failure.
        message: String,
    },
}

impl ExportError {
    /// Build a [`ExportError::Write`] from an I/O error.
    #[must_use]
    pub fn write(path: &Path, err: &std::io::Error) -> Self {
        Self::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build a [`ExportError::CreateDirectory`] from an I/O error.
    #[must_use]
    pub fn create_directory(path: &Path, err: &std::io::Error) -> Self {
        Self::CreateDirectory {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Scheduler errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Sampling was started outside of a tokio runtime.
    #[error("No tokio runtime available to drive sampling")]
    NoRuntime,
}
