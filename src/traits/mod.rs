//! Trait definitions for pluggable and mockable dependencies.
//!
//! This module defines traits for:
//! - [`Probe`]: A metric source the controller samples each tick
//! - [`BatterySource`]: Host battery readings consumed by the battery probe
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! It also re-exports shared types from the `types` submodule.
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use perf_monitor::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

mod types;

pub use types::{BatteryState, MetricSample, NetworkRequestRecord, ProbeKind, ProbeReading};

use chrono::{DateTime, Utc};

use crate::analysis::Anomaly;

/// A pluggable metric source.
///
/// Probes are supplied by the embedding host and shared with it, so every
/// method takes `&self` and implementations use interior mutability. Reads
/// must return promptly: a probe that has to block does so on its own
/// execution context and reports its latest value here.
#[cfg_attr(test, mockall::automock)]
pub trait Probe: Send + Sync {
    /// The metric this probe measures.
    fn kind(&self) -> ProbeKind;

    /// Begin observing.
    fn start(&self);

    /// Stop observing.
    fn stop(&self);

    /// Read the current value without consuming anything.
    fn read(&self) -> ProbeReading;

    /// Read the value for a scheduled sample.
    ///
    /// Probes that accumulate events between samples (network requests)
    /// drain them here. Defaults to [`Probe::read`].
    fn collect(&self) -> ProbeReading {
        self.read()
    }

    /// Anomalies the probe detected on its own, such as battery drain.
    fn reported_anomalies(&self) -> Vec<Anomaly> {
        Vec::new()
    }
}

/// Host battery readings.
#[cfg_attr(test, mockall::automock)]
pub trait BatterySource: Send + Sync {
    /// Battery level as a fraction in `0.0..=1.0`, `None` when unavailable.
    fn level(&self) -> Option<f64>;

    /// Current power state.
    fn state(&self) -> BatteryState;
}

/// Time provider trait for mocking.
///
/// This trait abstracts time operations to allow for
/// deterministic testing.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
