//! Performance Monitor
//!
//! An in-process telemetry engine: periodically samples runtime health
//! metrics from pluggable probes, keeps a bounded rolling history, detects
//! threshold anomalies, computes a 0-100 health score and exports reports.
//!
//! # Features
//!
//! - Probe contract with reference adapters (gauges, frame rate, screens,
//!   network, battery)
//! - Drift-free background sampling on tokio
//! - Bounded FIFO sample store
//! - Anomaly detection, weighted scoring, recommendations and per-screen
//!   breakdown
//! - JSON, CSV and text reports
//!
//! # Quick Start
//!
//! ```bash
//! PERF_RUN_SECS=10 PERF_REPORT_DIR=./reports ./perf-monitor
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐ tick ┌────────────┐ collect ┌────────┐
//! │ Scheduler │─────▶│ Controller │────────▶│ Probes │
//! └───────────┘      └─────┬──────┘         └────────┘
//!                          │ append / snapshot
//!                          ▼
//!                    ┌────────────┐ analyze ┌──────────┐ export ┌─────────┐
//!                    │ MetricStore│────────▶│ Analysis │───────▶│ Reports │
//!                    └────────────┘         └──────────┘        └─────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod config;
pub mod controller;
pub mod error;
pub mod probes;
pub mod report;
pub mod scheduler;
pub mod store;
mod sync;
pub mod traits;

#[cfg(test)]
mod test_utils;
