//! Shared types for the traits module.
//!
//! This module defines the observation types passed between probes, the
//! controller and the analysis pipeline:
//! - [`MetricSample`]: One timestamped bundle of metric values
//! - [`NetworkRequestRecord`]: One observed network request
//! - [`ProbeKind`] / [`ProbeReading`]: What a probe measures and what it returned
//! - [`BatteryState`]: Power state reported by a battery source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single network request observed by a network probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequestRecord {
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Response status code, absent when no response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Duration in seconds.
    pub duration: f64,
    /// Request body size in bytes.
    pub request_size: u64,
    /// Response body size in bytes.
    pub response_size: u64,
    /// When the request was observed.
    pub timestamp: DateTime<Utc>,
}

impl NetworkRequestRecord {
    /// Create a new request record without a status code.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        duration: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            status_code: None,
            duration,
            request_size: 0,
            response_size: 0,
            timestamp,
        }
    }

    /// Set the response status code.
    #[must_use]
    pub const fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Set request and response sizes in bytes.
    #[must_use]
    pub const fn with_sizes(mut self, request_size: u64, response_size: u64) -> Self {
        self.request_size = request_size;
        self.response_size = response_size;
        self
    }

    /// Whether the request completed with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code.is_some_and(|code| (200..300).contains(&code))
    }
}

/// One observation of every metric, captured in a single tick.
///
/// Samples are created once by the controller and never mutated; the store
/// hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Instant of capture.
    pub timestamp: DateTime<Utc>,
    /// Frames per second.
    pub frame_rate: f64,
    /// Processor load in percent (0-100).
    pub processor_load: f64,
    /// Resident memory in megabytes.
    pub memory_usage: f64,
    /// Battery level in percent, absent when the host cannot report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    /// Label of the UI context that was active, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_screen_name: Option<String>,
    /// Requests observed since the previous sample.
    #[serde(default)]
    pub network_requests: Vec<NetworkRequestRecord>,
}

impl MetricSample {
    /// Create a sample with the three always-present metrics.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        frame_rate: f64,
        processor_load: f64,
        memory_usage: f64,
    ) -> Self {
        Self {
            timestamp,
            frame_rate,
            processor_load,
            memory_usage,
            battery_level: None,
            active_screen_name: None,
            network_requests: Vec::new(),
        }
    }

    /// Set the battery level.
    #[must_use]
    pub const fn with_battery(mut self, level: f64) -> Self {
        self.battery_level = Some(level);
        self
    }

    /// Set the active screen name.
    #[must_use]
    pub fn with_screen(mut self, name: impl Into<String>) -> Self {
        self.active_screen_name = Some(name.into());
        self
    }

    /// Attach network requests.
    #[must_use]
    pub fn with_network_requests(mut self, requests: Vec<NetworkRequestRecord>) -> Self {
        self.network_requests = requests;
        self
    }
}

/// The metric a probe measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Frames per second.
    FrameRate,
    /// Processor load in percent.
    ProcessorLoad,
    /// Resident memory in megabytes.
    Memory,
    /// Battery level in percent.
    Battery,
    /// Network requests.
    Network,
    /// Active UI screen.
    ActiveScreen,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrameRate => write!(f, "frame_rate"),
            Self::ProcessorLoad => write!(f, "processor_load"),
            Self::Memory => write!(f, "memory"),
            Self::Battery => write!(f, "battery"),
            Self::Network => write!(f, "network"),
            Self::ActiveScreen => write!(f, "active_screen"),
        }
    }
}

/// A value read from a probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeReading {
    /// Frames per second.
    FrameRate(f64),
    /// Processor load in percent.
    ProcessorLoad(f64),
    /// Resident memory in megabytes.
    Memory(f64),
    /// Battery level in percent, `None` when unavailable.
    Battery(Option<f64>),
    /// Requests observed by the probe.
    Network(Vec<NetworkRequestRecord>),
    /// Active screen name, `None` when no screen is known.
    ActiveScreen(Option<String>),
}

impl ProbeReading {
    /// The kind of metric this reading carries.
    #[must_use]
    pub const fn kind(&self) -> ProbeKind {
        match self {
            Self::FrameRate(_) => ProbeKind::FrameRate,
            Self::ProcessorLoad(_) => ProbeKind::ProcessorLoad,
            Self::Memory(_) => ProbeKind::Memory,
            Self::Battery(_) => ProbeKind::Battery,
            Self::Network(_) => ProbeKind::Network,
            Self::ActiveScreen(_) => ProbeKind::ActiveScreen,
        }
    }
}

/// Power state reported by a battery source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryState {
    /// State cannot be determined.
    #[default]
    Unknown,
    /// Running on battery.
    Unplugged,
    /// Connected to power and charging.
    Charging,
    /// Connected to power and full.
    Full,
}
