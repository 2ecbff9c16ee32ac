//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock implementations for traits
//! - Sample and request fixtures at a fixed base time
//! - A manually advanced clock
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::traits::{
    MetricSample, MockBatterySource, MockProbe, MockTimeProvider, NetworkRequestRecord, ProbeKind,
    ProbeReading, TimeProvider,
};

/// Fixed instant all fixtures are anchored to: 2026-01-01T00:00:00Z.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// A sample at [`base_time`].
#[must_use]
pub fn sample(frame_rate: f64, processor_load: f64, memory: f64) -> MetricSample {
    MetricSample::new(base_time(), frame_rate, processor_load, memory)
}

/// A sample `secs` seconds after [`base_time`].
#[must_use]
pub fn sample_at(secs: i64, frame_rate: f64, processor_load: f64, memory: f64) -> MetricSample {
    MetricSample::new(
        base_time() + Duration::seconds(secs),
        frame_rate,
        processor_load,
        memory,
    )
}

/// A successful GET request at [`base_time`].
#[must_use]
pub fn request(url: &str, duration: f64) -> NetworkRequestRecord {
    NetworkRequestRecord::new(url, "GET", duration, base_time()).with_status(200)
}

/// Create a mock time provider that always returns `time`.
#[must_use]
pub fn mock_time(time: DateTime<Utc>) -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().return_const(time);
    mock
}

/// Create a mock probe that answers every read with `reading`.
#[must_use]
pub fn mock_probe(reading: ProbeReading) -> MockProbe {
    let kind: ProbeKind = reading.kind();
    let mut mock = MockProbe::new();
    mock.expect_kind().return_const(kind);
    mock.expect_start().return_const(());
    mock.expect_stop().return_const(());
    let read_value = reading.clone();
    mock.expect_read().returning(move || read_value.clone());
    mock.expect_collect().returning(move || reading.clone());
    mock.expect_reported_anomalies().returning(Vec::new);
    mock
}

/// Create a mock battery source reporting a fixed fraction.
#[must_use]
pub fn mock_battery(level: Option<f64>) -> MockBatterySource {
    let mut mock = MockBatterySource::new();
    mock.expect_level().return_const(level);
    mock.expect_state()
        .return_const(crate::traits::BatteryState::Unplugged);
    mock
}

/// A clock tests move forward by hand.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start at [`base_time`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(base_time())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl TimeProvider for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Probe;

    #[test]
    fn test_base_time() {
        assert_eq!(base_time().to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_sample_at_offsets() {
        let s = sample_at(90, 60.0, 10.0, 100.0);
        assert_eq!(s.timestamp - base_time(), Duration::seconds(90));
    }

    #[test]
    fn test_mock_time() {
        let fixed = base_time() - Duration::days(1);
        assert_eq!(mock_time(fixed).now(), fixed);
    }

    #[test]
    fn test_mock_probe() {
        let probe = mock_probe(ProbeReading::Memory(64.0));
        assert_eq!(probe.kind(), ProbeKind::Memory);
        assert_eq!(probe.collect(), ProbeReading::Memory(64.0));
        assert!(probe.reported_anomalies().is_empty());
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), base_time() + Duration::seconds(30));
    }
}
