//! End-to-end monitoring workflows.
//!
//! These tests drive the public API the way an embedding host would:
//! - Session: start → sample → stop → analyse
//! - Reports: export every format and read the files back
//! - Probes: host callbacks flowing into samples and anomalies

mod probe_pipeline;
mod report_export;
mod session_workflow;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use perf_monitor::traits::TimeProvider;

/// Fixed start of every test clock: 2026-01-01T00:00:00Z.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// A clock the test moves forward by hand.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(base_time())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl TimeProvider for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
