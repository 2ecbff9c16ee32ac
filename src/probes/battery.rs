//! Battery probe with drain-rate tracking.
//!
//! Battery drain needs a slope over time rather than a per-sample threshold,
//! so it is tracked here instead of in the detector. Every scheduled
//! collection records a snapshot; when the level falls faster than
//! [`FAST_DRAIN_PERCENT_PER_MINUTE`] between two consecutive snapshots a
//! [`AnomalyKind::BatteryDrain`] anomaly is kept and surfaced through
//! [`Probe::reported_anomalies`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{Anomaly, AnomalyKind};
use crate::sync::lock;
use crate::traits::{
    BatterySource, BatteryState, Probe, ProbeKind, ProbeReading, RealTimeProvider, TimeProvider,
};

/// Snapshots and drain anomalies retained.
pub const MAX_SNAPSHOTS: usize = 1000;

/// Drain faster than this between two snapshots is anomalous.
pub const FAST_DRAIN_PERCENT_PER_MINUTE: f64 = 5.0;

/// Drain per hour considered normal by [`EnergyStats::efficiency_score`].
pub const NORMAL_DRAIN_PERCENT_PER_HOUR: f64 = 10.0;

/// One recorded battery reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySnapshot {
    /// Level in percent.
    pub level: f64,
    /// Power state at the time.
    pub state: BatteryState,
    /// When it was taken.
    pub timestamp: DateTime<Utc>,
}

/// Energy consumption summary over the retained snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyStats {
    /// Level lost between the first and last snapshot, in percent.
    pub total_drain_percent: f64,
    /// Mean drain in percent per hour.
    pub drain_per_hour: f64,
    /// Seconds until empty at the mean drain, if draining.
    pub time_to_empty_secs: Option<f64>,
    /// Seconds between the first and last charging snapshot.
    pub charging_time_secs: Option<f64>,
    /// Whether the source currently reports charging.
    pub is_charging: bool,
    /// Current level in percent, if available.
    pub current_level: Option<f64>,
}

impl EnergyStats {
    /// 1.0 at or below normal drain, falling as drain grows.
    #[must_use]
    pub fn efficiency_score(&self) -> f64 {
        if self.drain_per_hour <= 0.0 {
            return 1.0;
        }
        (NORMAL_DRAIN_PERCENT_PER_HOUR / self.drain_per_hour).min(1.0)
    }
}

#[derive(Debug, Default)]
struct BatteryHistory {
    snapshots: VecDeque<BatterySnapshot>,
    drain_anomalies: VecDeque<Anomaly>,
}

/// Reads a host [`BatterySource`] and watches for fast drain.
///
/// Drain anomalies are stamped with the probe's own clock, and the monitor
/// drops reported anomalies older than its first stored sample. Give the
/// probe the same [`TimeProvider`] as the monitor.
pub struct BatteryProbe {
    source: Arc<dyn BatterySource>,
    clock: Arc<dyn TimeProvider>,
    history: Mutex<BatteryHistory>,
}

impl fmt::Debug for BatteryProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatteryProbe").finish_non_exhaustive()
    }
}

impl BatteryProbe {
    /// Create a probe over `source` using the system clock.
    ///
    /// Only suitable when the monitor also uses the system clock.
    #[must_use]
    pub fn new(source: Arc<dyn BatterySource>) -> Self {
        Self::with_clock(source, Arc::new(RealTimeProvider))
    }

    /// Create a probe over `source` using a custom clock.
    ///
    /// Pass the clock given to
    /// [`MonitorBuilder::clock`](crate::controller::MonitorBuilder::clock);
    /// anomalies stamped by a clock that lags the monitor's are filtered out
    /// of analysis.
    #[must_use]
    pub fn with_clock(source: Arc<dyn BatterySource>, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            source,
            clock,
            history: Mutex::new(BatteryHistory::default()),
        }
    }

    /// Current level in percent, `None` when unavailable.
    #[must_use]
    pub fn level_percent(&self) -> Option<f64> {
        self.source
            .level()
            .filter(|level| level.is_finite() && *level >= 0.0)
            .map(|level| (level * 100.0).min(100.0))
    }

    /// Retained snapshots, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BatterySnapshot> {
        lock(&self.history, "battery history")
            .snapshots
            .iter()
            .cloned()
            .collect()
    }

    /// Forget snapshots and drain anomalies.
    pub fn clear(&self) {
        let mut history = lock(&self.history, "battery history");
        history.snapshots.clear();
        history.drain_anomalies.clear();
    }

    /// Summarise consumption over the retained snapshots.
    #[must_use]
    pub fn energy_stats(&self) -> EnergyStats {
        let is_charging = self.source.state() == BatteryState::Charging;
        let current_level = self.level_percent();
        let history = lock(&self.history, "battery history");

        let endpoints = (history.snapshots.len() >= 2)
            .then(|| history.snapshots.front().zip(history.snapshots.back()))
            .flatten();
        let Some((first, last)) = endpoints else {
            return EnergyStats {
                is_charging,
                current_level,
                ..EnergyStats::default()
            };
        };

        let total_secs = seconds_between(first.timestamp, last.timestamp);
        let total_drain_percent = first.level - last.level;
        let drain_per_hour = if total_secs > 0.0 {
            total_drain_percent / total_secs * 3600.0
        } else {
            0.0
        };
        let time_to_empty_secs =
            (drain_per_hour > 0.0).then(|| last.level / drain_per_hour * 3600.0);

        let mut charging = history
            .snapshots
            .iter()
            .filter(|s| s.state == BatteryState::Charging);
        let charging_time_secs = match (charging.next(), charging.last()) {
            (Some(start), Some(end)) => Some(seconds_between(start.timestamp, end.timestamp)),
            _ => None,
        };

        EnergyStats {
            total_drain_percent,
            drain_per_hour,
            time_to_empty_secs,
            charging_time_secs,
            is_charging,
            current_level,
        }
    }

    fn record(&self, level: f64, state: BatteryState) {
        let snapshot = BatterySnapshot {
            level,
            state,
            timestamp: self.clock.now(),
        };

        let mut history = lock(&self.history, "battery history");
        if let Some(previous) = history.snapshots.back() {
            if let Some(anomaly) = drain_anomaly(previous, &snapshot) {
                tracing::warn!(rate = anomaly.observed_value, "Fast battery drain detected");
                history.drain_anomalies.push_back(anomaly);
                while history.drain_anomalies.len() > MAX_SNAPSHOTS {
                    history.drain_anomalies.pop_front();
                }
            }
        }

        history.snapshots.push_back(snapshot);
        while history.snapshots.len() > MAX_SNAPSHOTS {
            history.snapshots.pop_front();
        }
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).to_std().map_or(0.0, |d| d.as_secs_f64())
}

fn drain_anomaly(previous: &BatterySnapshot, current: &BatterySnapshot) -> Option<Anomaly> {
    let secs = seconds_between(previous.timestamp, current.timestamp);
    let drop = previous.level - current.level;
    if secs <= 0.0 || drop <= 0.0 {
        return None;
    }

    let per_minute = drop / secs * 60.0;
    (per_minute > FAST_DRAIN_PERCENT_PER_MINUTE).then(|| {
        Anomaly::new(
            AnomalyKind::BatteryDrain,
            current.timestamp,
            per_minute,
            FAST_DRAIN_PERCENT_PER_MINUTE,
            format!(
                "Fast battery drain: {per_minute:.1}%/min (threshold: {FAST_DRAIN_PERCENT_PER_MINUTE:.1}%/min)"
            ),
        )
    })
}

impl Probe for BatteryProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Battery
    }

    fn start(&self) {}

    fn stop(&self) {}

    fn read(&self) -> ProbeReading {
        ProbeReading::Battery(self.level_percent())
    }

    fn collect(&self) -> ProbeReading {
        let level = self.level_percent();
        if let Some(level) = level {
            self.record(level, self.source.state());
        }
        ProbeReading::Battery(level)
    }

    fn reported_anomalies(&self) -> Vec<Anomaly> {
        lock(&self.history, "battery history")
            .drain_anomalies
            .iter()
            .cloned()
            .collect()
    }
}
