//! Frame-rate probe computed from host frame callbacks.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::lock;
use crate::traits::{Probe, ProbeKind, ProbeReading, RealTimeProvider, TimeProvider};

/// Frame rate reported right after start, before a full window has elapsed.
pub const INITIAL_FRAME_RATE: f64 = 60.0;

/// Shortest window, in seconds, over which frame rate is recomputed.
pub const MIN_WINDOW_SECS: f64 = 1.0;

/// Coarse rating of a frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCategory {
    /// Below 20 fps.
    Poor,
    /// 20 to 30 fps.
    Fair,
    /// 30 to 50 fps.
    Good,
    /// 50 fps and above.
    Excellent,
}

impl PerformanceCategory {
    /// Rate a frame rate.
    #[must_use]
    pub fn of(frame_rate: f64) -> Self {
        if frame_rate >= 50.0 {
            Self::Excellent
        } else if frame_rate >= 30.0 {
            Self::Good
        } else if frame_rate >= 20.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

#[derive(Debug)]
struct FrameWindow {
    running: bool,
    frame_rate: f64,
    window_start: Option<DateTime<Utc>>,
    frames: u32,
}

/// Counts host-reported frames and derives frames per second.
///
/// The host calls [`FrameRateProbe::record_frame`] once per presented frame.
/// The first frame after start opens a window; once at least
/// [`MIN_WINDOW_SECS`] have passed the rate is recomputed and a new window
/// opens. Frames reported while stopped are ignored.
pub struct FrameRateProbe {
    window: Mutex<FrameWindow>,
    clock: Arc<dyn TimeProvider>,
}

impl fmt::Debug for FrameRateProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRateProbe")
            .field("frame_rate", &self.frame_rate())
            .finish_non_exhaustive()
    }
}

impl Default for FrameRateProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRateProbe {
    /// Create a probe using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(RealTimeProvider))
    }

    /// Create a probe using a custom clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            window: Mutex::new(FrameWindow {
                running: false,
                frame_rate: 0.0,
                window_start: None,
                frames: 0,
            }),
            clock,
        }
    }

    /// Record one presented frame now.
    pub fn record_frame(&self) {
        self.record_frame_at(self.clock.now());
    }

    /// Record one presented frame at `timestamp`.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_frame_at(&self, timestamp: DateTime<Utc>) {
        let mut window = lock(&self.window, "frame window");
        if !window.running {
            return;
        }

        let Some(start) = window.window_start else {
            window.window_start = Some(timestamp);
            return;
        };

        window.frames += 1;
        let elapsed = (timestamp - start)
            .to_std()
            .map_or(0.0, |d| d.as_secs_f64());
        if elapsed >= MIN_WINDOW_SECS {
            window.frame_rate = f64::from(window.frames) / elapsed;
            window.frames = 0;
            window.window_start = Some(timestamp);
        }
    }

    /// The most recently computed frame rate.
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        lock(&self.window, "frame window").frame_rate
    }

    /// Category of the current frame rate.
    #[must_use]
    pub fn category(&self) -> PerformanceCategory {
        PerformanceCategory::of(self.frame_rate())
    }
}

impl Probe for FrameRateProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::FrameRate
    }

    fn start(&self) {
        let mut window = lock(&self.window, "frame window");
        if window.running {
            tracing::debug!("Frame rate probe already running");
            return;
        }
        window.running = true;
        window.frame_rate = INITIAL_FRAME_RATE;
        window.window_start = None;
        window.frames = 0;
    }

    fn stop(&self) {
        let mut window = lock(&self.window, "frame window");
        window.running = false;
        window.frame_rate = 0.0;
        window.window_start = None;
        window.frames = 0;
    }

    fn read(&self) -> ProbeReading {
        ProbeReading::FrameRate(self.frame_rate())
    }
}
