//! Reference probe implementations.
//!
//! Hosts with their own instrumentation implement [`crate::traits::Probe`]
//! directly. These adapters cover the common cases:
//! - [`GaugeProbe`]: a value the host pushes (frame rate, processor load, memory)
//! - [`FrameRateProbe`]: frames per second from per-frame callbacks
//! - [`ScreenProbe`]: the active screen, from explicit navigation callbacks
//! - [`NetworkProbe`]: completed requests, with statistics and efficiency
//! - [`BatteryProbe`]: battery level with drain tracking

mod battery;
mod frame_rate;
mod gauge;
mod network;
mod screen;

pub use battery::{
    BatteryProbe, BatterySnapshot, EnergyStats, FAST_DRAIN_PERCENT_PER_MINUTE, MAX_SNAPSHOTS,
    NORMAL_DRAIN_PERCENT_PER_HOUR,
};
pub use frame_rate::{FrameRateProbe, PerformanceCategory, INITIAL_FRAME_RATE, MIN_WINDOW_SECS};
pub use gauge::GaugeProbe;
pub use network::{
    host_of, NetworkEfficiency, NetworkProbe, NetworkStatistics, LARGE_RESPONSE_BYTES,
    MAX_REQUESTS, SLOW_REQUEST_SECS,
};
pub use screen::{ScreenProbe, ScreenVisit, MAX_HISTORY};
