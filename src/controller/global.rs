//! Process-wide monitor instance.
//!
//! Hosts that need the monitor reachable from anywhere install one with
//! [`initialize`] and tear it down with [`shutdown`]. Nothing is created
//! lazily.

use std::sync::{Arc, RwLock};

use super::PerformanceMonitor;
use crate::error::MonitorError;
use crate::sync::{read, write};

static INSTANCE: RwLock<Option<Arc<PerformanceMonitor>>> = RwLock::new(None);

/// Install `monitor` as the global instance.
///
/// # Errors
///
/// Returns [`MonitorError::AlreadyInitialized`] if an instance is installed.
pub fn initialize(monitor: PerformanceMonitor) -> Result<Arc<PerformanceMonitor>, MonitorError> {
    let mut slot = write(&INSTANCE, "global monitor");
    if slot.is_some() {
        return Err(MonitorError::AlreadyInitialized);
    }
    let monitor = Arc::new(monitor);
    *slot = Some(Arc::clone(&monitor));
    tracing::debug!("Global monitor installed");
    Ok(monitor)
}

/// The global instance, if installed.
#[must_use]
pub fn instance() -> Option<Arc<PerformanceMonitor>> {
    read(&INSTANCE, "global monitor").clone()
}

/// Stop and remove the global instance, returning it.
pub fn shutdown() -> Option<Arc<PerformanceMonitor>> {
    let monitor = write(&INSTANCE, "global monitor").take()?;
    if monitor.is_running() {
        monitor.stop();
    }
    tracing::debug!("Global monitor removed");
    Some(monitor)
}
