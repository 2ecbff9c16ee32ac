//! Periodic sample scheduling.
//!
//! [`SampleScheduler`] drives a "collect now" callback from a background
//! tokio task, independent of any UI frame loop. The next tick is scheduled
//! `interval` after the current tick *begins*, so collection cost does not
//! accumulate into drift, but periods are approximate rather than aligned to
//! a wall-clock grid.
//!
//! Stopping flips a shared liveness flag and signals the task through a
//! watch channel. A tick already executing is allowed to finish; callers
//! check the flag (or their own) before committing results.
//!
//! A panicking tick is caught and logged; the loop keeps its schedule.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::SchedulerError;

/// Callback invoked on each tick.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct Worker {
    interval: Duration,
    alive: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Background driver for periodic collection.
#[derive(Debug, Default)]
pub struct SampleScheduler {
    worker: Option<Worker>,
}

impl SampleScheduler {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a background task is currently scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.alive.load(Ordering::SeqCst) && !w.task.is_finished())
    }

    /// Interval of the running task.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.worker.as_ref().map(|w| w.interval)
    }

    /// Start ticking every `interval`.
    ///
    /// The first tick fires one interval after the call. Starting while
    /// already running leaves the existing task untouched and returns
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoRuntime`] when called outside a tokio
    /// runtime.
    pub fn start(&mut self, interval: Duration, tick: TickFn) -> Result<bool, SchedulerError> {
        if self.is_running() {
            tracing::warn!(
                interval_ms = self.interval().map_or(0, |i| i.as_millis()),
                "Sample scheduler already running, ignoring start"
            );
            return Ok(false);
        }

        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let alive = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = handle.spawn(run(interval, tick, Arc::clone(&alive), shutdown_rx));

        tracing::info!(interval_ms = interval.as_millis(), "Sample scheduler started");

        self.worker = Some(Worker {
            interval,
            alive,
            shutdown_tx,
            task,
        });
        Ok(true)
    }

    /// Cancel pending ticks.
    ///
    /// Returns `false` when the scheduler was not running. A tick that is
    /// already executing runs to completion.
    pub fn stop(&mut self) -> bool {
        let Some(worker) = self.worker.take() else {
            tracing::debug!("Sample scheduler not running, ignoring stop");
            return false;
        };

        worker.alive.store(false, Ordering::SeqCst);
        // The receiver is gone once the task has exited on its own.
        let _ = worker.shutdown_tx.send(true);

        tracing::info!("Sample scheduler stopped");
        true
    }
}

impl Drop for SampleScheduler {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.alive.store(false, Ordering::SeqCst);
            let _ = worker.shutdown_tx.send(true);
        }
    }
}

async fn run(
    interval: Duration,
    tick: TickFn,
    alive: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut deadline = Instant::now() + interval;

    loop {
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => {}
            _ = shutdown_rx.changed() => break,
        }

        if !alive.load(Ordering::SeqCst) {
            break;
        }

        let began = Instant::now();
        if std::panic::catch_unwind(AssertUnwindSafe(&*tick)).is_err() {
            tracing::error!("Sample tick panicked, continuing on schedule");
        }
        deadline = began + interval;
    }

    tracing::debug!("Sample scheduler task exited");
}
