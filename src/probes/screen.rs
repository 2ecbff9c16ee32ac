//! Active-screen probe driven by explicit navigation callbacks.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::lock;
use crate::traits::{Probe, ProbeKind, ProbeReading, RealTimeProvider, TimeProvider};

/// Navigation entries retained.
pub const MAX_HISTORY: usize = 100;

/// One navigation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenVisit {
    /// Screen navigated to.
    pub name: String,
    /// When the navigation happened.
    pub entered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ScreenState {
    running: bool,
    current: Option<String>,
    history: VecDeque<ScreenVisit>,
}

/// Tracks which UI screen is active.
///
/// The host calls [`ScreenProbe::report_screen_change`] from its own
/// navigation events. Changes reported while stopped are ignored; stopping
/// forgets the current screen and the history.
pub struct ScreenProbe {
    state: Mutex<ScreenState>,
    clock: Arc<dyn TimeProvider>,
}

impl fmt::Debug for ScreenProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenProbe")
            .field("current", &self.current_screen())
            .finish_non_exhaustive()
    }
}

impl Default for ScreenProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenProbe {
    /// Create a probe using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(RealTimeProvider))
    }

    /// Create a probe using a custom clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            state: Mutex::new(ScreenState::default()),
            clock,
        }
    }

    /// Record that the host navigated to `name`.
    pub fn report_screen_change(&self, name: impl Into<String>) {
        let name = name.into();
        let mut state = lock(&self.state, "screen state");
        if !state.running {
            tracing::debug!(screen = %name, "Screen change ignored while stopped");
            return;
        }

        tracing::debug!(screen = %name, "Screen changed");
        state.history.push_back(ScreenVisit {
            name: name.clone(),
            entered_at: self.clock.now(),
        });
        while state.history.len() > MAX_HISTORY {
            state.history.pop_front();
        }
        state.current = Some(name);
    }

    /// The active screen, if any.
    #[must_use]
    pub fn current_screen(&self) -> Option<String> {
        lock(&self.state, "screen state").current.clone()
    }

    /// Navigation history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ScreenVisit> {
        lock(&self.state, "screen state").history.iter().cloned().collect()
    }

    /// Forget the navigation history but keep the current screen.
    pub fn clear_history(&self) {
        lock(&self.state, "screen state").history.clear();
    }
}

impl Probe for ScreenProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ActiveScreen
    }

    fn start(&self) {
        lock(&self.state, "screen state").running = true;
    }

    fn stop(&self) {
        let mut state = lock(&self.state, "screen state");
        state.running = false;
        state.current = None;
        state.history.clear();
    }

    fn read(&self) -> ProbeReading {
        ProbeReading::ActiveScreen(self.current_screen())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::{base_time, mock_time};

    fn started() -> ScreenProbe {
        let probe = ScreenProbe::with_clock(Arc::new(mock_time(base_time())));
        probe.start();
        probe
    }

    #[test]
    fn test_no_screen_initially() {
        let probe = started();
        assert_eq!(probe.read(), ProbeReading::ActiveScreen(None));
    }

    #[test]
    fn test_report_screen_change() {
        let probe = started();
        probe.report_screen_change("Home");
        probe.report_screen_change("Settings");

        assert_eq!(
            probe.read(),
            ProbeReading::ActiveScreen(Some("Settings".to_string()))
        );
        let history = probe.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].name, "Home");
        assert_eq!(history[0].entered_at, base_time());
    }

    #[test]
    fn test_history_is_bounded() {
        let probe = started();
        for i in 0..(MAX_HISTORY + 5) {
            probe.report_screen_change(format!("Screen{i}"));
        }
        let history = probe.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].name, "Screen5");
    }

    #[test]
    fn test_ignored_while_stopped() {
        let probe = ScreenProbe::new();
        probe.report_screen_change("Home");
        assert!(probe.current_screen().is_none());
        assert!(probe.history().is_empty());
    }

    #[test]
    fn test_stop_clears() {
        let probe = started();
        probe.report_screen_change("Home");
        probe.stop();
        assert!(probe.current_screen().is_none());
        assert!(probe.history().is_empty());
    }

    #[test]
    fn test_clear_history_keeps_current() {
        let probe = started();
        probe.report_screen_change("Home");
        probe.clear_history();
        assert!(probe.history().is_empty());
        assert_eq!(probe.current_screen().as_deref(), Some("Home"));
    }
}
