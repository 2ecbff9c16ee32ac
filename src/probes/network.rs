//! Network probe fed with completed requests by the host.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::sync::lock;
use crate::traits::{NetworkRequestRecord, Probe, ProbeKind, ProbeReading};

/// Requests retained for statistics, and the most a sample can carry.
pub const MAX_REQUESTS: usize = 1000;

/// Requests slower than this many seconds count against efficiency.
pub const SLOW_REQUEST_SECS: f64 = 3.0;

/// Responses larger than this many bytes count against efficiency.
pub const LARGE_RESPONSE_BYTES: u64 = 1024 * 1024;

const SLOW_PENALTY: f64 = 0.3;
const FAILED_PENALTY: f64 = 0.5;
const LARGE_PENALTY: f64 = 0.2;

/// Aggregate view of retained requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatistics {
    /// Requests retained.
    pub total_requests: usize,
    /// Requests with a 2xx status.
    pub successful_requests: usize,
    /// All other requests.
    pub failed_requests: usize,
    /// Mean duration in seconds.
    pub average_response_time: f64,
    /// Request plus response bytes.
    pub total_bytes_transferred: u64,
    /// Host seen most often.
    pub most_frequent_host: Option<String>,
}

/// Efficiency rating of retained requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEfficiency {
    /// Requests retained.
    pub total_requests: usize,
    /// Requests slower than [`SLOW_REQUEST_SECS`].
    pub slow_requests: usize,
    /// Requests with a status of 400 or above.
    pub failed_requests: usize,
    /// Responses larger than [`LARGE_RESPONSE_BYTES`].
    pub large_responses: usize,
    /// Score in `0.0..=1.0`, 1.0 when no requests were seen.
    pub score: f64,
}

#[derive(Debug, Default)]
struct NetworkState {
    running: bool,
    history: VecDeque<NetworkRequestRecord>,
    pending: VecDeque<NetworkRequestRecord>,
}

/// Collects requests reported with [`NetworkProbe::record_request`].
///
/// Requests accumulate until the next scheduled sample, which drains them
/// through [`Probe::collect`]. A separate bounded history backs
/// [`NetworkProbe::statistics`] and [`NetworkProbe::efficiency`]. Requests
/// reported while stopped are dropped.
#[derive(Debug, Default)]
pub struct NetworkProbe {
    state: Mutex<NetworkState>,
}

impl NetworkProbe {
    /// Create a stopped probe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed request.
    pub fn record_request(&self, record: NetworkRequestRecord) {
        let mut state = lock(&self.state, "network state");
        if !state.running {
            tracing::debug!(url = %record.url, "Request ignored while stopped");
            return;
        }

        tracing::debug!(
            method = %record.method,
            url = %record.url,
            status = ?record.status_code,
            duration = record.duration,
            "Request recorded"
        );
        push_bounded(&mut state.history, record.clone());
        push_bounded(&mut state.pending, record);
    }

    /// Forget all requests.
    pub fn clear(&self) {
        let mut state = lock(&self.state, "network state");
        state.history.clear();
        state.pending.clear();
    }

    /// Retained requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<NetworkRequestRecord> {
        lock(&self.state, "network state")
            .history
            .iter()
            .cloned()
            .collect()
    }

    /// Counts, mean duration, bytes and the busiest host.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> NetworkStatistics {
        let state = lock(&self.state, "network state");
        let requests = &state.history;
        if requests.is_empty() {
            return NetworkStatistics::default();
        }

        let total = requests.len();
        let successful = requests.iter().filter(|r| r.is_success()).count();

        let mut host_counts: HashMap<&str, usize> = HashMap::new();
        for host in requests.iter().filter_map(|r| host_of(&r.url)) {
            *host_counts.entry(host).or_default() += 1;
        }
        // Ties resolve to the alphabetically first host.
        let most_frequent_host = host_counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(host, _)| host.to_string());

        NetworkStatistics {
            total_requests: total,
            successful_requests: successful,
            failed_requests: total - successful,
            average_response_time: requests.iter().map(|r| r.duration).sum::<f64>() / total as f64,
            total_bytes_transferred: requests
                .iter()
                .map(|r| r.request_size.saturating_add(r.response_size))
                .fold(0u64, u64::saturating_add),
            most_frequent_host,
        }
    }

    /// Penalise slow, failed and oversized requests.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> NetworkEfficiency {
        let state = lock(&self.state, "network state");
        let requests = &state.history;
        if requests.is_empty() {
            return NetworkEfficiency {
                score: 1.0,
                ..NetworkEfficiency::default()
            };
        }

        let total = requests.len();
        let slow = requests
            .iter()
            .filter(|r| r.duration > SLOW_REQUEST_SECS)
            .count();
        let failed = requests
            .iter()
            .filter(|r| r.status_code.is_some_and(|code| code >= 400))
            .count();
        let large = requests
            .iter()
            .filter(|r| r.response_size > LARGE_RESPONSE_BYTES)
            .count();

        let n = total as f64;
        let penalty = (slow as f64 / n).mul_add(
            SLOW_PENALTY,
            (failed as f64 / n).mul_add(FAILED_PENALTY, large as f64 / n * LARGE_PENALTY),
        );

        NetworkEfficiency {
            total_requests: total,
            slow_requests: slow,
            failed_requests: failed,
            large_responses: large,
            score: (1.0 - penalty).max(0.0),
        }
    }
}

impl Probe for NetworkProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Network
    }

    fn start(&self) {
        lock(&self.state, "network state").running = true;
    }

    fn stop(&self) {
        let mut state = lock(&self.state, "network state");
        state.running = false;
        state.history.clear();
        state.pending.clear();
    }

    fn read(&self) -> ProbeReading {
        let state = lock(&self.state, "network state");
        ProbeReading::Network(state.pending.iter().cloned().collect())
    }

    fn collect(&self) -> ProbeReading {
        let mut state = lock(&self.state, "network state");
        ProbeReading::Network(state.pending.drain(..).collect())
    }
}

fn push_bounded(buffer: &mut VecDeque<NetworkRequestRecord>, record: NetworkRequestRecord) {
    buffer.push_back(record);
    while buffer.len() > MAX_REQUESTS {
        buffer.pop_front();
    }
}

/// Extract the host from an absolute URL such as `https://host:8080/path`.
#[must_use]
pub fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = if authority.starts_with('[') {
        // IPv6 literal: keep the brackets, drop the port.
        authority.find(']').map(|end| &authority[..=end])?
    } else {
        authority.split(':').next()?
    };

    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::test_utils::{base_time, request};
    use test_case::test_case;

    fn started() -> NetworkProbe {
        let probe = NetworkProbe::new();
        probe.start();
        probe
    }

    #[test_case("https://api.example.com/v1/users", Some("api.example.com"))]
    #[test_case("http://localhost:8080", Some("localhost"))]
    #[test_case("https://user:pw@host.test/a?b", Some("host.test"))]
    #[test_case("http://[::1]:3000/", Some("[::1]"))]
    #[test_case("not a url", None)]
    #[test_case("file:///tmp/x", None)]
    fn test_host_of(url: &str, expected: Option<&str>) {
        assert_eq!(host_of(url), expected);
    }

    #[test]
    fn test_collect_drains_but_read_does_not() {
        let probe = started();
        probe.record_request(request("https://a.test/1", 0.1));
        probe.record_request(request("https://a.test/2", 0.2));

        let ProbeReading::Network(peeked) = probe.read() else {
            panic!("expected a network reading");
        };
        assert_eq!(peeked.len(), 2);

        let ProbeReading::Network(collected) = probe.collect() else {
            panic!("expected a network reading");
        };
        assert_eq!(collected.len(), 2);
        assert_eq!(probe.collect(), ProbeReading::Network(Vec::new()));

        // History is kept for statistics.
        assert_eq!(probe.requests().len(), 2);
    }

    #[test]
    fn test_ignored_while_stopped() {
        let probe = NetworkProbe::new();
        probe.record_request(request("https://a.test", 0.1));
        assert!(probe.requests().is_empty());
    }

    #[test]
    fn test_buffers_are_bounded() {
        let probe = started();
        for i in 0..(MAX_REQUESTS + 10) {
            probe.record_request(request(&format!("https://a.test/{i}"), 0.1));
        }
        assert_eq!(probe.requests().len(), MAX_REQUESTS);
        assert_eq!(probe.requests()[0].url, "https://a.test/10");
    }

    #[test]
    fn test_statistics() {
        let probe = started();
        probe.record_request(request("https://a.test/1", 1.0).with_sizes(100, 900));
        probe.record_request(request("https://a.test/2", 2.0));
        probe.record_request(
            NetworkRequestRecord::new("https://b.test", "POST", 3.0, base_time()).with_status(500),
        );

        let stats = probe.statistics();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.successful_requests, 2);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.average_response_time, 2.0);
        assert_eq!(stats.total_bytes_transferred, 1000);
        assert_eq!(stats.most_frequent_host.as_deref(), Some("a.test"));
    }

    #[test]
    fn test_statistics_empty() {
        assert_eq!(started().statistics(), NetworkStatistics::default());
    }

    #[test]
    fn test_efficiency() {
        let probe = started();
        probe.record_request(request("https://a.test/fast", 0.5));
        probe.record_request(request("https://a.test/slow", 4.0));
        probe.record_request(
            NetworkRequestRecord::new("https://a.test/fail", "GET", 0.5, base_time())
                .with_status(404),
        );
        probe.record_request(
            request("https://a.test/big", 0.5).with_sizes(0, LARGE_RESPONSE_BYTES + 1),
        );

        let efficiency = probe.efficiency();
        assert_eq!(efficiency.slow_requests, 1);
        assert_eq!(efficiency.failed_requests, 1);
        assert_eq!(efficiency.large_responses, 1);
        // 1 - (0.25*0.3 + 0.25*0.5 + 0.25*0.2) = 0.75
        assert!((efficiency.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_empty_is_perfect() {
        assert_eq!(started().efficiency().score, 1.0);
    }

    #[test]
    fn test_stop_clears() {
        let probe = started();
        probe.record_request(request("https://a.test", 0.1));
        probe.stop();
        assert!(probe.requests().is_empty());
        assert_eq!(probe.read(), ProbeReading::Network(Vec::new()));
    }
}
