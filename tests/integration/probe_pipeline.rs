//! Host callbacks flowing through probes into samples and analysis.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use perf_monitor::analysis::{AnomalyKind, ThresholdConfig};
use perf_monitor::controller::PerformanceMonitor;
use perf_monitor::probes::{BatteryProbe, FrameRateProbe, GaugeProbe, NetworkProbe, ScreenProbe};
use perf_monitor::traits::{BatterySource, BatteryState, NetworkRequestRecord, Probe, TimeProvider};

use super::{base_time, ManualClock};

/// Battery whose level the test sets directly.
#[derive(Debug)]
struct FakeBattery {
    level: Mutex<Option<f64>>,
}

impl FakeBattery {
    fn new(level: f64) -> Self {
        Self {
            level: Mutex::new(Some(level)),
        }
    }

    fn set(&self, level: f64) {
        *self.level.lock().unwrap() = Some(level);
    }
}

impl BatterySource for FakeBattery {
    fn level(&self) -> Option<f64> {
        *self.level.lock().unwrap()
    }

    fn state(&self) -> BatteryState {
        BatteryState::Unplugged
    }
}

fn get(url: &str, duration: f64, clock: &ManualClock) -> NetworkRequestRecord {
    NetworkRequestRecord::new(url, "GET", duration, clock.now()).with_status(200)
}

#[tokio::test(start_paused = true)]
async fn test_screens_and_requests_reach_analysis() {
    let clock = ManualClock::new();
    let screen = Arc::new(ScreenProbe::with_clock(Arc::new(clock.clone())));
    let network = Arc::new(NetworkProbe::new());
    let monitor = PerformanceMonitor::builder()
        .probe(Arc::new(GaugeProbe::frame_rate(60.0)))
        .probe(Arc::new(GaugeProbe::processor_load(10.0)))
        .probe(Arc::new(GaugeProbe::memory(100.0)))
        .probe(screen.clone())
        .probe(network.clone())
        .clock(Arc::new(clock.clone()))
        .build();
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();

    screen.report_screen_change("Home");
    network.record_request(get("https://api.test/feed", 0.4, &clock));
    monitor.collect_now();

    clock.advance(chrono::Duration::seconds(2));
    monitor.collect_now();

    clock.advance(chrono::Duration::seconds(1));
    screen.report_screen_change("Checkout");
    network.record_request(get("https://pay.test/charge", 7.0, &clock));
    network.record_request(get("https://api.test/cart", 0.2, &clock));
    monitor.collect_now();

    let samples = monitor.samples();
    let counts: Vec<usize> = samples.iter().map(|s| s.network_requests.len()).collect();
    assert_eq!(counts, vec![1, 0, 2]);

    let analysis = monitor.analyze();
    assert_eq!(analysis.count_of(AnomalyKind::SlowNetworkRequest), 1);
    let slow = &analysis.anomalies[0];
    assert_eq!(slow.screen_name.as_deref(), Some("Checkout"));
    assert_eq!(slow.timestamp, base_time() + chrono::Duration::seconds(3));

    let screens: Vec<&str> = analysis
        .screen_performance
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(screens, vec!["Checkout", "Home"]);
    let home = &analysis.screen_performance["Home"];
    assert_eq!(home.sample_count, 2);
    assert_eq!(home.time_on_screen, 2.0);
    assert_eq!(home.anomaly_count, 0);
    assert_eq!(analysis.screen_performance["Checkout"].anomaly_count, 1);

    let stats = network.statistics();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.most_frequent_host.as_deref(), Some("api.test"));

    monitor.stop();
    assert!(network.requests().is_empty());
    assert_eq!(screen.current_screen(), None);
}

#[tokio::test(start_paused = true)]
async fn test_callbacks_ignored_while_stopped() {
    let screen = Arc::new(ScreenProbe::new());
    let network = Arc::new(NetworkProbe::new());
    let monitor = PerformanceMonitor::builder()
        .probe(screen.clone())
        .probe(network.clone())
        .build();

    screen.report_screen_change("Home");
    network.record_request(NetworkRequestRecord::new(
        "https://api.test",
        "GET",
        1.0,
        base_time(),
    ));

    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();
    monitor.collect_now();
    monitor.stop();

    let sample = &monitor.samples()[0];
    assert_eq!(sample.active_screen_name, None);
    assert!(sample.network_requests.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_battery_drain_reported() {
    let clock = ManualClock::new();
    let source = Arc::new(FakeBattery::new(0.75));
    let battery = Arc::new(BatteryProbe::with_clock(
        source.clone(),
        Arc::new(clock.clone()),
    ));
    let monitor = PerformanceMonitor::builder()
        .probe(battery.clone())
        .clock(Arc::new(clock.clone()))
        .build();
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();

    monitor.collect_now();
    clock.advance(chrono::Duration::seconds(60));
    source.set(0.625);
    monitor.collect_now();
    clock.advance(chrono::Duration::seconds(60));
    source.set(0.617_187_5);
    monitor.collect_now();
    monitor.stop();

    let levels: Vec<Option<f64>> = monitor.samples().iter().map(|s| s.battery_level).collect();
    assert_eq!(levels, vec![Some(75.0), Some(62.5), Some(61.718_75)]);

    let analysis = monitor.analyze();
    assert_eq!(analysis.count_of(AnomalyKind::BatteryDrain), 1);
    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r.starts_with("Fast battery drain")));

    let stats = battery.energy_stats();
    assert!(!stats.is_charging);
    assert_eq!(stats.total_drain_percent, 13.281_25);
}

#[tokio::test(start_paused = true)]
async fn test_frame_rate_probe_feeds_samples() {
    let clock = ManualClock::new();
    let frames = Arc::new(FrameRateProbe::with_clock(Arc::new(clock.clone())));
    let monitor = PerformanceMonitor::builder()
        .probe(frames.clone())
        .clock(Arc::new(clock.clone()))
        .build();
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();
    assert_eq!(frames.read(), perf_monitor::traits::ProbeReading::FrameRate(60.0));

    // 30 frames over one second.
    for i in 0..=30 {
        frames.record_frame_at(base_time() + chrono::Duration::milliseconds(i * 1000 / 30));
    }
    monitor.collect_now();
    monitor.stop();

    let sample = &monitor.samples()[0];
    assert!((sample.frame_rate - 30.0).abs() < 1.0);
    assert_eq!(monitor.analyze().count_of(AnomalyKind::LowFrameRate), 1);
}
