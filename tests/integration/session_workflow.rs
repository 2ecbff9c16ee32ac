//! Session lifecycle workflows.

use std::sync::Arc;
use std::time::Duration;

use perf_monitor::analysis::{AnomalyKind, ThresholdConfig};
use perf_monitor::controller::PerformanceMonitor;
use perf_monitor::probes::GaugeProbe;

use super::ManualClock;

struct Session {
    monitor: PerformanceMonitor,
    fps: Arc<GaugeProbe>,
    cpu: Arc<GaugeProbe>,
    memory: Arc<GaugeProbe>,
    clock: ManualClock,
}

fn session(capacity: usize) -> Session {
    let clock = ManualClock::new();
    let fps = Arc::new(GaugeProbe::frame_rate(60.0));
    let cpu = Arc::new(GaugeProbe::processor_load(20.0));
    let memory = Arc::new(GaugeProbe::memory(100.0));
    let monitor = PerformanceMonitor::builder()
        .probe(fps.clone())
        .probe(cpu.clone())
        .probe(memory.clone())
        .capacity(capacity)
        .clock(Arc::new(clock.clone()))
        .build();
    Session {
        monitor,
        fps,
        cpu,
        memory,
        clock,
    }
}

#[tokio::test(start_paused = true)]
async fn test_healthy_session() {
    let s = session(100);
    s.monitor
        .start(Duration::from_millis(100), ThresholdConfig::default())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1050)).await;
    s.monitor.stop();

    let analysis = s.monitor.analyze();
    assert_eq!(analysis.total_data_points, 10);
    // frame 100, cpu 75, memory 50 -> 40 + 22.5 + 15 = 77.5 -> 77
    assert_eq!(analysis.overall_score, 77);
    assert!(analysis.anomalies.is_empty());
    assert_eq!(
        analysis.recommendations,
        vec![
            "Application performance is healthy".to_string(),
            "Keep monitoring to maintain quality".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_samples_after_stop() {
    let s = session(100);
    s.monitor
        .start(Duration::from_millis(50), ThresholdConfig::default())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(260)).await;
    s.monitor.stop();
    let after_stop = s.monitor.collected_count();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!s.monitor.collect_now());
    assert_eq!(s.monitor.collected_count(), after_stop);
    assert_eq!(after_stop, 5);
}

#[tokio::test(start_paused = true)]
async fn test_degrading_session() {
    let s = session(100);
    s.monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();

    s.monitor.collect_now();
    s.clock.advance(chrono::Duration::seconds(1));
    s.fps.set(30.0);
    s.cpu.set(95.0);
    s.memory.set(250.0);
    s.monitor.collect_now();
    s.monitor.stop();

    let analysis = s.monitor.analyze();
    let kinds: Vec<AnomalyKind> = analysis.anomalies.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AnomalyKind::LowFrameRate,
            AnomalyKind::HighProcessorLoad,
            AnomalyKind::HighMemory,
            AnomalyKind::MemorySpike,
        ]
    );
    assert_eq!(analysis.peak_memory, 250.0);
    assert!(analysis.overall_score < 77);
}

#[tokio::test(start_paused = true)]
async fn test_eviction_keeps_newest() {
    let s = session(5);
    s.monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();
    for i in 0..8 {
        s.memory.set(100.0 + f64::from(i));
        s.clock.advance(chrono::Duration::seconds(1));
        s.monitor.collect_now();
    }
    s.monitor.stop();

    let memory: Vec<f64> = s
        .monitor
        .samples()
        .iter()
        .map(|sample| sample.memory_usage)
        .collect();
    assert_eq!(memory, vec![103.0, 104.0, 105.0, 106.0, 107.0]);
    assert_eq!(s.monitor.analyze().total_data_points, 5);
}

#[tokio::test(start_paused = true)]
async fn test_idempotent_lifecycle() {
    let s = session(100);
    let interval = Duration::from_millis(100);
    s.monitor.start(interval, ThresholdConfig::default()).unwrap();
    s.monitor.start(interval, ThresholdConfig::default()).unwrap();
    assert!(s.monitor.is_running());

    tokio::time::sleep(Duration::from_millis(550)).await;
    s.monitor.stop();
    s.monitor.stop();

    assert!(!s.monitor.is_running());
    // One scheduler, not two.
    assert_eq!(s.monitor.collected_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_stop_from_another_task() {
    let s = session(100);
    let monitor = Arc::new(s.monitor);
    monitor
        .start(Duration::from_millis(100), ThresholdConfig::default())
        .unwrap();

    let stopper = Arc::clone(&monitor);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        stopper.stop();
    })
    .await
    .unwrap();

    assert!(!monitor.is_running());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(monitor.collected_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clear_then_continue() {
    let s = session(100);
    s.monitor
        .start(Duration::from_millis(100), ThresholdConfig::default())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    s.monitor.clear_data();
    assert_eq!(s.monitor.collected_count(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    s.monitor.stop();
    assert_eq!(s.monitor.collected_count(), 2);
}
