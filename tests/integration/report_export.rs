//! Report export read-back.

use std::sync::Arc;
use std::time::Duration;

use perf_monitor::analysis::{AnomalyKind, ThresholdConfig};
use perf_monitor::controller::PerformanceMonitor;
use perf_monitor::error::{ExportError, MonitorError};
use perf_monitor::probes::{GaugeProbe, ScreenProbe};
use perf_monitor::report::{self, DeviceInfo, ReportFormat};

use super::ManualClock;

fn monitor_in(
    dir: &std::path::Path,
) -> (PerformanceMonitor, Arc<GaugeProbe>, Arc<ScreenProbe>, ManualClock) {
    let clock = ManualClock::new();
    let fps = Arc::new(GaugeProbe::frame_rate(60.0));
    let screen = Arc::new(ScreenProbe::with_clock(Arc::new(clock.clone())));
    let monitor = PerformanceMonitor::builder()
        .probe(fps.clone())
        .probe(Arc::new(GaugeProbe::processor_load(20.0)))
        .probe(Arc::new(GaugeProbe::memory(100.0)))
        .probe(screen.clone())
        .report_dir(dir)
        .clock(Arc::new(clock.clone()))
        .device_info(DeviceInfo::new("Test Rig", "linux", "6.1").with_identifier("rig-1"))
        .build();
    (monitor, fps, screen, clock)
}

#[tokio::test(start_paused = true)]
async fn test_all_formats_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, fps, screen, clock) = monitor_in(dir.path());
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();

    screen.report_screen_change("Home, main");
    monitor.collect_now();
    clock.advance(chrono::Duration::seconds(1));
    fps.set(20.0);
    monitor.collect_now();
    monitor.stop();

    let paths = monitor
        .generate_report(&[ReportFormat::Json, ReportFormat::Csv, ReportFormat::Pdf])
        .unwrap();
    assert_eq!(paths.len(), 3);
    for path in &paths {
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(report::FILE_PREFIX));
    }
    assert_eq!(paths[0].extension().unwrap(), "json");
    assert_eq!(paths[1].extension().unwrap(), "csv");
    assert_eq!(paths[2].extension().unwrap(), "txt");

    let analysis = monitor.analyze();

    let json = std::fs::read_to_string(&paths[0]).unwrap();
    let parsed = report::json::parse(&json).unwrap();
    assert_eq!(parsed.analysis, analysis);
    assert_eq!(parsed.raw_data, monitor.samples());
    assert_eq!(parsed.device_info.model, "Test Rig");
    assert_eq!(parsed.device_info.identifier.as_deref(), Some("rig-1"));
    assert_eq!(parsed.analysis.count_of(AnomalyKind::LowFrameRate), 1);

    let csv = std::fs::read_to_string(&paths[1]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], report::csv::HEADER);
    assert_eq!(lines[1], "2026-01-01 00:00:00,60.0,20.0,100.0,,Home; main,0");
    assert_eq!(lines[2], "2026-01-01 00:00:01,20.0,20.0,100.0,,Home; main,0");

    let text = std::fs::read_to_string(&paths[2]).unwrap();
    assert!(text.starts_with("PERFORMANCE REPORT"));
    assert!(text.contains(&format!("Overall score: {}/100", analysis.overall_score)));
    assert!(text.contains("ANOMALIES (1)"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_store_still_exports() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _, _, _) = monitor_in(dir.path());

    let paths = monitor
        .generate_report(&[ReportFormat::Json, ReportFormat::Csv])
        .unwrap();

    let parsed = report::json::parse(&std::fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(parsed.analysis.total_data_points, 0);
    assert_eq!(parsed.analysis.overall_score, 0);
    assert_eq!(
        parsed.analysis.recommendations,
        vec!["No data available for analysis".to_string()]
    );
    assert!(parsed.raw_data.is_empty());

    let csv = std::fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(csv, format!("{}\n", report::csv::HEADER));
}

#[tokio::test(start_paused = true)]
async fn test_json_keys_are_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _, _, _) = monitor_in(dir.path());
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();
    monitor.collect_now();
    monitor.stop();

    let paths = monitor.generate_report(&[ReportFormat::Json]).unwrap();
    let json = std::fs::read_to_string(&paths[0]).unwrap();

    let analysis = json.find("\"analysis\"").unwrap();
    let device = json.find("\"deviceInfo\"").unwrap();
    let generated = json.find("\"generatedAt\"").unwrap();
    let raw = json.find("\"rawData\"").unwrap();
    assert!(analysis < device && device < generated && generated < raw);
    assert!(json.contains("\"generatedAt\": \""));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_report_task_on_worker() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _, _, _) = monitor_in(dir.path());
    monitor
        .start(Duration::from_secs(3600), ThresholdConfig::default())
        .unwrap();
    monitor.collect_now();
    monitor.stop();

    let paths = monitor
        .generate_report_task(vec![ReportFormat::Text, ReportFormat::Pdf])
        .await
        .unwrap();
    // Text and Pdf land in the same file.
    assert_eq!(paths.len(), 1);
    assert!(paths[0].exists());
}

#[tokio::test(start_paused = true)]
async fn test_unwritable_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let (monitor, _, _, _) = monitor_in(&blocker);

    let err = monitor.generate_report(&[ReportFormat::Csv]).unwrap_err();
    assert!(matches!(
        err,
        MonitorError::Export(ExportError::CreateDirectory { .. })
    ));
}
