//! Performance monitor command-line session.
//!
//! Runs the monitor against synthetic probes for `PERF_RUN_SECS` seconds (or
//! until Ctrl-C), then writes JSON, CSV and text reports into
//! `PERF_REPORT_DIR`. All logs go to stderr; the report paths are printed
//! on stdout.
//!
//! Coverage is excluded because the main function drives real time and
//! the file system end to end.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use perf_monitor::config::MonitorConfig;
use perf_monitor::controller::PerformanceMonitor;
use perf_monitor::probes::{GaugeProbe, NetworkProbe, ScreenProbe};
use perf_monitor::report::ReportFormat;
use perf_monitor::traits::{NetworkRequestRecord, Probe};

const SCREENS: [&str; 3] = ["Home", "Search", "Settings"];

/// Probes fed by a simulated workload.
struct SyntheticHost {
    frame_rate: Arc<GaugeProbe>,
    processor_load: Arc<GaugeProbe>,
    memory: Arc<GaugeProbe>,
    screen: Arc<ScreenProbe>,
    network: Arc<NetworkProbe>,
}

impl SyntheticHost {
    fn new() -> Self {
        Self {
            frame_rate: Arc::new(GaugeProbe::frame_rate(60.0)),
            processor_load: Arc::new(GaugeProbe::processor_load(15.0)),
            memory: Arc::new(GaugeProbe::memory(120.0)),
            screen: Arc::new(ScreenProbe::new()),
            network: Arc::new(NetworkProbe::new()),
        }
    }

    fn probes(&self) -> Vec<Arc<dyn Probe>> {
        vec![
            self.frame_rate.clone() as Arc<dyn Probe>,
            self.processor_load.clone(),
            self.memory.clone(),
            self.screen.clone(),
            self.network.clone(),
        ]
    }

    /// Advance the simulated workload by one step.
    #[allow(clippy::cast_precision_loss)]
    fn step(&self, step: u64) {
        let phase = (step % 20) as f64;
        self.frame_rate.set(if step % 13 == 7 { 38.0 } else { 58.0 + phase / 10.0 });
        self.processor_load.set(15.0 + phase * 2.5);
        self.memory.set(120.0 + phase * 3.0);

        if step % 10 == 0 {
            let index = usize::try_from(step / 10).unwrap_or(0) % SCREENS.len();
            self.screen.report_screen_change(SCREENS[index]);
        }
        if step % 4 == 0 {
            let duration = if step % 24 == 0 { 6.5 } else { 0.2 + phase / 100.0 };
            self.network.record_request(
                NetworkRequestRecord::new(
                    format!("https://api.example.com/items/{step}"),
                    "GET",
                    duration,
                    Utc::now(),
                )
                .with_status(200)
                .with_sizes(256, 4096),
            );
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging to stderr only (stdout carries report paths)
    tracing_subscriber::fmt()
        .with_env_filter(
            config
                .log_level
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        interval_ms = config.sample_interval_ms,
        capacity = config.store_capacity,
        run_secs = config.run_secs,
        report_dir = %config.report_dir.display(),
        "perf-monitor starting"
    );

    let host = SyntheticHost::new();
    let monitor = PerformanceMonitor::from_config(&config, host.probes());

    if let Err(e) = monitor.start(config.sample_interval(), config.thresholds) {
        tracing::error!("Failed to start monitor: {e}");
        std::process::exit(1);
    }

    let workload = async {
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        let mut step = 0u64;
        loop {
            ticker.tick().await;
            host.step(step);
            step += 1;
        }
    };

    tokio::select! {
        () = tokio::time::sleep(config.run_duration()) => {}
        () = workload => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, writing reports");
        }
    }

    monitor.stop();

    let analysis = monitor.analyze();
    tracing::info!(
        samples = analysis.total_data_points,
        anomalies = analysis.anomalies.len(),
        score = analysis.overall_score,
        "Session analysed"
    );

    let formats = vec![ReportFormat::Json, ReportFormat::Csv, ReportFormat::Pdf];
    match monitor.generate_report_task(formats).await {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            tracing::error!("Report generation failed: {e}");
            std::process::exit(1);
        }
    }

    tracing::info!("perf-monitor finished");
}
