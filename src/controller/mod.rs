//! Monitor facade.
//!
//! [`PerformanceMonitor`] owns the lifecycle and the metric store and wires
//! scheduler ticks through the probes into the store. Analysis and export
//! work on a copy of the store taken under a short critical section.
//!
//! # Lifecycle
//!
//! ```text
//! Stopped --start--> Running --stop--> Stopped
//! ```
//!
//! Starting while running and stopping while stopped are logged no-ops.
//! After [`PerformanceMonitor::stop`] returns no further samples are
//! appended, even if a tick was in flight: every append re-checks the
//! running flag while holding the store lock, and `stop` clears the flag
//! under the same lock.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use perf_monitor::analysis::ThresholdConfig;
//! use perf_monitor::controller::PerformanceMonitor;
//! use perf_monitor::probes::GaugeProbe;
//! use perf_monitor::report::ReportFormat;
//!
//! # async fn example() -> Result<(), perf_monitor::error::MonitorError> {
//! let memory = Arc::new(GaugeProbe::memory(120.0));
//! let monitor = PerformanceMonitor::builder()
//!     .probe(memory.clone())
//!     .report_dir("./reports")
//!     .build();
//!
//! monitor.start(Duration::from_secs(1), ThresholdConfig::default())?;
//! memory.set(140.0);
//! tokio::time::sleep(Duration::from_secs(5)).await;
//! monitor.stop();
//!
//! let paths = monitor
//!     .generate_report_task(vec![ReportFormat::Json, ReportFormat::Csv])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod global;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::analysis::{self, Analysis, Anomaly, PerformanceStatistics, ThresholdConfig};
use crate::config::MonitorConfig;
use crate::error::{ExportError, MonitorError};
use crate::report::{DeviceInfo, ReportExporter, ReportFormat};
use crate::scheduler::{SampleScheduler, TickFn};
use crate::store::{MetricStore, DEFAULT_CAPACITY};
use crate::sync::{lock, read, write};
use crate::traits::{MetricSample, Probe, ProbeReading, RealTimeProvider, TimeProvider};

/// State shared with the scheduler task.
struct Shared {
    probes: Vec<Arc<dyn Probe>>,
    store: Mutex<MetricStore>,
    running: AtomicBool,
    thresholds: RwLock<ThresholdConfig>,
    clock: Arc<dyn TimeProvider>,
}

impl Shared {
    /// Take one sample and append it. Returns `false` when stopped.
    ///
    /// Probes are read without holding the store lock. The running flag is
    /// checked again under the lock, so a sample read while `stop` ran is
    /// discarded.
    fn collect(&self) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }

        let sample = self.assemble(self.probes.iter().map(|p| p.collect()));
        let requests = sample.network_requests.len();

        let mut store = lock(&self.store, "metric store");
        if !self.running.load(Ordering::SeqCst) {
            debug!("Monitor stopped during collection, sample discarded");
            return false;
        }
        let evicted = store.append(sample);

        debug!(count = store.count(), requests, evicted, "Sample collected");
        true
    }

    fn assemble(&self, readings: impl Iterator<Item = ProbeReading>) -> MetricSample {
        let mut sample = MetricSample::new(self.clock.now(), 0.0, 0.0, 0.0);
        for reading in readings {
            match reading {
                ProbeReading::FrameRate(value) => sample.frame_rate = value,
                ProbeReading::ProcessorLoad(value) => sample.processor_load = value,
                ProbeReading::Memory(value) => sample.memory_usage = value,
                ProbeReading::Battery(level) => sample.battery_level = level,
                ProbeReading::ActiveScreen(name) => sample.active_screen_name = name,
                ProbeReading::Network(requests) => sample.network_requests.extend(requests),
            }
        }
        sample
    }

    fn snapshot(&self) -> Vec<MetricSample> {
        lock(&self.store, "metric store").all()
    }

    /// Probe-reported anomalies that fall within the sampled period.
    ///
    /// Anomalies older than the oldest retained sample are dropped, so the
    /// result depends only on what the store still holds.
    fn reported_anomalies(&self, samples: &[MetricSample]) -> Vec<Anomaly> {
        let Some(first) = samples.first() else {
            return Vec::new();
        };
        self.probes
            .iter()
            .flat_map(|p| p.reported_anomalies())
            .filter(|a| a.timestamp >= first.timestamp)
            .collect()
    }

    fn analyze(&self, samples: &[MetricSample]) -> Analysis {
        let thresholds = *read(&self.thresholds, "thresholds");
        let reported = self.reported_anomalies(samples);
        analysis::analyze_with_reported(samples, &thresholds, reported)
    }
}

/// Builder for [`PerformanceMonitor`].
pub struct MonitorBuilder {
    probes: Vec<Arc<dyn Probe>>,
    capacity: usize,
    report_dir: PathBuf,
    clock: Arc<dyn TimeProvider>,
    device_info: Option<DeviceInfo>,
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self {
            probes: Vec::new(),
            capacity: DEFAULT_CAPACITY,
            report_dir: PathBuf::from(crate::config::DEFAULT_REPORT_DIR),
            clock: Arc::new(RealTimeProvider),
            device_info: None,
        }
    }
}

impl MonitorBuilder {
    /// Register a probe. Probes are read in registration order; when two
    /// report the same scalar metric the later one wins, network requests
    /// are concatenated.
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probes.push(probe);
        self
    }

    /// Register several probes.
    #[must_use]
    pub fn probes(mut self, probes: impl IntoIterator<Item = Arc<dyn Probe>>) -> Self {
        self.probes.extend(probes);
        self
    }

    /// Maximum samples retained. Zero is raised to one.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Directory reports are written into.
    #[must_use]
    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Clock used to stamp samples.
    ///
    /// Probes that stamp their own anomalies, such as
    /// [`BatteryProbe`](crate::probes::BatteryProbe), must be given the same
    /// clock. Reported anomalies older than the first stored sample are
    /// dropped from analysis.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Device block embedded in JSON reports.
    #[must_use]
    pub fn device_info(mut self, device_info: DeviceInfo) -> Self {
        self.device_info = Some(device_info);
        self
    }

    /// Build a stopped monitor.
    #[must_use]
    pub fn build(self) -> PerformanceMonitor {
        let mut exporter = ReportExporter::new(self.report_dir);
        if let Some(device_info) = self.device_info {
            exporter = exporter.with_device_info(device_info);
        }

        PerformanceMonitor {
            shared: Arc::new(Shared {
                probes: self.probes,
                store: Mutex::new(MetricStore::new(self.capacity)),
                running: AtomicBool::new(false),
                thresholds: RwLock::new(ThresholdConfig::default()),
                clock: self.clock,
            }),
            scheduler: Mutex::new(SampleScheduler::new()),
            exporter,
        }
    }
}

/// The monitor facade.
pub struct PerformanceMonitor {
    shared: Arc<Shared>,
    scheduler: Mutex<SampleScheduler>,
    exporter: ReportExporter,
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("running", &self.is_running())
            .field("probes", &self.shared.probes.len())
            .field("collected", &self.collected_count())
            .field("report_dir", &self.exporter.output_dir())
            .finish_non_exhaustive()
    }
}

impl PerformanceMonitor {
    /// Start building a monitor.
    #[must_use]
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    /// Build a monitor from loaded configuration.
    #[must_use]
    pub fn from_config(config: &MonitorConfig, probes: Vec<Arc<dyn Probe>>) -> Self {
        Self::builder()
            .probes(probes)
            .capacity(config.store_capacity)
            .report_dir(config.report_dir.clone())
            .build()
    }

    /// Start probes and periodic sampling.
    ///
    /// A no-op (logged) when already running.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Scheduler`] when called outside a tokio
    /// runtime; the monitor is left stopped.
    pub fn start(
        &self,
        interval: Duration,
        thresholds: ThresholdConfig,
    ) -> Result<(), MonitorError> {
        let mut scheduler = lock(&self.scheduler, "scheduler");
        if self.shared.running.load(Ordering::SeqCst) {
            warn!("Performance monitor already running, ignoring start");
            return Ok(());
        }

        *write(&self.shared.thresholds, "thresholds") = thresholds;
        for probe in &self.shared.probes {
            probe.start();
        }
        {
            let _store = lock(&self.shared.store, "metric store");
            self.shared.running.store(true, Ordering::SeqCst);
        }

        let shared = Arc::clone(&self.shared);
        let tick: TickFn = Arc::new(move || {
            shared.collect();
        });

        if let Err(e) = scheduler.start(interval, tick) {
            {
                let _store = lock(&self.shared.store, "metric store");
                self.shared.running.store(false, Ordering::SeqCst);
            }
            for probe in &self.shared.probes {
                probe.stop();
            }
            return Err(e.into());
        }

        info!(
            interval_ms = interval.as_millis(),
            probes = self.shared.probes.len(),
            "Performance monitor started"
        );
        Ok(())
    }

    /// Stop sampling, then stop probes.
    ///
    /// A no-op (logged) when already stopped. Safe to call from any thread.
    pub fn stop(&self) {
        let mut scheduler = lock(&self.scheduler, "scheduler");
        if !self.shared.running.load(Ordering::SeqCst) {
            warn!("Performance monitor not running, ignoring stop");
            return;
        }

        {
            let _store = lock(&self.shared.store, "metric store");
            self.shared.running.store(false, Ordering::SeqCst);
        }
        scheduler.stop();
        for probe in &self.shared.probes {
            probe.stop();
        }

        info!(collected = self.collected_count(), "Performance monitor stopped");
    }

    /// Whether the monitor is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Take one sample outside the schedule.
    ///
    /// Returns `false` without sampling when stopped.
    pub fn collect_now(&self) -> bool {
        self.shared.collect()
    }

    /// Remove every stored sample.
    pub fn clear_data(&self) {
        let mut store = lock(&self.shared.store, "metric store");
        let removed = store.count();
        store.clear();
        info!(removed, "Metric store cleared");
    }

    /// Live probe values, or `None` when stopped.
    ///
    /// Reads the probes directly and never consumes pending network
    /// requests.
    #[must_use]
    pub fn current_metrics(&self) -> Option<MetricSample> {
        if !self.is_running() {
            return None;
        }
        Some(self.shared.assemble(self.shared.probes.iter().map(|p| p.read())))
    }

    /// Number of stored samples.
    #[must_use]
    pub fn collected_count(&self) -> usize {
        lock(&self.shared.store, "metric store").count()
    }

    /// Copy of the stored samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<MetricSample> {
        self.shared.snapshot()
    }

    /// Thresholds from the most recent start.
    #[must_use]
    pub fn thresholds(&self) -> ThresholdConfig {
        *read(&self.shared.thresholds, "thresholds")
    }

    /// Analyse the current store contents.
    #[must_use]
    pub fn analyze(&self) -> Analysis {
        let samples = self.shared.snapshot();
        self.shared.analyze(&samples)
    }

    /// Descriptive statistics of the current store contents.
    #[must_use]
    pub fn statistics(&self) -> PerformanceStatistics {
        analysis::statistics(&self.shared.snapshot())
    }

    /// Directory reports are written into.
    #[must_use]
    pub fn report_dir(&self) -> &std::path::Path {
        self.exporter.output_dir()
    }

    /// Analyse the store and write one report per format.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Export`] if any format fails; earlier files
    /// remain on disk.
    pub fn generate_report(
        &self,
        formats: &[ReportFormat],
    ) -> Result<Vec<PathBuf>, MonitorError> {
        let samples = self.shared.snapshot();
        let analysis = self.shared.analyze(&samples);
        Ok(self.exporter.export(&analysis, &samples, formats)?)
    }

    /// Like [`PerformanceMonitor::generate_report`], with analysis and file
    /// output on a blocking worker.
    ///
    /// The store is copied before this returns its future, so samples
    /// appended afterwards are not included.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Export`] if any format fails or the worker
    /// does not complete.
    pub fn generate_report_task(
        &self,
        formats: Vec<ReportFormat>,
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>, MonitorError>> + Send + 'static
    {
        let samples = self.shared.snapshot();
        let shared = Arc::clone(&self.shared);
        let exporter = self.exporter.clone();

        async move {
            let worker = tokio::task::spawn_blocking(move || {
                let analysis = shared.analyze(&samples);
                exporter.export(&analysis, &samples, &formats)
            });

            let paths = worker.await.map_err(|e| ExportError::WorkerFailed {
                message: e.to_string(),
            })??;
            Ok(paths)
        }
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
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
    use crate::analysis::AnomalyKind;
    use crate::probes::{BatteryProbe, GaugeProbe, NetworkProbe, ScreenProbe};
    use crate::test_utils::{base_time, mock_probe, request, ManualClock};
    use crate::traits::MockProbe;
    use static_assertions::assert_impl_all;

    assert_impl_all!(PerformanceMonitor: Send, Sync);

    const INTERVAL: Duration = Duration::from_millis(100);

    struct Rig {
        monitor: PerformanceMonitor,
        fps: Arc<GaugeProbe>,
        memory: Arc<GaugeProbe>,
        screen: Arc<ScreenProbe>,
        network: Arc<NetworkProbe>,
        clock: ManualClock,
    }

    fn rig(capacity: usize) -> Rig {
        let clock = ManualClock::new();
        let fps = Arc::new(GaugeProbe::frame_rate(60.0));
        let memory = Arc::new(GaugeProbe::memory(100.0));
        let screen = Arc::new(ScreenProbe::new());
        let network = Arc::new(NetworkProbe::new());
        let monitor = PerformanceMonitor::builder()
            .probe(fps.clone())
            .probe(Arc::new(GaugeProbe::processor_load(20.0)))
            .probe(memory.clone())
            .probe(screen.clone())
            .probe(network.clone())
            .capacity(capacity)
            .clock(Arc::new(clock.clone()))
            .build();
        Rig {
            monitor,
            fps,
            memory,
            screen,
            network,
            clock,
        }
    }

    #[test]
    fn test_start_outside_runtime_fails_and_stays_stopped() {
        let rig = rig(10);
        let err = rig
            .monitor
            .start(INTERVAL, ThresholdConfig::default())
            .unwrap_err();
        assert!(matches!(err, MonitorError::Scheduler(_)));
        assert!(!rig.monitor.is_running());
        assert!(!rig.fps.is_active());
    }

    #[test]
    fn test_stopped_monitor() {
        let rig = rig(10);
        assert!(!rig.monitor.is_running());
        assert!(rig.monitor.current_metrics().is_none());
        assert!(!rig.monitor.collect_now());
        assert_eq!(rig.monitor.collected_count(), 0);
        // Stopping while stopped is harmless.
        rig.monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_lifecycle() {
        let rig = rig(10);
        rig.monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();
        assert!(rig.monitor.is_running());
        assert!(rig.fps.is_active());

        rig.monitor.stop();
        assert!(!rig.monitor.is_running());
        assert!(!rig.fps.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_collection() {
        let rig = rig(10);
        rig.monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;
        rig.monitor.stop();

        assert_eq!(rig.monitor.collected_count(), 3);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rig.monitor.collected_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_is_noop() {
        let rig = rig(10);
        let strict = ThresholdConfig {
            min_frame_rate: 90.0,
            ..ThresholdConfig::default()
        };
        rig.monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();
        rig.monitor.start(INTERVAL, strict).unwrap();

        assert_eq!(rig.monitor.thresholds(), ThresholdConfig::default());
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(rig.monitor.collected_count(), 3);
        rig.monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_now_assembles_sample() {
        let rig = rig(10);
        rig.monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        rig.memory.set(150.0);
        rig.screen.report_screen_change("Home");
        rig.network.record_request(request("https://a.test", 0.3));

        assert!(rig.monitor.collect_now());
        let samples = rig.monitor.samples();
        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.timestamp, base_time());
        assert_eq!(sample.frame_rate, 60.0);
        assert_eq!(sample.processor_load, 20.0);
        assert_eq!(sample.memory_usage, 150.0);
        assert_eq!(sample.battery_level, None);
        assert_eq!(sample.active_screen_name.as_deref(), Some("Home"));
        assert_eq!(sample.network_requests.len(), 1);

        // Requests are attributed to exactly one sample.
        rig.clock.advance(chrono::Duration::seconds(1));
        assert!(rig.monitor.collect_now());
        let second = &rig.monitor.samples()[1];
        assert!(second.network_requests.is_empty());
        assert_eq!(second.timestamp, rig.clock.now());
        rig.monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_metrics_is_live_and_non_consuming() {
        let rig = rig(10);
        rig.monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        rig.network.record_request(request("https://a.test", 0.3));
        rig.fps.set(42.0);

        let current = rig.monitor.current_metrics().unwrap();
        assert_eq!(current.frame_rate, 42.0);
        assert_eq!(current.network_requests.len(), 1);
        assert_eq!(rig.monitor.collected_count(), 0);

        rig.monitor.collect_now();
        assert_eq!(rig.monitor.samples()[0].network_requests.len(), 1);
        rig.monitor.stop();
        assert!(rig.monitor.current_metrics().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_is_bounded() {
        let rig = rig(3);
        rig.monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        for i in 0..5 {
            rig.memory.set(100.0 + f64::from(i));
            rig.monitor.collect_now();
        }
        let memory: Vec<f64> = rig.monitor.samples().iter().map(|s| s.memory_usage).collect();
        assert_eq!(memory, vec![102.0, 103.0, 104.0]);
        rig.monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_data_resets_analysis() {
        let rig = rig(10);
        rig.monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        rig.fps.set(10.0);
        rig.monitor.collect_now();
        assert!(rig.monitor.analyze().overall_score < 100);

        rig.monitor.clear_data();
        assert_eq!(rig.monitor.collected_count(), 0);
        let analysis = rig.monitor.analyze();
        assert_eq!(analysis.total_data_points, 0);
        assert_eq!(analysis.overall_score, 0);
        rig.monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_uses_start_thresholds() {
        let rig = rig(10);
        let strict = ThresholdConfig {
            min_frame_rate: 90.0,
            ..ThresholdConfig::default()
        };
        rig.monitor.start(Duration::from_secs(60), strict).unwrap();
        rig.monitor.collect_now();
        rig.monitor.stop();

        let analysis = rig.monitor.analyze();
        assert_eq!(analysis.count_of(AnomalyKind::LowFrameRate), 1);
    }

    fn draining_battery(clock: ManualClock) -> (Arc<BatteryProbe>, Arc<Mutex<Option<f64>>>) {
        let level = Arc::new(Mutex::new(Some(0.9)));
        let source_level = Arc::clone(&level);
        let mut source = crate::traits::MockBatterySource::new();
        source
            .expect_level()
            .returning(move || *source_level.lock().unwrap());
        source
            .expect_state()
            .return_const(crate::traits::BatteryState::Unplugged);
        let battery = Arc::new(BatteryProbe::with_clock(Arc::new(source), Arc::new(clock)));
        (battery, level)
    }

    #[tokio::test(start_paused = true)]
    async fn test_battery_anomalies_limited_to_stored_period() {
        let clock = ManualClock::new();
        let (battery, level) = draining_battery(clock.clone());
        let monitor = PerformanceMonitor::builder()
            .probe(battery)
            .clock(Arc::new(clock.clone()))
            .build();
        monitor.start(Duration::from_secs(600), ThresholdConfig::default()).unwrap();

        monitor.collect_now();
        clock.advance(chrono::Duration::seconds(60));
        *level.lock().unwrap() = Some(0.5);
        monitor.collect_now();

        let analysis = monitor.analyze();
        assert_eq!(analysis.count_of(AnomalyKind::BatteryDrain), 1);
        assert_eq!(analysis.anomalies.last().unwrap().kind, AnomalyKind::BatteryDrain);

        monitor.clear_data();
        clock.advance(chrono::Duration::seconds(60));
        monitor.collect_now();
        assert_eq!(monitor.analyze().count_of(AnomalyKind::BatteryDrain), 0);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_battery_on_lagging_clock_is_filtered_out() {
        let monitor_clock = ManualClock::new();
        monitor_clock.advance(chrono::Duration::days(1));
        let battery_clock = ManualClock::new();
        let (battery, level) = draining_battery(battery_clock.clone());
        let monitor = PerformanceMonitor::builder()
            .probe(battery.clone())
            .clock(Arc::new(monitor_clock.clone()))
            .build();
        monitor.start(Duration::from_secs(600), ThresholdConfig::default()).unwrap();

        monitor.collect_now();
        monitor_clock.advance(chrono::Duration::seconds(60));
        battery_clock.advance(chrono::Duration::seconds(60));
        *level.lock().unwrap() = Some(0.5);
        monitor.collect_now();
        monitor.stop();

        // The probe saw the drain, but stamped it a day before any sample.
        assert_eq!(battery.reported_anomalies().len(), 1);
        assert_eq!(monitor.analyze().count_of(AnomalyKind::BatteryDrain), 0);
    }

    /// Reads block for a while, as a probe waiting on a slow host API would.
    struct SlowProbe;

    impl Probe for SlowProbe {
        fn kind(&self) -> crate::traits::ProbeKind {
            crate::traits::ProbeKind::ProcessorLoad
        }

        fn start(&self) {}

        fn stop(&self) {}

        fn read(&self) -> ProbeReading {
            std::thread::sleep(Duration::from_millis(400));
            ProbeReading::ProcessorLoad(40.0)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_read_does_not_block_store_access() {
        let monitor = Arc::new(PerformanceMonitor::builder().probe(Arc::new(SlowProbe)).build());
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();

        let collector = Arc::clone(&monitor);
        let handle = std::thread::spawn(move || collector.collect_now());
        std::thread::sleep(Duration::from_millis(50));

        let began = std::time::Instant::now();
        assert_eq!(monitor.collected_count(), 0);
        assert_eq!(monitor.analyze().total_data_points, 0);
        assert!(began.elapsed() < Duration::from_millis(200));

        assert!(handle.join().unwrap());
        assert_eq!(monitor.collected_count(), 1);
        monitor.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sample_read_during_stop_is_discarded() {
        let monitor = Arc::new(PerformanceMonitor::builder().probe(Arc::new(SlowProbe)).build());
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();

        let collector = Arc::clone(&monitor);
        let handle = std::thread::spawn(move || collector.collect_now());
        std::thread::sleep(Duration::from_millis(50));
        monitor.stop();

        assert!(!handle.join().unwrap());
        assert_eq!(monitor.collected_count(), 0);
    }

    /// Panics on its first scheduled collection only.
    struct PanicOnceProbe {
        panicked: AtomicBool,
    }

    impl Probe for PanicOnceProbe {
        fn kind(&self) -> crate::traits::ProbeKind {
            crate::traits::ProbeKind::Memory
        }

        fn start(&self) {}

        fn stop(&self) {}

        fn read(&self) -> ProbeReading {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("host memory API unavailable");
            }
            ProbeReading::Memory(120.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_probe_does_not_stop_collection() {
        let probe = Arc::new(PanicOnceProbe {
            panicked: AtomicBool::new(false),
        });
        let monitor = PerformanceMonitor::builder()
            .probe(probe)
            .probe(Arc::new(GaugeProbe::frame_rate(60.0)))
            .build();
        monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(1050)).await;

        assert!(monitor.is_running());
        // Ten ticks, the first of which panicked.
        assert_eq!(monitor.collected_count(), 9);
        assert_eq!(monitor.samples()[0].memory_usage, 120.0);
        assert_eq!(monitor.analyze().total_data_points, 9);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_probe_lifecycle_calls() {
        let mut probe = MockProbe::new();
        probe.expect_start().times(1).return_const(());
        probe.expect_stop().times(1).return_const(());
        probe
            .expect_collect()
            .returning(|| ProbeReading::ProcessorLoad(55.0));
        probe.expect_reported_anomalies().returning(Vec::new);

        let monitor = PerformanceMonitor::builder().probe(Arc::new(probe)).build();
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        monitor.collect_now();
        monitor.stop();
        monitor.stop();

        assert_eq!(monitor.samples()[0].processor_load, 55.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_report() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = PerformanceMonitor::builder()
            .probe(Arc::new(mock_probe(ProbeReading::FrameRate(30.0))))
            .report_dir(dir.path())
            .build();
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        monitor.collect_now();
        monitor.stop();

        let paths = monitor
            .generate_report(&[ReportFormat::Json, ReportFormat::Csv])
            .unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.starts_with(dir.path())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_generate_report_task() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = PerformanceMonitor::builder()
            .probe(Arc::new(mock_probe(ProbeReading::Memory(300.0))))
            .report_dir(dir.path())
            .build();
        monitor.start(Duration::from_secs(60), ThresholdConfig::default()).unwrap();
        monitor.collect_now();

        let task = monitor.generate_report_task(vec![ReportFormat::Json]);
        // Samples taken after the snapshot are not part of the report.
        monitor.collect_now();
        let paths = task.await.unwrap();
        monitor.stop();

        let content = std::fs::read_to_string(&paths[0]).unwrap();
        let report = crate::report::json::parse(&content).unwrap();
        assert_eq!(report.analysis.total_data_points, 1);
        assert_eq!(report.analysis.count_of(AnomalyKind::HighMemory), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_report_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let monitor = PerformanceMonitor::builder()
            .report_dir(blocker.join("reports"))
            .build();

        let err = monitor.generate_report(&[ReportFormat::Json]).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Export(ExportError::CreateDirectory { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let rig = rig(10);
        rig.monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        rig.monitor.stop();
        rig.monitor.start(INTERVAL, ThresholdConfig::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        rig.monitor.stop();

        assert_eq!(rig.monitor.collected_count(), 2);
    }
}
