//! Host-fed scalar probe.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::traits::{Probe, ProbeKind, ProbeReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gauge {
    FrameRate,
    ProcessorLoad,
    Memory,
}

/// A probe whose value is pushed by the host with [`GaugeProbe::set`].
///
/// Suitable for any metric the host already measures itself. The value is
/// stored as raw `f64` bits, so reads and writes never block.
#[derive(Debug)]
pub struct GaugeProbe {
    gauge: Gauge,
    value: AtomicU64,
    active: AtomicBool,
}

impl GaugeProbe {
    fn with_gauge(gauge: Gauge, initial: f64) -> Self {
        Self {
            gauge,
            value: AtomicU64::new(initial.to_bits()),
            active: AtomicBool::new(false),
        }
    }

    /// Frames-per-second gauge.
    #[must_use]
    pub fn frame_rate(initial: f64) -> Self {
        Self::with_gauge(Gauge::FrameRate, initial)
    }

    /// Processor-load gauge, in percent.
    #[must_use]
    pub fn processor_load(initial: f64) -> Self {
        Self::with_gauge(Gauge::ProcessorLoad, initial)
    }

    /// Memory gauge, in megabytes.
    #[must_use]
    pub fn memory(initial: f64) -> Self {
        Self::with_gauge(Gauge::Memory, initial)
    }

    /// Publish a new value.
    pub fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Release);
    }

    /// The last published value.
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Whether the controller has started this probe.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Probe for GaugeProbe {
    fn kind(&self) -> ProbeKind {
        match self.gauge {
            Gauge::FrameRate => ProbeKind::FrameRate,
            Gauge::ProcessorLoad => ProbeKind::ProcessorLoad,
            Gauge::Memory => ProbeKind::Memory,
        }
    }

    fn start(&self) {
        self.active.store(true, Ordering::Release);
    }

    fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn read(&self) -> ProbeReading {
        let value = self.get();
        match self.gauge {
            Gauge::FrameRate => ProbeReading::FrameRate(value),
            Gauge::ProcessorLoad => ProbeReading::ProcessorLoad(value),
            Gauge::Memory => ProbeReading::Memory(value),
        }
    }
}
