//! Bounded metric history.
//!
//! [`MetricStore`] keeps the most recent samples in insertion order and
//! silently evicts the oldest ones once its capacity is reached. It has no
//! locking of its own; the controller serializes every access.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use perf_monitor::store::MetricStore;
//! use perf_monitor::traits::MetricSample;
//!
//! let mut store = MetricStore::new(2);
//! for memory in [100.0, 110.0, 120.0] {
//!     store.append(MetricSample::new(Utc::now(), 60.0, 10.0, memory));
//! }
//!
//! assert_eq!(store.count(), 2);
//! let memory: Vec<f64> = store.all().iter().map(|s| s.memory_usage).collect();
//! assert_eq!(memory, vec![110.0, 120.0]);
//! ```

use std::collections::VecDeque;

use crate::traits::MetricSample;

/// Default number of samples retained.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Fixed-capacity FIFO buffer of samples.
#[derive(Debug, Clone)]
pub struct MetricStore {
    samples: VecDeque<MetricSample>,
    capacity: usize,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetricStore {
    /// Create an empty store holding at most `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            // Large capacities allocate lazily.
            samples: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest entries beyond capacity.
    ///
    /// Returns the number of samples evicted.
    pub fn append(&mut self, sample: MetricSample) -> usize {
        self.samples.push_back(sample);
        let excess = self.samples.len().saturating_sub(self.capacity);
        self.samples.drain(..excess);
        excess
    }

    /// Copy of all samples, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<MetricSample> {
        self.samples.iter().cloned().collect()
    }

    /// Iterate over samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    /// Most recently appended sample.
    #[must_use]
    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    /// Remove every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples retained.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
