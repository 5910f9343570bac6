//! Counter sinks injected into stages at construction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Write-only destination for the monotonic counters a stage emits.
pub trait MetricsSink: Send + Sync {
    /// Increments the named counter by one.
    fn increment(&self, counter: &'static str);
}

/// Forwards counters to the process-wide `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderSink;

impl MetricsSink for RecorderSink {
    fn increment(&self, counter: &'static str) {
        metrics::counter!(counter).increment(1);
    }
}

/// Counts increments in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    counts: Arc<Mutex<HashMap<&'static str, u64>>>,
}

impl InMemoryMetrics {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of a counter (0 if never incremented).
    pub fn get(&self, counter: &str) -> u64 {
        self.counts
            .lock()
            .map(|counts| counts.get(counter).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, counter: &'static str) {
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(counter).or_insert(0) += 1;
        }
    }
}

impl<M: MetricsSink + ?Sized> MetricsSink for Arc<M> {
    fn increment(&self, counter: &'static str) {
        (**self).increment(counter);
    }
}
