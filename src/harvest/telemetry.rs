//! Telemetry module with atomic counters and snapshot export

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic metrics for the harvest pipeline
#[derive(Debug)]
pub struct HarvestMetrics {
    /// Pages fetched successfully
    pub pages_fetched: AtomicU64,
    /// Fetch attempts that failed (transport or non-2xx)
    pub fetch_errors: AtomicU64,
    /// Pages rejected by the parse stage
    pub pages_rejected: AtomicU64,
    /// Raw records seen across all pages
    pub records_seen: AtomicU64,
    /// Records dropped by the retention predicates
    pub records_filtered: AtomicU64,
    /// Records enqueued onto the receive channel
    pub records_enqueued: AtomicU64,
    /// Records acknowledged by the broker
    pub records_published: AtomicU64,
    /// Cycles skipped because lag was at or above the high-water mark
    pub lag_throttle_events: AtomicU64,
    /// Lookback window shrinks
    pub window_shrinks: AtomicU64,
    /// Daily floor resets
    pub daily_resets: AtomicU64,
    /// Publish latency samples (microseconds) for percentile queries
    pub publish_latency_samples: Mutex<Vec<u64>>,
}

const MAX_LATENCY_SAMPLES: usize = 1000;

impl HarvestMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            pages_fetched: AtomicU64::new(0),
            fetch_errors: AtomicU64::new(0),
            pages_rejected: AtomicU64::new(0),
            records_seen: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            records_enqueued: AtomicU64::new(0),
            records_published: AtomicU64::new(0),
            lag_throttle_events: AtomicU64::new(0),
            window_shrinks: AtomicU64::new(0),
            daily_resets: AtomicU64::new(0),
            publish_latency_samples: Mutex::new(Vec::with_capacity(MAX_LATENCY_SAMPLES)),
        }
    }

    /// Export counters as a JSON snapshot string
    pub fn snapshot(&self) -> String {
        format!(
            r#"{{"pages_fetched":{},"fetch_errors":{},"pages_rejected":{},"records_seen":{},"records_filtered":{},"records_enqueued":{},"records_published":{},"lag_throttle_events":{},"window_shrinks":{},"daily_resets":{}}}"#,
            self.pages_fetched.load(Ordering::Relaxed),
            self.fetch_errors.load(Ordering::Relaxed),
            self.pages_rejected.load(Ordering::Relaxed),
            self.records_seen.load(Ordering::Relaxed),
            self.records_filtered.load(Ordering::Relaxed),
            self.records_enqueued.load(Ordering::Relaxed),
            self.records_published.load(Ordering::Relaxed),
            self.lag_throttle_events.load(Ordering::Relaxed),
            self.window_shrinks.load(Ordering::Relaxed),
            self.daily_resets.load(Ordering::Relaxed),
        )
    }

    /// Record a publish latency sample (microseconds)
    pub fn record_publish_latency(&self, latency_us: u64) {
        let mut samples = self.publish_latency_samples.lock();
        if samples.len() < MAX_LATENCY_SAMPLES {
            samples.push(latency_us);
        } else {
            // round-robin replacement keeps the buffer bounded
            let idx = (latency_us % MAX_LATENCY_SAMPLES as u64) as usize;
            samples[idx] = latency_us;
        }
    }

    /// Percentile publish latency (e.g. 0.5 / 0.95 / 0.99).
    /// Returns None when no samples have been recorded.
    pub fn publish_latency_percentile(&self, percentile: f64) -> Option<u64> {
        let samples = self.publish_latency_samples.lock();
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.clone();
        sorted.sort_unstable();

        let idx = ((sorted.len() as f64 * percentile) as usize).min(sorted.len() - 1);
        Some(sorted[idx])
    }

    /// Reset all counters (useful for testing)
    pub fn reset(&self) {
        self.pages_fetched.store(0, Ordering::Relaxed);
        self.fetch_errors.store(0, Ordering::Relaxed);
        self.pages_rejected.store(0, Ordering::Relaxed);
        self.records_seen.store(0, Ordering::Relaxed);
        self.records_filtered.store(0, Ordering::Relaxed);
        self.records_enqueued.store(0, Ordering::Relaxed);
        self.records_published.store(0, Ordering::Relaxed);
        self.lag_throttle_events.store(0, Ordering::Relaxed);
        self.window_shrinks.store(0, Ordering::Relaxed);
        self.daily_resets.store(0, Ordering::Relaxed);
        self.publish_latency_samples.lock().clear();
    }
}

impl Default for HarvestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = HarvestMetrics::new();
        assert_eq!(metrics.records_seen.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.records_published.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_snapshot() {
        let metrics = HarvestMetrics::new();
        metrics.records_seen.fetch_add(100, Ordering::Relaxed);
        metrics.lag_throttle_events.fetch_add(2, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert!(snapshot.contains("\"records_seen\":100"));
        assert!(snapshot.contains("\"lag_throttle_events\":2"));
    }

    #[test]
    fn test_latency_percentile() {
        let metrics = HarvestMetrics::new();
        metrics.record_publish_latency(100);
        metrics.record_publish_latency(200);
        metrics.record_publish_latency(300);

        assert_eq!(metrics.publish_latency_percentile(0.5), Some(200));
    }

    #[test]
    fn test_reset() {
        let metrics = HarvestMetrics::new();
        metrics.records_seen.fetch_add(5, Ordering::Relaxed);
        metrics.record_publish_latency(10);

        metrics.reset();
        assert_eq!(metrics.records_seen.load(Ordering::Relaxed), 0);
        assert!(metrics.publish_latency_percentile(0.5).is_none());
    }
}
