// Engine metrics
//
// Lightweight counters describing how a carousel was driven during its lifetime

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Carousel activity counters
///
/// Uses atomic operations so the handle, the driver task and render adapters can
/// record without taking the engine lock. Logged once on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Transitions handed to the render adapter
    pub transitions_started: AtomicU64,

    /// Transitions ended by a matching completion signal
    pub transitions_completed: AtomicU64,

    /// Requests stored into the pending slot while busy
    pub requests_coalesced: AtomicU64,

    /// Pending requests that were overwritten by a newer one before running
    pub requests_superseded: AtomicU64,

    /// Requests dropped as no-ops (same index, out of range, degenerate deck)
    pub requests_ignored: AtomicU64,

    /// Busy windows ended by the watchdog
    pub watchdog_recoveries: AtomicU64,

    /// Completion signals for transitions that were no longer in flight
    pub stale_completions: AtomicU64,

    /// Autoplay periods that advanced the carousel
    pub autoplay_advances: AtomicU64,

    /// Swipes that crossed the threshold
    pub swipes_recognized: AtomicU64,

    /// Total time spent in busy windows, in milliseconds
    pub busy_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            transitions_started: AtomicU64::new(0),
            transitions_completed: AtomicU64::new(0),
            requests_coalesced: AtomicU64::new(0),
            requests_superseded: AtomicU64::new(0),
            requests_ignored: AtomicU64::new(0),
            watchdog_recoveries: AtomicU64::new(0),
            stale_completions: AtomicU64::new(0),
            autoplay_advances: AtomicU64::new(0),
            swipes_recognized: AtomicU64::new(0),
            busy_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_transition_started(&self) {
        self.transitions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition_completed(&self, busy_for: Duration) {
        self.transitions_completed.fetch_add(1, Ordering::Relaxed);
        self.record_busy_time(busy_for);
    }

    pub fn record_coalesced(&self, superseded: bool) {
        self.requests_coalesced.fetch_add(1, Ordering::Relaxed);
        if superseded {
            self.requests_superseded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_ignored(&self) {
        self.requests_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_watchdog_recovery(&self, busy_for: Duration) {
        self.watchdog_recoveries.fetch_add(1, Ordering::Relaxed);
        self.record_busy_time(busy_for);
    }

    pub fn record_stale_completion(&self) {
        self.stale_completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_autoplay_advance(&self) {
        self.autoplay_advances.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swipe(&self) {
        self.swipes_recognized.fetch_add(1, Ordering::Relaxed);
    }

    fn record_busy_time(&self, busy_for: Duration) {
        self.busy_time_ms
            .fetch_add(busy_for.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average busy window in milliseconds over all ended transitions
    pub fn avg_busy_ms(&self) -> f64 {
        let total = self.busy_time_ms.load(Ordering::Relaxed);
        let count = self.transitions_completed.load(Ordering::Relaxed)
            + self.watchdog_recoveries.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Carousel Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Transitions: {} started, {} completed, {} recovered by watchdog (avg busy {:.1}ms)",
            self.transitions_started.load(Ordering::Relaxed),
            self.transitions_completed.load(Ordering::Relaxed),
            self.watchdog_recoveries.load(Ordering::Relaxed),
            self.avg_busy_ms()
        );
        tracing::info!(
            "Requests: {} coalesced ({} superseded), {} ignored, {} stale completions",
            self.requests_coalesced.load(Ordering::Relaxed),
            self.requests_superseded.load(Ordering::Relaxed),
            self.requests_ignored.load(Ordering::Relaxed),
            self.stale_completions.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Input: {} autoplay advances, {} swipes",
            self.autoplay_advances.load(Ordering::Relaxed),
            self.swipes_recognized.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.transitions_started.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.watchdog_recoveries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_coalesced_counts_superseded() {
        let metrics = Metrics::new();

        metrics.record_coalesced(false);
        metrics.record_coalesced(true);
        metrics.record_coalesced(true);

        assert_eq!(metrics.requests_coalesced.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.requests_superseded.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_avg_busy_time() {
        let metrics = Metrics::new();

        metrics.record_transition_completed(Duration::from_millis(100));
        metrics.record_watchdog_recovery(Duration::from_millis(1500));

        assert_eq!(metrics.busy_time_ms.load(Ordering::Relaxed), 1600);
        assert_eq!(metrics.avg_busy_ms(), 800.0);
    }

    #[test]
    fn test_avg_busy_time_without_transitions() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_busy_ms(), 0.0);
    }
}
