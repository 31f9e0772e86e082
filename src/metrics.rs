// Performance metrics module
//
// Lightweight counters for remote calls and notifications

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Remote call and notification metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// One instance is shared (via `Arc`) by the dispatcher and the notifier.
#[derive(Debug)]
pub struct Metrics {
    /// Remote calls attempted (after dispatch succeeded)
    pub remote_calls: AtomicU64,

    /// Remote calls that returned an error
    pub remote_failures: AtomicU64,

    /// Calls rejected locally before reaching the network
    pub local_rejections: AtomicU64,

    /// Total wall time of remote calls in milliseconds, busy floor included
    pub total_remote_time_ms: AtomicU64,

    /// Notifications delivered to at least one subscriber
    pub notifications_sent: AtomicU64,

    /// Notifications emitted while nobody was subscribed
    pub notifications_unheard: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            remote_calls: AtomicU64::new(0),
            remote_failures: AtomicU64::new(0),
            local_rejections: AtomicU64::new(0),
            total_remote_time_ms: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            notifications_unheard: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished remote call
    pub fn record_remote_call(&self, duration: Duration, failed: bool) {
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.remote_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.total_remote_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a call rejected before any network traffic
    pub fn record_local_rejection(&self) {
        self.local_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a notification and whether anyone received it
    pub fn record_notification(&self, heard: bool) {
        if heard {
            self.notifications_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.notifications_unheard.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average remote call time in milliseconds
    pub fn avg_remote_time_ms(&self) -> f64 {
        let total = self.total_remote_time_ms.load(Ordering::Relaxed);
        let count = self.remote_calls.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} remote calls ({} failed, {} rejected locally), avg {:.0}ms, {} notifications ({} unheard), uptime {:.0}s",
            self.remote_calls.load(Ordering::Relaxed),
            self.remote_failures.load(Ordering::Relaxed),
            self.local_rejections.load(Ordering::Relaxed),
            self.avg_remote_time_ms(),
            self.notifications_sent.load(Ordering::Relaxed)
                + self.notifications_unheard.load(Ordering::Relaxed),
            self.notifications_unheard.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        )
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("Metrics: {}", self.summary());
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
