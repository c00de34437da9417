//! Observability metrics for wrapped callables.
//!
//! Provides counters about combinator behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking combinator statistics for one `Funcs` instance.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Calls a limiter wrapper forwarded to its inner callable
    calls_forwarded: AtomicU64,
    /// Calls an exhausted limiter wrapper dropped
    calls_suppressed: AtomicU64,
    /// Combinator requests that degraded to noop
    fallbacks: AtomicU64,
    /// Deferred calls handed to the scheduler
    tasks_scheduled: AtomicU64,
    /// Deferred calls that ran to completion
    tasks_completed: AtomicU64,
    /// Deferred calls that panicked
    tasks_panicked: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                calls_forwarded: AtomicU64::new(0),
                calls_suppressed: AtomicU64::new(0),
                fallbacks: AtomicU64::new(0),
                tasks_scheduled: AtomicU64::new(0),
                tasks_completed: AtomicU64::new(0),
                tasks_panicked: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_forwarded(&self) {
        self.inner.calls_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.calls_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self) {
        self.inner.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scheduled(&self) {
        self.inner.tasks_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.inner.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_panicked(&self) {
        self.inner.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of calls forwarded by limiter wrappers.
    pub fn calls_forwarded(&self) -> u64 {
        self.inner.calls_forwarded.load(Ordering::Relaxed)
    }

    /// Get the number of calls dropped by exhausted limiter wrappers.
    pub fn calls_suppressed(&self) -> u64 {
        self.inner.calls_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of combinator requests that fell back to noop.
    pub fn fallbacks(&self) -> u64 {
        self.inner.fallbacks.load(Ordering::Relaxed)
    }

    /// Get the number of deferred calls scheduled.
    pub fn tasks_scheduled(&self) -> u64 {
        self.inner.tasks_scheduled.load(Ordering::Relaxed)
    }

    /// Get the number of deferred calls that completed.
    pub fn tasks_completed(&self) -> u64 {
        self.inner.tasks_completed.load(Ordering::Relaxed)
    }

    /// Get the number of deferred calls that panicked.
    pub fn tasks_panicked(&self) -> u64 {
        self.inner.tasks_panicked.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_forwarded: self.calls_forwarded(),
            calls_suppressed: self.calls_suppressed(),
            fallbacks: self.fallbacks(),
            tasks_scheduled: self.tasks_scheduled(),
            tasks_completed: self.tasks_completed(),
            tasks_panicked: self.tasks_panicked(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.calls_forwarded.store(0, Ordering::Relaxed);
        self.inner.calls_suppressed.store(0, Ordering::Relaxed);
        self.inner.fallbacks.store(0, Ordering::Relaxed);
        self.inner.tasks_scheduled.store(0, Ordering::Relaxed);
        self.inner.tasks_completed.store(0, Ordering::Relaxed);
        self.inner.tasks_panicked.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Calls a limiter wrapper forwarded to its inner callable
    pub calls_forwarded: u64,
    /// Calls an exhausted limiter wrapper dropped
    pub calls_suppressed: u64,
    /// Combinator requests that degraded to noop
    pub fallbacks: u64,
    /// Deferred calls handed to the scheduler
    pub tasks_scheduled: u64,
    /// Deferred calls that ran to completion
    pub tasks_completed: u64,
    /// Deferred calls that panicked
    pub tasks_panicked: u64,
}

impl MetricsSnapshot {
    /// Deferred calls scheduled but not yet finished (completed or panicked).
    pub fn tasks_pending(&self) -> u64 {
        self.tasks_scheduled
            .saturating_sub(self.tasks_completed.saturating_add(self.tasks_panicked))
    }

    /// Calculate the suppression rate (0.0 to 1.0) across limiter wrappers.
    ///
    /// Returns 0.0 if no limiter calls have been made.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.calls_forwarded.saturating_add(self.calls_suppressed);
        if total == 0 {
            0.0
        } else {
            self.calls_suppressed as f64 / total as f64
        }
    }
}
