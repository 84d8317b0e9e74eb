//! Liveness counters shared between the tick loop and completion tasks.
//!
//! Completion tasks run interleaved with ticks on the runtime, so the
//! counters are atomics; `busy` is always derived, never stored, which
//! keeps `busy == total - completed` true by construction.

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::CounterSnapshot;

/// Engine counters
#[derive(Debug, Default)]
pub struct Counters {
    /// Probes launched since the last clear
    total: AtomicU64,
    /// Probes that signalled completion (any outcome)
    completed: AtomicU64,
    /// Probes launched in the current heat window
    heat: AtomicU64,
}

impl Counters {
    /// Create new counters, all zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total launched probes
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Get completed probes
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Get current heat window count
    pub fn heat(&self) -> u64 {
        self.heat.load(Ordering::SeqCst)
    }

    /// Outstanding probes, derived on demand
    ///
    /// Saturating: a completion that lands between the two loads can make
    /// the raw difference transiently negative, which reads as zero.
    pub fn busy(&self) -> u64 {
        self.total().saturating_sub(self.completed())
    }

    /// Record one launched probe; returns the new total
    pub fn record_launch(&self) -> u64 {
        self.heat.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record one completed probe; returns the new completed count
    pub fn record_completion(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Close the current heat window: returns its count and resets it
    pub fn take_heat(&self) -> u64 {
        self.heat.swap(0, Ordering::SeqCst)
    }

    /// Reset the counters, keeping still-outstanding probes on the books
    ///
    /// `total` drops by the completed count rather than to zero, so busy
    /// probes remain visible across a clear. Returns the new total.
    pub fn clear(&self) -> u64 {
        self.heat.store(0, Ordering::SeqCst);
        let done = self.completed.swap(0, Ordering::SeqCst);
        self.total.fetch_sub(done, Ordering::SeqCst) - done
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        let total = self.total();
        let completed = self.completed();
        CounterSnapshot {
            total,
            completed,
            busy: total.saturating_sub(completed),
            heat: self.heat(),
        }
    }
}
