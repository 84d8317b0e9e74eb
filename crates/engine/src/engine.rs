//! Engine - rate-limited probe dispatcher with liveness counters
//!
//! Two independent periodic tasks share the engine state: the fire tick
//! (spawned by `start`, aborted by `stop`) and the heat window (spawned by
//! the first heat bind, never stopped). Completion tasks for in-flight
//! probes run interleaved with both. All shared state is atomics or behind
//! short-lived mutexes, so any interleaving preserves
//! `busy == total - completed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use contracts::{CounterKind, CounterSnapshot, Transport};

use crate::counters::Counters;
use crate::handle::SinkHandle;

/// Capacity fallback used when the configured value is zero or unparseable.
///
/// A capacity of 0 must never be accepted: it would silently disable all
/// dispatch, so it falls back to the default instead.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Resolve the tick period for a given rate.
///
/// `floor(1000 / rate)` milliseconds, clamped to a 1ms minimum; rate 0
/// degenerates to firing as fast as the scheduler dispatches ticks.
pub fn tick_period(rate: u64) -> Duration {
    let millis = if rate == 0 { 1 } else { (1000 / rate).max(1) };
    Duration::from_millis(millis)
}

/// Parse a capacity value from raw text.
///
/// Parse failure or an explicit 0 both fall back to [`DEFAULT_CAPACITY`].
pub fn capacity_from_str(raw: &str) -> u64 {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&n| n != 0)
        .unwrap_or(DEFAULT_CAPACITY)
}

/// Build the probe URL for one fire attempt.
///
/// The id is appended as a query-like suffix, with the message (when set)
/// joined by a dash. The target is stored verbatim, so whatever the caller
/// configured is what goes on the wire.
fn probe_url(target: &str, message: &str, id: i64) -> String {
    if message.is_empty() {
        format!("{target}?{id}")
    } else {
        format!("{target}?{id}-{message}")
    }
}

/// Mutable aim configuration, guarded by one mutex
#[derive(Debug)]
struct Aim {
    target: String,
    message: String,
    rate: u64,
    capacity: u64,
}

impl Default for Aim {
    fn default() -> Self {
        Self {
            target: String::new(),
            message: String::new(),
            rate: 0,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// The four counter display slots
#[derive(Default)]
struct SinkTable {
    heat: Option<SinkHandle>,
    total: Option<SinkHandle>,
    completed: Option<SinkHandle>,
    busy: Option<SinkHandle>,
}

impl SinkTable {
    fn slot(&mut self, kind: CounterKind) -> &mut Option<SinkHandle> {
        match kind {
            CounterKind::Heat => &mut self.heat,
            CounterKind::Total => &mut self.total,
            CounterKind::Completed => &mut self.completed,
            CounterKind::Busy => &mut self.busy,
        }
    }

    fn get(&self, kind: CounterKind) -> Option<&SinkHandle> {
        match kind {
            CounterKind::Heat => self.heat.as_ref(),
            CounterKind::Total => self.total.as_ref(),
            CounterKind::Completed => self.completed.as_ref(),
            CounterKind::Busy => self.busy.as_ref(),
        }
    }

    fn take_all(&mut self) -> Vec<SinkHandle> {
        [
            self.heat.take(),
            self.total.take(),
            self.completed.take(),
            self.busy.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Lock a mutex, recovering from poisoning.
///
/// All guarded sections are short and leave the state consistent, so a
/// panicked holder cannot leave a half-applied update behind.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct EngineInner<T> {
    transport: T,
    counters: Counters,
    aim: Mutex<Aim>,
    sinks: Mutex<SinkTable>,
    fire_task: Mutex<Option<JoinHandle<()>>>,
    heat_task: Mutex<Option<JoinHandle<()>>>,
    firing: AtomicBool,
    heat_started: AtomicBool,
}

/// Rate-limited probe dispatcher with liveness counters
///
/// One engine per load session; clones share the same state, so the handle
/// can be passed to whatever drives the timers.
pub struct Engine<T> {
    inner: Arc<EngineInner<T>>,
}

impl<T> Clone for Engine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport + Send + Sync + 'static> Engine<T> {
    /// Create an idle engine around a transport
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                transport,
                counters: Counters::new(),
                aim: Mutex::new(Aim::default()),
                sinks: Mutex::new(SinkTable::default()),
                fire_task: Mutex::new(None),
                heat_task: Mutex::new(None),
                firing: AtomicBool::new(false),
                heat_started: AtomicBool::new(false),
            }),
        }
    }

    // ===== Configuration =====

    /// Set the probe target URL, stored verbatim
    pub fn set_target(&self, url: impl Into<String>) {
        lock(&self.inner.aim).target = url.into();
    }

    /// Set the message appended to every probe URL, stored verbatim
    pub fn set_message(&self, text: impl Into<String>) {
        lock(&self.inner.aim).message = text.into();
    }

    /// Set the fire rate in probes per second
    ///
    /// Stored as `max(0, floor(n))`; NaN and negatives read as 0. Takes
    /// effect on the next `start`.
    pub fn set_rate(&self, n: f64) {
        let rate = if n.is_finite() && n >= 1.0 {
            n.floor() as u64
        } else {
            0
        };
        lock(&self.inner.aim).rate = rate;
    }

    /// Set the outstanding-probe capacity; 0 falls back to the default
    pub fn set_capacity(&self, n: u64) {
        lock(&self.inner.aim).capacity = if n == 0 { DEFAULT_CAPACITY } else { n };
    }

    /// Convenience composition of target + message + rate
    pub fn brief(&self, target: impl Into<String>, message: impl Into<String>, rate: f64) {
        self.set_target(target);
        self.set_message(message);
        self.set_rate(rate);
    }

    /// Get the configured target URL
    pub fn target(&self) -> String {
        lock(&self.inner.aim).target.clone()
    }

    /// Get the configured message
    pub fn message(&self) -> String {
        lock(&self.inner.aim).message.clone()
    }

    /// Get the configured rate
    pub fn rate(&self) -> u64 {
        lock(&self.inner.aim).rate
    }

    /// Get the configured capacity
    pub fn capacity(&self) -> u64 {
        lock(&self.inner.aim).capacity
    }

    // ===== Lifecycle =====

    /// Start firing; returns false (no-op) when already firing
    ///
    /// The tick period is sampled from the configured rate at start time,
    /// matching the original cadence semantics: a rate change while firing
    /// applies on the next start.
    pub fn start(&self) -> bool {
        if self.inner.firing.swap(true, Ordering::SeqCst) {
            return false;
        }

        let period = tick_period(lock(&self.inner.aim).rate);
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            // First attempt lands one period after start; scheduler jitter
            // skips missed ticks instead of bursting to catch up.
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                inner.tick();
            }
        });
        *lock(&self.inner.fire_task) = Some(task);

        debug!(period_ms = period.as_millis() as u64, "Engine started firing");
        true
    }

    /// Stop firing; returns false (no-op) when already stopped
    ///
    /// Cancels only the tick timer. In-flight probes are NOT cancelled:
    /// they run to completion and still increment `completed` afterwards.
    pub fn stop(&self) -> bool {
        if !self.inner.firing.swap(false, Ordering::SeqCst) {
            return false;
        }

        if let Some(task) = lock(&self.inner.fire_task).take() {
            task.abort();
        }

        debug!(busy = self.inner.counters.busy(), "Engine stopped firing");
        true
    }

    /// Stop when firing, start when stopped; returns the new firing state
    pub fn toggle_fire(&self) -> bool {
        if self.is_firing() {
            self.stop();
        } else {
            self.start();
        }
        self.is_firing()
    }

    /// Whether the engine is currently firing
    pub fn is_firing(&self) -> bool {
        self.inner.firing.load(Ordering::SeqCst)
    }

    /// Reset counters; returns false (no mutation) while firing
    ///
    /// Still-outstanding probes survive the clear: `total` drops by the
    /// completed count, not to zero. Heat, total and completed are pushed
    /// to their sinks; busy is intentionally not pushed here (its value is
    /// unchanged by construction).
    pub fn clear(&self) -> bool {
        if self.is_firing() {
            return false;
        }

        let total = self.inner.counters.clear();
        self.inner.push(CounterKind::Heat, 0);
        self.inner.push(CounterKind::Total, total);
        self.inner.push(CounterKind::Completed, 0);

        debug!(total, "Counters cleared");
        true
    }

    // ===== Sink binding =====

    /// Bind (or unbind with `None`) the display sink for one counter
    ///
    /// Binding never pushes the current value retroactively; the next
    /// natural update populates the sink. A replaced handle is dropped,
    /// which lets its worker close the old sink in the background.
    pub fn bind(&self, kind: CounterKind, sink: Option<SinkHandle>) {
        let starts_heat_window = kind == CounterKind::Heat && sink.is_some();
        *lock(&self.inner.sinks).slot(kind) = sink;

        // The heat window starts on the first heat bind and then runs for
        // the engine's lifetime; re-binding replaces the sink only.
        if starts_heat_window && !self.inner.heat_started.swap(true, Ordering::SeqCst) {
            self.start_heat_window();
        }
    }

    /// Bind the heat (requests-per-second) sink
    pub fn bind_heat(&self, sink: Option<SinkHandle>) {
        self.bind(CounterKind::Heat, sink);
    }

    /// Bind the total-requests sink
    pub fn bind_total(&self, sink: Option<SinkHandle>) {
        self.bind(CounterKind::Total, sink);
    }

    /// Bind the completed-requests sink
    pub fn bind_completed(&self, sink: Option<SinkHandle>) {
        self.bind(CounterKind::Completed, sink);
    }

    /// Bind the busy-requests sink
    pub fn bind_busy(&self, sink: Option<SinkHandle>) {
        self.bind(CounterKind::Busy, sink);
    }

    /// Unbind all sinks and wait for their workers to finish
    pub async fn close_sinks(&self) {
        let handles = lock(&self.inner.sinks).take_all();
        for handle in handles {
            handle.shutdown().await;
        }
    }

    // ===== Readout =====

    /// Point-in-time snapshot of all counters
    pub fn counters(&self) -> CounterSnapshot {
        self.inner.counters.snapshot()
    }

    fn start_heat_window(&self) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut window = time::interval_at(time::Instant::now() + period, period);
            window.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                window.tick().await;
                // Push the window's count, then reset it. Not synchronized
                // with the fire tick, so a launch can straddle the boundary;
                // the reading is approximate by design.
                let heat = inner.counters.take_heat();
                inner.push(CounterKind::Heat, heat);
            }
        });
        *lock(&self.inner.heat_task) = Some(task);
        debug!("Heat window started");
    }
}

impl<T: Transport + Send + Sync + 'static> EngineInner<T> {
    /// One fire attempt
    fn tick(self: &Arc<Self>) {
        let busy = self.counters.busy();
        self.push(CounterKind::Busy, busy);

        // Admission check: over capacity drops the attempt, there is no
        // backpressure queue.
        let url = {
            let aim = lock(&self.aim);
            if busy >= aim.capacity {
                trace!(busy, capacity = aim.capacity, "At capacity, fire attempt dropped");
                metrics::counter!("volley_admission_drops_total").increment(1);
                return;
            }
            probe_url(&aim.target, &aim.message, Utc::now().timestamp_millis())
        };

        // Dispatch never fails synchronously: count the launch up front.
        let total = self.counters.record_launch();
        self.push(CounterKind::Total, total);
        self.push(CounterKind::Busy, self.counters.busy());
        trace!(total, url = %url, "Probe dispatched");

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            // Success, protocol error and abort all resolve the same way;
            // the transport contract collapses them into one completion.
            inner.transport.probe(&url).await;

            let completed = inner.counters.record_completion();
            inner.push(CounterKind::Completed, completed);
            inner.push(CounterKind::Busy, inner.counters.busy());
        });
    }

    fn push(&self, kind: CounterKind, value: u64) {
        if let Some(handle) = lock(&self.sinks).get(kind) {
            handle.try_send(value);
        }
    }
}
