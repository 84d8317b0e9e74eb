//! SinkHandle - manages a counter sink with isolated queue and worker task

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::CounterSink;

/// Handle to a running sink worker
///
/// Dropping the handle closes the queue; the worker then closes the sink
/// and exits on its own.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send counter samples to the worker
    tx: mpsc::Sender<u64>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: CounterSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_name).await;
        });

        Self {
            name,
            tx,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a counter sample to the sink (non-blocking)
    ///
    /// Returns true if queued, false if the queue was full. Samples are
    /// momentary values, so a dropped one is simply superseded by the next.
    pub fn try_send(&self, value: u64) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(v)) => {
                debug!(sink = %self.name, value = v, "Queue full, sample dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes counter samples and writes them to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx),
    fields(sink = %name)
)]
async fn sink_worker<S: CounterSink>(mut sink: S, mut rx: mpsc::Receiver<u64>, name: String) {
    debug!(sink = %name, "Sink worker started");

    while let Some(value) = rx.recv().await {
        if let Err(e) = sink.display(value).await {
            // Continue processing - don't crash on single failure
            warn!(sink = %name, value, error = %e, "Display failed");
        }
    }

    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, Duration};

    /// Mock sink for testing
    struct MockSink {
        name: String,
        seen: Arc<Mutex<Vec<u64>>>,
        closed: Arc<AtomicBool>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<u64>>>, Arc<AtomicBool>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            (
                Self {
                    name: name.to_string(),
                    seen: Arc::clone(&seen),
                    closed: Arc::clone(&closed),
                    should_fail: false,
                    delay_ms: 0,
                },
                seen,
                closed,
            )
        }
    }

    impl CounterSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn display(&mut self, value: u64) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.seen.lock().unwrap().push(value);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let (sink, seen, closed) = MockSink::new("test");
        let handle = SinkHandle::spawn(sink, 10);

        for value in [1u64, 2, 3, 4, 5] {
            assert!(handle.try_send(value));
        }

        handle.shutdown().await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full_drops_samples() {
        let (mut sink, seen, _) = MockSink::new("slow");
        sink.delay_ms = 100; // Slow sink

        // Small queue capacity
        let handle = SinkHandle::spawn(sink, 2);

        let mut dropped = 0;
        for value in 0..10u64 {
            if !handle.try_send(value) {
                dropped += 1;
            }
        }
        assert!(dropped > 0);

        handle.shutdown().await;
        assert!(seen.lock().unwrap().len() < 10);
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let failures = Arc::new(AtomicU64::new(0));

        struct FailingSink {
            failures: Arc<AtomicU64>,
        }

        impl CounterSink for FailingSink {
            fn name(&self) -> &str {
                "failing"
            }

            async fn display(&mut self, _value: u64) -> Result<(), ContractError> {
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(ContractError::sink_write("failing", "boom"))
            }

            async fn close(&mut self) -> Result<(), ContractError> {
                Ok(())
            }
        }

        let handle = SinkHandle::spawn(
            FailingSink {
                failures: Arc::clone(&failures),
            },
            10,
        );

        for value in 0..3u64 {
            handle.try_send(value);
        }

        // Worker survives failures and processes everything
        handle.shutdown().await;
        assert_eq!(failures.load(Ordering::SeqCst), 3);
    }
}
