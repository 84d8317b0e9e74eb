//! Mock 探测传输
//!
//! 用于单元测试与演示的 mock 实现，完成时机可控。

use std::sync::{Arc, Mutex, PoisonError};

use contracts::Transport;
use tokio::sync::Semaphore;

/// Mock transport with controllable completions
///
/// In instant mode every probe completes immediately. In manual mode a
/// probe stays in flight until a permit is released with [`release`] (one
/// permit per completion) or the gate is closed with [`complete_all`].
///
/// Clones share state, so tests can keep a handle while the engine owns
/// the transport.
///
/// [`release`]: MockProbe::release
/// [`complete_all`]: MockProbe::complete_all
#[derive(Clone)]
pub struct MockProbe {
    inner: Arc<MockProbeInner>,
}

struct MockProbeInner {
    /// Manual mode: completions wait on the gate
    manual: bool,
    /// Completion gate, one permit per completion
    gate: Semaphore,
    /// URLs of every dispatched probe, in dispatch order
    fired: Mutex<Vec<String>>,
}

impl MockProbe {
    /// Create a mock where every probe completes immediately
    pub fn instant() -> Self {
        Self {
            inner: Arc::new(MockProbeInner {
                manual: false,
                gate: Semaphore::new(0),
                fired: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a mock where probes stay in flight until released
    pub fn manual() -> Self {
        Self {
            inner: Arc::new(MockProbeInner {
                manual: true,
                gate: Semaphore::new(0),
                fired: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Let `n` in-flight (or future) probes complete
    pub fn release(&self, n: usize) {
        self.inner.gate.add_permits(n);
    }

    /// Complete every in-flight and future probe
    pub fn complete_all(&self) {
        self.inner.gate.close();
    }

    /// Number of probes dispatched so far
    pub fn fired_count(&self) -> usize {
        self.fired_guard().len()
    }

    /// URLs of every dispatched probe, in dispatch order
    pub fn fired_urls(&self) -> Vec<String> {
        self.fired_guard().clone()
    }

    fn fired_guard(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.inner
            .fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockProbe {
    async fn probe(&self, url: &str) {
        self.fired_guard().push(url.to_string());
        if self.inner.manual {
            match self.inner.gate.acquire().await {
                // Consume the permit so each release maps to one completion
                Ok(permit) => permit.forget(),
                // Closed gate: everything completes
                Err(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_instant_mock_completes_immediately() {
        let mock = MockProbe::instant();
        mock.probe("http://t/x?1").await;
        assert_eq!(mock.fired_count(), 1);
        assert_eq!(mock.fired_urls(), vec!["http://t/x?1".to_string()]);
    }

    #[tokio::test]
    async fn test_manual_mock_waits_for_release() {
        let mock = MockProbe::manual();
        let pending = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.probe("http://t/x?1").await })
        };

        // Not released yet: the probe must still be in flight
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        mock.release(1);
        timeout(Duration::from_secs(1), pending)
            .await
            .expect("probe should complete after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_complete_all_flushes_pending() {
        let mock = MockProbe::manual();
        let mut handles = Vec::new();
        for i in 0..3 {
            let mock = mock.clone();
            handles.push(tokio::spawn(
                async move { mock.probe(&format!("http://t/x?{i}")).await },
            ));
        }

        mock.complete_all();
        for handle in handles {
            timeout(Duration::from_secs(1), handle)
                .await
                .expect("probe should complete after close")
                .unwrap();
        }
        assert_eq!(mock.fired_count(), 3);
    }
}
