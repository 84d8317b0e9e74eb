//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 引擎生命周期与计数器不变量测试（暂停时钟 + mock 传输）
//! - 容量准入与 heat 窗口测试
//! - 计划加载端到端测试

/// Let spawned completion tasks run to quiescence on the paused runtime
#[cfg(test)]
async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock one tick period at a time.
///
/// The tick loop skips missed ticks rather than bursting to catch up, so
/// a single large jump collapses into at most one tick; period-sized
/// steps with a settle in between fire every tick exactly once. Callers
/// must settle once after `start`/`bind` so the timer registers before
/// the first step.
#[cfg(test)]
async fn advance_ticks(period: std::time::Duration, count: u32) {
    for _ in 0..count {
        tokio::time::advance(period).await;
        settle().await;
    }
}

#[cfg(test)]
mod invariant_tests {
    use std::time::Duration;

    use engine::Engine;
    use probe::MockProbe;

    use crate::{advance_ticks, settle};

    /// busy == total - completed must hold at every observation point,
    /// including with probes parked in flight.
    #[tokio::test(start_paused = true)]
    async fn test_busy_invariant_under_load() {
        let mock = MockProbe::manual();
        let engine = Engine::new(mock.clone());
        engine.set_rate(10.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 10).await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.total, 10);
        assert_eq!(snapshot.completed, 0);
        assert_eq!(snapshot.busy, snapshot.total - snapshot.completed);

        mock.release(4);
        settle().await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.completed, 4);
        assert_eq!(snapshot.busy, 6);
        assert_eq!(snapshot.busy, snapshot.total - snapshot.completed);

        engine.stop();
        mock.complete_all();
        settle().await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.completed, snapshot.total);
        assert_eq!(snapshot.busy, 0);
    }

    /// Each release maps to exactly one completion; completed never
    /// overtakes total.
    #[tokio::test(start_paused = true)]
    async fn test_completion_exactly_once() {
        let mock = MockProbe::manual();
        let engine = Engine::new(mock.clone());
        engine.set_rate(5.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(200), 3).await;
        engine.stop();

        assert_eq!(engine.counters().total, 3);

        mock.release(3);
        settle().await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.completed, 3);
        assert!(snapshot.completed <= snapshot.total);
        assert_eq!(snapshot.busy, 0);
    }

    /// Every dispatched URL carries the target, an id and the message.
    #[tokio::test(start_paused = true)]
    async fn test_probe_urls_carry_target_and_message() {
        let mock = MockProbe::instant();
        let engine = Engine::new(mock.clone());
        engine.brief("http://localhost:9/probe", "hello", 10.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 3).await;
        engine.stop();

        let urls = mock.fired_urls();
        assert_eq!(urls.len(), 3);
        for url in &urls {
            assert!(url.starts_with("http://localhost:9/probe?"));
            assert!(url.ends_with("-hello"));
        }
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::time::Duration;

    use engine::Engine;
    use probe::MockProbe;

    use crate::{advance_ticks, settle};

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let engine = Engine::new(MockProbe::instant());
        engine.set_rate(10.0);

        assert!(engine.start());
        assert!(!engine.start());
        assert!(engine.is_firing());

        assert!(engine.stop());
        assert!(!engine.stop());
        assert!(!engine.is_firing());
    }

    /// Stopping cancels the tick only: probes already in flight still
    /// complete and still count.
    #[tokio::test(start_paused = true)]
    async fn test_stop_keeps_in_flight_probes() {
        let mock = MockProbe::manual();
        let engine = Engine::new(mock.clone());
        engine.set_rate(1.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(1000), 1).await;

        assert!(engine.stop());
        assert_eq!(engine.counters().busy, 1);

        mock.release(1);
        settle().await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.total, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.busy, 0);
    }

    /// No launches may happen after stop, however long we wait.
    #[tokio::test(start_paused = true)]
    async fn test_no_launches_after_stop() {
        let mock = MockProbe::instant();
        let engine = Engine::new(mock.clone());
        engine.set_rate(10.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 5).await;
        engine.stop();

        let fired = mock.fired_count();
        assert_eq!(fired, 5);
        advance_ticks(Duration::from_millis(100), 20).await;
        assert_eq!(mock.fired_count(), fired);
    }

    /// A rate change while firing takes effect on the next start, not on
    /// the running tick.
    #[tokio::test(start_paused = true)]
    async fn test_rate_change_applies_on_restart() {
        let mock = MockProbe::instant();
        let engine = Engine::new(mock.clone());
        engine.set_rate(1.0);

        engine.start();
        settle().await;
        engine.set_rate(10.0);
        advance_ticks(Duration::from_millis(1000), 1).await;
        // Still on the 1/s cadence sampled at start
        assert_eq!(mock.fired_count(), 1);

        engine.stop();
        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 10).await;
        assert_eq!(mock.fired_count(), 11);
        engine.stop();
    }
}

#[cfg(test)]
mod clear_tests {
    use std::time::Duration;

    use engine::{ChannelSink, Engine, SinkHandle};
    use probe::MockProbe;

    use crate::{advance_ticks, settle};

    /// Clearing keeps outstanding probes on the books: total drops by the
    /// completed count, completed and heat reset to zero.
    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_outstanding_probes() {
        let mock = MockProbe::manual();
        let engine = Engine::new(mock.clone());
        engine.set_rate(10.0);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 10).await;
        assert_eq!(engine.counters().total, 10);
        mock.release(4);
        settle().await;
        engine.stop();

        assert!(engine.clear());
        settle().await;

        let snapshot = engine.counters();
        assert_eq!(snapshot.total, 6);
        assert_eq!(snapshot.completed, 0);
        assert_eq!(snapshot.heat, 0);
        assert_eq!(snapshot.busy, 6);

        // The survivors still complete against the cleared counters
        mock.complete_all();
        settle().await;
        let snapshot = engine.counters();
        assert_eq!(snapshot.completed, 6);
        assert_eq!(snapshot.busy, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_rejected_while_firing() {
        let engine = Engine::new(MockProbe::instant());
        engine.set_rate(10.0);

        engine.start();
        assert!(!engine.clear());

        engine.stop();
        assert!(engine.clear());
    }

    /// Clear pushes heat, total and completed to their sinks but leaves
    /// the busy sink untouched.
    #[tokio::test(start_paused = true)]
    async fn test_clear_pushes_all_but_busy() {
        let engine = Engine::new(MockProbe::instant());

        let (heat_sink, mut heat_rx) = ChannelSink::pair("heat", 8);
        let (total_sink, mut total_rx) = ChannelSink::pair("total", 8);
        let (completed_sink, mut completed_rx) = ChannelSink::pair("completed", 8);
        let (busy_sink, mut busy_rx) = ChannelSink::pair("busy", 8);

        engine.bind_heat(Some(SinkHandle::spawn(heat_sink, 8)));
        engine.bind_total(Some(SinkHandle::spawn(total_sink, 8)));
        engine.bind_completed(Some(SinkHandle::spawn(completed_sink, 8)));
        engine.bind_busy(Some(SinkHandle::spawn(busy_sink, 8)));

        assert!(engine.clear());
        settle().await;

        assert_eq!(heat_rx.try_recv().unwrap(), 0);
        assert_eq!(total_rx.try_recv().unwrap(), 0);
        assert_eq!(completed_rx.try_recv().unwrap(), 0);
        assert!(busy_rx.try_recv().is_err());
    }
}

#[cfg(test)]
mod capacity_tests {
    use std::time::Duration;

    use engine::{Engine, DEFAULT_CAPACITY};
    use probe::MockProbe;

    use crate::{advance_ticks, settle};

    /// The admission check drops fire attempts once busy reaches the
    /// capacity; launches resume as completions free slots.
    #[tokio::test(start_paused = true)]
    async fn test_capacity_halts_launches() {
        let mock = MockProbe::manual();
        let engine = Engine::new(mock.clone());
        engine.set_rate(10.0);
        engine.set_capacity(3);

        engine.start();
        settle().await;
        advance_ticks(Duration::from_millis(100), 10).await;

        // 10 ticks but only 3 admitted
        assert_eq!(mock.fired_count(), 3);
        assert_eq!(engine.counters().busy, 3);

        mock.release(2);
        settle().await;
        advance_ticks(Duration::from_millis(100), 2).await;

        // Two freed slots refill on the next ticks
        assert_eq!(mock.fired_count(), 5);
        assert_eq!(engine.counters().busy, 3);

        engine.stop();
        mock.complete_all();
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_capacity_falls_back_to_default() {
        let engine = Engine::new(MockProbe::instant());
        engine.set_capacity(0);
        assert_eq!(engine.capacity(), DEFAULT_CAPACITY);
    }
}

#[cfg(test)]
mod heat_tests {
    use std::time::Duration;

    use engine::{ChannelSink, Engine, SinkHandle};
    use probe::MockProbe;

    use crate::{advance_ticks, settle};

    /// Heat counts launches per one-second window and resets at every
    /// window boundary.
    #[tokio::test(start_paused = true)]
    async fn test_heat_window_pushes_and_resets() {
        let mock = MockProbe::instant();
        let engine = Engine::new(mock.clone());
        engine.set_rate(10.0);

        let (heat_sink, mut heat_rx) = ChannelSink::pair("heat", 8);
        engine.bind_heat(Some(SinkHandle::spawn(heat_sink, 8)));
        settle().await;

        engine.start();
        settle().await;
        // 9 ticks land before the window boundary
        advance_ticks(Duration::from_millis(100), 9).await;
        engine.stop();

        // Window boundary at 1s pushes the 9 launches
        advance_ticks(Duration::from_millis(100), 1).await;
        assert_eq!(heat_rx.recv().await, Some(9));

        // Idle window pushes 0
        advance_ticks(Duration::from_secs(1), 1).await;
        assert_eq!(heat_rx.recv().await, Some(0));
    }

    /// The window task starts on the first heat bind only; re-binding
    /// swaps the sink without restarting the cadence.
    #[tokio::test(start_paused = true)]
    async fn test_heat_window_survives_rebind() {
        let engine = Engine::new(MockProbe::instant());

        let (first, _first_rx) = ChannelSink::pair("heat_a", 8);
        engine.bind_heat(Some(SinkHandle::spawn(first, 8)));
        settle().await;

        advance_ticks(Duration::from_millis(500), 1).await;

        let (second, mut second_rx) = ChannelSink::pair("heat_b", 8);
        engine.bind_heat(Some(SinkHandle::spawn(second, 8)));

        // The original cadence continues: next push lands at the 1s mark,
        // 500ms after the rebind, into the new sink.
        advance_ticks(Duration::from_millis(500), 1).await;
        assert_eq!(second_rx.recv().await, Some(0));
    }
}

#[cfg(test)]
mod plan_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::CounterKind;
    use engine::{create_sink_handle, Engine};
    use probe::MockProbe;

    const PLAN_TOML: &str = r#"
[target]
url = "http://localhost:8080/health"
message = "ping"

[fire]
rate_per_second = 25
capacity = 64

[run]
duration_secs = 5

[[sinks]]
name = "busy_log"
counter = "busy"
sink_type = "log"

[[sinks]]
name = "total_log"
counter = "total"
sink_type = "log"
"#;

    /// A loaded plan configures an engine end to end.
    #[tokio::test]
    async fn test_plan_configures_engine() {
        let plan = ConfigLoader::load_from_str(PLAN_TOML, ConfigFormat::Toml).unwrap();

        let engine = Engine::new(MockProbe::instant());
        engine.brief(
            &plan.target.url,
            &plan.target.message,
            plan.fire.rate_per_second as f64,
        );
        engine.set_capacity(plan.fire.capacity);

        assert_eq!(engine.target(), "http://localhost:8080/health");
        assert_eq!(engine.message(), "ping");
        assert_eq!(engine.rate(), 25);
        assert_eq!(engine.capacity(), 64);

        for sink_config in &plan.sinks {
            let handle = create_sink_handle(sink_config).unwrap();
            engine.bind(sink_config.counter, Some(handle));
        }
        assert_eq!(plan.sinks[0].counter, CounterKind::Busy);

        engine.close_sinks().await;
    }

    #[test]
    fn test_plan_rejects_bad_scheme() {
        let bad = PLAN_TOML.replace("http://localhost:8080/health", "ftp://nope");
        assert!(ConfigLoader::load_from_str(&bad, ConfigFormat::Toml).is_err());
    }

    /// Aggregated heat statistics survive a full update cycle.
    #[test]
    fn test_heat_aggregator_tracks_windows() {
        let mut agg = observability::HeatAggregator::new();
        for (heat, busy) in [(8, 2), (12, 5), (10, 3)] {
            agg.update(heat, busy);
        }
        let summary = agg.summary();
        assert_eq!(summary.windows, 3);
        assert_eq!(summary.peak_busy, 5);
        assert!((summary.heat.mean - 10.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::PlanVersion::V1;
    }

    #[test]
    fn test_counter_kind_labels() {
        use contracts::CounterKind;
        for kind in CounterKind::ALL {
            assert!(!kind.label().is_empty());
        }
    }
}
