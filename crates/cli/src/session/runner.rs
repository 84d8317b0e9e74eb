//! Session orchestrator - wires plan, engine, probe and sinks together.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{CounterKind, LoadPlan};
use engine::{create_sink_handle, ChannelSink, Engine, SinkHandle};
use observability::{record_counters, HeatAggregator};
use probe::HttpProbe;
use tracing::{error, info, warn};

use super::SessionStats;

/// How often the drain phase re-checks the busy counter
const DRAIN_POLL_PERIOD: Duration = Duration::from_millis(100);

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The load plan
    pub plan: LoadPlan,

    /// Session duration (None = run until the shutdown signal)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a new session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    ///
    /// Fires until the duration elapses or `shutdown` resolves, then stops
    /// the tick, waits out the drain grace for in-flight probes, closes all
    /// sinks and returns the final statistics.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<SessionStats> {
        let start_time = Instant::now();
        let plan = &self.config.plan;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build probe transport
        let transport = HttpProbe::new().context("Failed to build HTTP probe client")?;
        let engine = Engine::new(transport);

        engine.brief(
            &plan.target.url,
            &plan.target.message,
            plan.fire.rate_per_second as f64,
        );
        engine.set_capacity(plan.fire.capacity);

        info!(
            target = %engine.target(),
            rate = engine.rate(),
            capacity = engine.capacity(),
            "Engine configured"
        );

        // Bind display sinks from the plan. A plan-provided heat sink is
        // fed through the aggregation task instead of bound directly, so
        // the session summary still sees every window.
        let mut plan_heat_handle: Option<SinkHandle> = None;
        for sink_config in &plan.sinks {
            let handle = create_sink_handle(sink_config)
                .with_context(|| format!("Failed to create sink '{}'", sink_config.name))?;
            if sink_config.counter == CounterKind::Heat {
                plan_heat_handle = Some(handle);
            } else {
                engine.bind(sink_config.counter, Some(handle));
            }
        }

        let active_sinks = plan.sinks.len();
        info!(active_sinks, "Sinks bound");

        // Heat aggregation: a channel sink on the heat slot feeds both the
        // session summary and (when configured) the plan's own heat sink.
        let aggregator = Arc::new(Mutex::new(HeatAggregator::new()));
        let (heat_sink, mut heat_rx) = ChannelSink::pair("session_heat", 64);
        engine.bind_heat(Some(SinkHandle::spawn(heat_sink, 64)));

        let agg = Arc::clone(&aggregator);
        let agg_engine = engine.clone();
        let agg_task = tokio::spawn(async move {
            while let Some(heat) = heat_rx.recv().await {
                let snapshot = agg_engine.counters();
                agg.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update(heat, snapshot.busy);
                record_counters(&snapshot);

                if let Some(ref handle) = plan_heat_handle {
                    handle.try_send(heat);
                }
            }
            if let Some(handle) = plan_heat_handle {
                handle.shutdown().await;
            }
        });

        // Fire
        engine.start();
        info!("Session firing");

        match self.config.duration {
            Some(duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {
                        info!(duration_secs = duration.as_secs_f64(), "Session duration elapsed");
                    }
                    _ = shutdown => {
                        warn!("Received shutdown signal, stopping session...");
                    }
                }
            }
            None => {
                shutdown.await;
                warn!("Received shutdown signal, stopping session...");
            }
        }

        // Stop the tick; in-flight probes keep running and still count.
        engine.stop();

        // Drain grace: give outstanding probes a bounded window to land.
        let grace = Duration::from_secs(plan.run.drain_grace_secs);
        let deadline = Instant::now() + grace;
        loop {
            let busy = engine.counters().busy;
            if busy == 0 {
                info!("All probes drained");
                break;
            }
            if Instant::now() >= deadline {
                warn!(busy, grace_secs = grace.as_secs(), "Drain grace elapsed with probes outstanding");
                break;
            }
            tokio::time::sleep(DRAIN_POLL_PERIOD).await;
        }

        // Shutdown sinks; closing the heat channel ends the aggregation task.
        engine.close_sinks().await;
        if let Err(e) = agg_task.await {
            error!(error = ?e, "Heat aggregation task panicked");
        }

        let snapshot = engine.counters();
        let heat = aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary();

        let stats = SessionStats {
            duration: start_time.elapsed(),
            total: snapshot.total,
            completed: snapshot.completed,
            busy: snapshot.busy,
            active_sinks,
            heat,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.2}", stats.throughput()),
            "Session shutdown complete"
        );

        Ok(stats)
    }
}
