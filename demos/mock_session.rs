//! Mock Session Demo
//!
//! Runs a complete load session against a mock transport, so no target
//! service is required. Counter updates land in log sinks.
//!
//! Run with: cargo run --bin mock_session

use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{CounterKind, SinkConfig, SinkType};
use engine::{create_sink_handle, Engine};
use probe::MockProbe;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Session Demo");

    // ==== Stage 1: Use default plan or load from file ====
    let plan = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading plan");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal demo plan
        create_demo_plan()
    };

    // ==== Stage 2: Build engine over the mock transport ====
    let mock = MockProbe::instant();
    let engine = Engine::new(mock.clone());

    engine.brief(
        &plan.target.url,
        &plan.target.message,
        plan.fire.rate_per_second as f64,
    );
    engine.set_capacity(plan.fire.capacity);

    tracing::info!(
        target = %engine.target(),
        rate = engine.rate(),
        capacity = engine.capacity(),
        "Engine configured"
    );

    // ==== Stage 3: Bind display sinks ====
    for sink_config in &plan.sinks {
        let handle = create_sink_handle(sink_config)?;
        engine.bind(sink_config.counter, Some(handle));
        tracing::info!(sink = %sink_config.name, "Sink bound");
    }

    // ==== Stage 4: Fire for a few seconds ====
    tracing::info!("Firing...");
    engine.start();
    tokio::time::sleep(Duration::from_secs(3)).await;
    engine.stop();

    // ==== Stage 5: Report and cleanup ====
    let snapshot = engine.counters();
    tracing::info!(
        launched = snapshot.total,
        completed = snapshot.completed,
        outstanding = snapshot.busy,
        dispatched = mock.fired_count(),
        "Session finished"
    );

    engine.close_sinks().await;

    Ok(())
}

fn create_demo_plan() -> contracts::LoadPlan {
    use contracts::*;
    use std::collections::HashMap;

    LoadPlan {
        version: PlanVersion::V1,
        target: TargetConfig {
            url: "http://localhost:8080/health".to_string(),
            message: "demo".to_string(),
        },
        fire: FireConfig {
            rate_per_second: 20,
            capacity: 100,
        },
        run: RunConfig {
            duration_secs: 3,
            drain_grace_secs: 2,
        },
        sinks: vec![
            SinkConfig {
                name: "heat_log".to_string(),
                counter: CounterKind::Heat,
                sink_type: SinkType::Log,
                queue_capacity: 16,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "busy_log".to_string(),
                counter: CounterKind::Busy,
                sink_type: SinkType::Log,
                queue_capacity: 16,
                params: HashMap::new(),
            },
        ],
    }
}
