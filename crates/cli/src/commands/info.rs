//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Plan info for JSON output
#[derive(Serialize)]
struct PlanInfo {
    version: String,
    target: TargetInfo,
    fire: FireInfo,
    run: RunInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct TargetInfo {
    url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
}

#[derive(Serialize)]
struct FireInfo {
    rate_per_second: u64,
    capacity: u64,
}

#[derive(Serialize)]
struct RunInfo {
    duration_secs: u64,
    drain_grace_secs: u64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    counter: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading plan info");

    if !args.config.exists() {
        anyhow::bail!("Plan file not found: {}", args.config.display());
    }

    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load plan from {}", args.config.display()))?;

    if args.json {
        let info = build_plan_info(&plan, args);
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize plan info")?;
        println!("{}", json);
    } else {
        print_plan_info(&plan, args);
    }

    Ok(())
}

fn build_plan_info(plan: &contracts::LoadPlan, args: &InfoArgs) -> PlanInfo {
    let sinks = if args.sinks {
        plan.sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                counter: s.counter.to_string(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    PlanInfo {
        version: format!("{:?}", plan.version),
        target: TargetInfo {
            url: plan.target.url.clone(),
            message: plan.target.message.clone(),
        },
        fire: FireInfo {
            rate_per_second: plan.fire.rate_per_second,
            capacity: plan.fire.capacity,
        },
        run: RunInfo {
            duration_secs: plan.run.duration_secs,
            drain_grace_secs: plan.run.drain_grace_secs,
        },
        sinks,
    }
}

fn print_plan_info(plan: &contracts::LoadPlan, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Volley Plan                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Target info
    println!("🎯 Target");
    println!("   ├─ Version: {:?}", plan.version);
    println!("   ├─ URL: {}", plan.target.url);
    if plan.target.message.is_empty() {
        println!("   └─ Message: (none)");
    } else {
        println!("   └─ Message: {}", plan.target.message);
    }

    // Fire settings
    println!("\n🔥 Fire Settings");
    println!("   ├─ Rate: {}/s", plan.fire.rate_per_second);
    println!("   └─ Capacity: {}", plan.fire.capacity);

    // Run settings
    println!("\n⏱  Run Settings");
    if plan.run.duration_secs == 0 {
        println!("   ├─ Duration: until Ctrl+C");
    } else {
        println!("   ├─ Duration: {}s", plan.run.duration_secs);
    }
    println!("   └─ Drain grace: {}s", plan.run.drain_grace_secs);

    // Sinks
    if args.sinks && !plan.sinks.is_empty() {
        println!("\n📤 Sinks ({})", plan.sinks.len());
        for (i, sink) in plan.sinks.iter().enumerate() {
            let is_last = i == plan.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?} -> {})",
                prefix, sink.name, sink.sink_type, sink.counter
            );
        }
    } else if !plan.sinks.is_empty() {
        println!("\n📤 Sinks: {} configured (--sinks for details)", plan.sinks.len());
    }

    println!();
}
