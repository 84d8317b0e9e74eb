//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::session::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading plan");

    // Validate plan path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse plan
    let mut plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load plan from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref target) = args.target {
        info!(target = %target, "Overriding target from CLI");
        plan.target.url = target.clone();
    }
    if let Some(ref message) = args.message {
        info!(message = %message, "Overriding message from CLI");
        plan.target.message = message.clone();
    }
    if let Some(rate) = args.rate {
        info!(rate = rate, "Overriding fire rate from CLI");
        plan.fire.rate_per_second = if rate.is_finite() && rate >= 1.0 {
            rate.floor() as u64
        } else {
            0
        };
    }
    if let Some(ref capacity) = args.capacity {
        let parsed = engine::capacity_from_str(capacity);
        info!(capacity = parsed, "Overriding capacity from CLI");
        plan.fire.capacity = parsed;
    }
    if let Some(duration) = args.duration {
        info!(duration_secs = duration, "Overriding duration from CLI");
        plan.run.duration_secs = duration;
    }

    info!(
        target = %plan.target.url,
        rate = plan.fire.rate_per_second,
        capacity = plan.fire.capacity,
        duration_secs = plan.run.duration_secs,
        sinks = plan.sinks.len(),
        "Plan loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - plan is valid, exiting");
        print_plan_summary(&plan);
        return Ok(());
    }

    // Build session configuration
    let session_config = SessionConfig {
        duration: if plan.run.duration_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(plan.run.duration_secs))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        plan,
    };

    // Create and run session
    let session = Session::new(session_config);

    info!("Starting load session...");

    match session.run(setup_shutdown_signal()).await {
        Ok(stats) => {
            info!(
                launched = stats.total,
                completed = stats.completed,
                outstanding = stats.busy,
                duration_secs = stats.duration.as_secs_f64(),
                throughput = format!("{:.2}", stats.throughput()),
                "Session completed"
            );

            // Print detailed statistics
            stats.print_summary();
        }
        Err(e) => {
            return Err(e).context("Session execution failed");
        }
    }

    info!("Volley finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print plan summary for dry-run mode
fn print_plan_summary(plan: &contracts::LoadPlan) {
    println!("\n=== Plan Summary ===\n");
    println!("Target:");
    println!("  URL: {}", plan.target.url);
    if !plan.target.message.is_empty() {
        println!("  Message: {}", plan.target.message);
    }
    println!("\nFire:");
    println!("  Rate: {}/s", plan.fire.rate_per_second);
    println!("  Capacity: {}", plan.fire.capacity);
    println!("\nRun:");
    if plan.run.duration_secs == 0 {
        println!("  Duration: until Ctrl+C");
    } else {
        println!("  Duration: {}s", plan.run.duration_secs);
    }
    println!("  Drain grace: {}s", plan.run.drain_grace_secs);

    if !plan.sinks.is_empty() {
        println!("\nSinks ({}):", plan.sinks.len());
        for sink in &plan.sinks {
            println!("  - {} ({:?} -> {})", sink.name, sink.sink_type, sink.counter);
        }
    }

    println!();
}
