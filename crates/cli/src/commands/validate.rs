//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PlanSummary>,
}

#[derive(Serialize)]
struct PlanSummary {
    version: String,
    target: String,
    rate_per_second: u64,
    capacity: u64,
    duration_secs: u64,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating plan");

    let result = validate_plan(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Plan validation failed")
    }
}

fn validate_plan(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(PlanSummary {
                    version: format!("{:?}", plan.version),
                    target: plan.target.url.clone(),
                    rate_per_second: plan.fire.rate_per_second,
                    capacity: plan.fire.capacity,
                    duration_secs: plan.run.duration_secs,
                    sink_count: plan.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect plan warnings (non-fatal issues)
fn collect_warnings(plan: &contracts::LoadPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    if plan.sinks.is_empty() {
        warnings.push("No sinks configured - counter updates stay internal".to_string());
    }

    if plan.fire.rate_per_second == 0 {
        warnings.push(
            "fire.rate_per_second is 0 - the engine fires at the minimum 1ms tick period"
                .to_string(),
        );
    }

    if plan.run.duration_secs == 0 {
        warnings.push("run.duration_secs is 0 - session runs until Ctrl+C".to_string());
    }

    if plan.fire.capacity == 0 {
        warnings.push("fire.capacity is 0 - falls back to the default of 1000".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Plan is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Target: {}", summary.target);
            println!("  Rate: {}/s", summary.rate_per_second);
            println!("  Capacity: {}", summary.capacity);
            println!("  Duration: {}s", summary.duration_secs);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Plan is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
