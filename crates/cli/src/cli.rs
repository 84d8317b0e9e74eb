//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Volley - rate-limited HTTP load session engine
#[derive(Parser, Debug)]
#[command(
    name = "volley",
    author,
    version,
    about = "Rate-limited HTTP load sessions with liveness counters",
    long_about = "A rate-limited HTTP GET load engine for exercising your own services.\n\n\
                  Loads a session plan, fires probes at the configured cadence under a \n\
                  concurrency cap, and reports per-second throughput alongside the \n\
                  launched / completed / in-flight counters."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VOLLEY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VOLLEY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a load session
    Run(RunArgs),

    /// Validate a plan file without running
    Validate(ValidateArgs),

    /// Display plan information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to plan file (TOML or JSON)
    #[arg(short, long, default_value = "plan.toml", env = "VOLLEY_PLAN")]
    pub config: PathBuf,

    /// Override target URL from the plan
    #[arg(long, env = "VOLLEY_TARGET")]
    pub target: Option<String>,

    /// Override probe message from the plan
    #[arg(long, env = "VOLLEY_MESSAGE")]
    pub message: Option<String>,

    /// Override fire rate in probes per second
    #[arg(long, env = "VOLLEY_RATE")]
    pub rate: Option<f64>,

    /// Override in-flight capacity (0 or junk falls back to the default)
    #[arg(long, env = "VOLLEY_CAPACITY")]
    pub capacity: Option<String>,

    /// Session duration in seconds (0 = run until Ctrl+C)
    #[arg(long, env = "VOLLEY_DURATION")]
    pub duration: Option<u64>,

    /// Validate the plan and exit without firing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "VOLLEY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to plan file to validate
    #[arg(short, long, default_value = "plan.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to plan file
    #[arg(short, long, default_value = "plan.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
