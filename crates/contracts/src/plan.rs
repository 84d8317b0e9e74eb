//! LoadPlan - Config Loader output
//!
//! Describes a complete load session: target, firing cadence, run bounds
//! and counter display routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::CounterKind;

/// Plan schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanVersion {
    #[default]
    V1,
}

/// Complete load session plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoadPlan {
    /// Plan schema version
    #[serde(default)]
    pub version: PlanVersion,

    /// Target settings
    #[validate(nested)]
    pub target: TargetConfig,

    /// Firing cadence settings
    #[serde(default)]
    pub fire: FireConfig,

    /// Run bounds
    #[serde(default)]
    pub run: RunConfig,

    /// Counter display routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Target configuration: where probes are aimed
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    /// Probe URL; the probe id (and optional message) is appended as a
    /// query-like suffix at dispatch time
    #[validate(url)]
    pub url: String,

    /// Optional message appended to every probe URL
    #[serde(default)]
    pub message: String,
}

/// Firing cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireConfig {
    /// Maximum probes launched per second (0 = unthrottled tick, clamped
    /// to a 1ms period)
    #[serde(default)]
    pub rate_per_second: u64,

    /// Maximum outstanding probes; 0 falls back to the engine default
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 0,
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> u64 {
    1000
}

/// Run bounds configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Session duration in seconds (0 = run until interrupted)
    #[serde(default)]
    pub duration_secs: u64,

    /// How long to wait for outstanding probes after stop
    #[serde(default = "default_drain_grace_secs")]
    pub drain_grace_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: 0,
            drain_grace_secs: default_drain_grace_secs(),
        }
    }
}

fn default_drain_grace_secs() -> u64 {
    5
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkType {
    /// Log counter samples via tracing
    Log,
    /// Append timestamped counter samples to a CSV file
    File,
    /// Publish counter samples as a metrics gauge
    Gauge,
}

/// One counter display route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (used for logging and error context)
    pub name: String,

    /// Which counter this sink displays
    pub counter: CounterKind,

    /// Sink implementation
    pub sink_type: SinkType,

    /// Sample queue capacity; overflow samples are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink specific parameters (e.g. `path` for file sinks)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    32
}
