//! Session statistics.

use std::time::Duration;

use observability::HeatSummary;

/// Statistics from a load session run
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Total probes launched
    pub total: u64,

    /// Total probes completed
    pub completed: u64,

    /// Probes still outstanding at shutdown
    pub busy: u64,

    /// Total duration of the session
    pub duration: Duration,

    /// Number of sinks configured in the plan
    pub active_sinks: usize,

    /// Heat window aggregation
    pub heat: HeatSummary,
}

impl SessionStats {
    /// Calculate completions per second over the whole session
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.completed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate completion rate as percentage
    #[allow(dead_code)]
    pub fn completion_rate(&self) -> f64 {
        if self.total > 0 {
            (self.completed as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Session Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Probes launched: {}", self.total);
        println!("   ├─ Probes completed: {}", self.completed);
        println!("   ├─ Outstanding at shutdown: {}", self.busy);
        println!("   ├─ Throughput: {:.2}/s", self.throughput());
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Heat Windows");
        println!("   ├─ Windows sampled: {}", self.heat.windows);
        println!("   ├─ Completions/sec: {}", self.heat.heat);
        println!("   └─ Peak busy: {}", self.heat.peak_busy);

        println!();
    }
}
