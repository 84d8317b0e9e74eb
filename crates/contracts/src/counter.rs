//! Counter model shared between the engine and its consumers.

use serde::{Deserialize, Serialize};

/// The four counters the engine exposes for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    /// Probes launched within the current 1-second window
    Heat,
    /// Probes launched since the last clear
    Total,
    /// Probes that signalled completion (any outcome)
    Completed,
    /// Outstanding probes: `total - completed`
    Busy,
}

impl CounterKind {
    /// All kinds, in display order
    pub const ALL: [CounterKind; 4] = [
        CounterKind::Heat,
        CounterKind::Total,
        CounterKind::Completed,
        CounterKind::Busy,
    ];

    /// Stable lowercase label (used for logging, metrics and config)
    pub fn label(&self) -> &'static str {
        match self {
            CounterKind::Heat => "heat",
            CounterKind::Total => "total",
            CounterKind::Completed => "completed",
            CounterKind::Busy => "busy",
        }
    }
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time readout of all engine counters.
///
/// `busy` is recomputed at snapshot time, so `busy == total - completed`
/// holds by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Probes launched since the last clear
    pub total: u64,
    /// Probes completed (success, error and abort all count)
    pub completed: u64,
    /// Outstanding probes
    pub busy: u64,
    /// Probes launched in the current heat window
    pub heat: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_kind_labels() {
        assert_eq!(CounterKind::Heat.label(), "heat");
        assert_eq!(CounterKind::Busy.to_string(), "busy");
        assert_eq!(CounterKind::ALL.len(), 4);
    }

    #[test]
    fn test_counter_kind_serde_lowercase() {
        let json = serde_json::to_string(&CounterKind::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let kind: CounterKind = serde_json::from_str("\"heat\"").unwrap();
        assert_eq!(kind, CounterKind::Heat);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = CounterSnapshot {
            total: 10,
            completed: 4,
            busy: 6,
            heat: 2,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"busy\":6"));
    }
}
