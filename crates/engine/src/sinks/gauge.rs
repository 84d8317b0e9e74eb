//! GaugeSink - publishes counter samples through the metrics facade

use std::collections::HashMap;

use contracts::{ContractError, CounterKind, CounterSink};
use metrics::gauge;
use tracing::{debug, instrument};

/// Sink that mirrors one counter into a metrics gauge
///
/// The gauge name defaults to `volley_counter_<counter>` and can be
/// overridden with the `gauge` param. Whether anything scrapes it depends
/// on the recorder installed by the host (e.g. the Prometheus exporter).
pub struct GaugeSink {
    name: String,
    gauge_name: String,
}

impl GaugeSink {
    /// Create a new GaugeSink with an explicit gauge name
    pub fn new(name: impl Into<String>, gauge_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gauge_name: gauge_name.into(),
        }
    }

    /// Create from params map (for the sink factory)
    pub fn from_params(
        name: impl Into<String>,
        counter: CounterKind,
        params: &HashMap<String, String>,
    ) -> Self {
        let gauge_name = params
            .get("gauge")
            .cloned()
            .unwrap_or_else(|| format!("volley_counter_{}", counter.label()));
        Self::new(name, gauge_name)
    }
}

impl CounterSink for GaugeSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "gauge_sink_display",
        skip(self),
        fields(sink = %self.name, gauge = %self.gauge_name)
    )]
    async fn display(&mut self, value: u64) -> Result<(), ContractError> {
        gauge!(self.gauge_name.clone()).set(value as f64);
        Ok(())
    }

    #[instrument(name = "gauge_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "GaugeSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gauge_sink_default_name() {
        let sink = GaugeSink::from_params("busy_gauge", CounterKind::Busy, &HashMap::new());
        assert_eq!(sink.gauge_name, "volley_counter_busy");
    }

    #[tokio::test]
    async fn test_gauge_sink_name_override() {
        let mut params = HashMap::new();
        params.insert("gauge".to_string(), "custom_gauge".to_string());
        let mut sink = GaugeSink::from_params("g", CounterKind::Heat, &params);
        assert_eq!(sink.gauge_name, "custom_gauge");
        // Recording without an installed recorder is a no-op, not an error
        assert!(sink.display(5).await.is_ok());
    }
}
