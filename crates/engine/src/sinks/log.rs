//! LogSink - displays counter samples via tracing

use contracts::{ContractError, CounterKind, CounterSink};
use tracing::{info, instrument};

/// Sink that logs counter samples for debugging
pub struct LogSink {
    name: String,
    counter: CounterKind,
}

impl LogSink {
    /// Create a new LogSink for the given counter
    pub fn new(name: impl Into<String>, counter: CounterKind) -> Self {
        Self {
            name: name.into(),
            counter,
        }
    }
}

impl CounterSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_display",
        skip(self),
        fields(sink = %self.name, counter = %self.counter)
    )]
    async fn display(&mut self, value: u64) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            counter = %self.counter,
            value,
            "Counter sample"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
