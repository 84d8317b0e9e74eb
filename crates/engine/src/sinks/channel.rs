//! ChannelSink - forwards counter samples to an in-process consumer
//!
//! Used by the CLI session to aggregate heat samples and by tests to
//! observe exactly what the engine pushes.

use contracts::{ContractError, CounterSink};
use tokio::sync::mpsc;
use tracing::instrument;

/// Sink that forwards samples over an mpsc channel
pub struct ChannelSink {
    name: String,
    tx: mpsc::Sender<u64>,
}

impl ChannelSink {
    /// Create a sink writing into an existing sender
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<u64>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }

    /// Create a sink together with its receiving end
    pub fn pair(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<u64>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(name, tx), rx)
    }
}

impl CounterSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "channel_sink_display",
        skip(self),
        fields(sink = %self.name)
    )]
    async fn display(&mut self, value: u64) -> Result<(), ContractError> {
        self.tx
            .send(value)
            .await
            .map_err(|_| ContractError::sink_write(&self.name, "receiver closed"))
    }

    #[instrument(name = "channel_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
