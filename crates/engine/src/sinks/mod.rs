//! Sink implementations
//!
//! Contains LogSink, FileSink, GaugeSink and ChannelSink.

mod channel;
mod file;
mod gauge;
mod log;

pub use self::channel::ChannelSink;
pub use self::file::FileSink;
pub use self::gauge::GaugeSink;
pub use self::log::LogSink;

use contracts::{SinkConfig, SinkType};
use tracing::instrument;

use crate::error::EngineError;
use crate::handle::SinkHandle;

/// Create a running SinkHandle from configuration
#[instrument(
    name = "engine_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type, counter = %config.counter)
)]
pub fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, EngineError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name, config.counter);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| EngineError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Gauge => {
            let sink = GaugeSink::from_params(&config.name, config.counter, &config.params);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CounterKind;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_create_log_sink_handle() {
        let config = SinkConfig {
            name: "busy_log".to_string(),
            counter: CounterKind::Busy,
            sink_type: SinkType::Log,
            queue_capacity: 8,
            params: HashMap::new(),
        };

        let handle = create_sink_handle(&config).unwrap();
        assert_eq!(handle.name(), "busy_log");
        assert!(handle.try_send(1));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_create_file_sink_requires_path() {
        let config = SinkConfig {
            name: "samples".to_string(),
            counter: CounterKind::Total,
            sink_type: SinkType::File,
            queue_capacity: 8,
            params: HashMap::new(),
        };

        let result = create_sink_handle(&config);
        assert!(matches!(result, Err(EngineError::SinkCreation { .. })));
    }
}
