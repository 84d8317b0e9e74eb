//! FileSink - appends timestamped counter samples to a CSV file

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use contracts::{ContractError, CounterSink};
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output CSV path
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map; `path` is required
    pub fn from_params(params: &HashMap<String, String>) -> Option<Self> {
        params.get("path").map(|p| Self {
            path: PathBuf::from(p),
        })
    }
}

/// Sink that appends counter samples to disk for offline analysis
///
/// Each sample is written as a `timestamp_ms,value` line; the header is
/// written when the file is created fresh.
pub struct FileSink {
    name: String,
    file: File,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let fresh = !config.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;
        if fresh {
            writeln!(file, "timestamp_ms,value")?;
        }

        Ok(Self {
            name: name.into(),
            file,
        })
    }

    /// Create from params map (for the sink factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileSinkConfig::from_params(params)
            .ok_or_else(|| ContractError::sink_creation(&name, "missing required param 'path'"))?;
        Self::new(name, config).map_err(ContractError::Io)
    }

    fn append_sample(&mut self, value: u64) -> std::io::Result<()> {
        writeln!(self.file, "{},{}", Utc::now().timestamp_millis(), value)
    }
}

impl CounterSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_display",
        skip(self),
        fields(sink = %self.name)
    )]
    async fn display(&mut self, value: u64) -> Result<(), ContractError> {
        self.append_sample(value)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.file
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
