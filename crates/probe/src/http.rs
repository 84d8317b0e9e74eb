//! HttpProbe - fire-and-forget HTTP GET transport

use std::time::Duration;

use contracts::Transport;
use tracing::trace;

use crate::error::ProbeError;

/// Configuration for HttpProbe
#[derive(Debug, Clone, Default)]
pub struct HttpProbeConfig {
    /// Per-request timeout. None means a probe against an unresponsive
    /// target may never complete; it then occupies a busy slot until the
    /// connection dies, which is the documented stall behavior.
    pub timeout: Option<Duration>,
}

/// Transport that issues real HTTP GET probes
///
/// The response is ignored entirely: status, headers and body are all
/// irrelevant, only the fact that the request ran its course matters.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Create a probe client with default configuration
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_config(HttpProbeConfig::default())
    }

    /// Create a probe client with custom configuration
    pub fn with_config(config: HttpProbeConfig) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpProbe {
    async fn probe(&self, url: &str) {
        // All outcomes collapse into completion; the distinction only
        // exists at trace level for debugging.
        match self.client.get(url).send().await {
            Ok(response) => {
                trace!(url = %url, status = %response.status(), "Probe completed");
            }
            Err(e) => {
                trace!(url = %url, error = %e, "Probe completed with transport error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_probe_builds() {
        assert!(HttpProbe::new().is_ok());
        assert!(HttpProbe::with_config(HttpProbeConfig {
            timeout: Some(Duration::from_secs(2)),
        })
        .is_ok());
    }

    #[tokio::test]
    async fn test_probe_completes_on_connection_error() {
        // Nothing listens on this port; the probe must still resolve.
        let probe = HttpProbe::with_config(HttpProbeConfig {
            timeout: Some(Duration::from_millis(500)),
        })
        .unwrap();
        probe.probe("http://127.0.0.1:1/x?1").await;
    }
}
