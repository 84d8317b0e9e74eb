//! Probe error types

use thiserror::Error;

/// Probe construction errors
///
/// Dispatching a probe never fails by contract; only building the
/// underlying client can.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// HTTP client construction error
    #[error("failed to build http client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}
