//! CounterSink trait - counter display interface
//!
//! A sink is a write-only numeric display collaborator: the engine pushes
//! counter values at it and never reads anything back.

use crate::ContractError;

/// Counter display trait
///
/// All sink implementations must implement this trait. A sink receives the
/// latest value of exactly one counter; samples are momentary, so
/// implementations may assume a dropped sample is superseded by the next one.
#[trait_variant::make(CounterSink: Send)]
pub trait LocalCounterSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Display a counter value
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn display(&mut self, value: u64) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
