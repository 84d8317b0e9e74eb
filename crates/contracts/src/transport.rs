//! Transport trait - probe dispatch abstraction
//!
//! Decouples the engine's firing loop from the concrete HTTP client, and
//! lets tests substitute a controllable mock.

/// Probe transport trait
///
/// A transport dispatches one fire-and-forget GET-style probe and resolves
/// when the probe has run its course. The three transport-level outcomes
/// (success, protocol error, abort) are intentionally collapsed: `probe`
/// returns `()` on all of them, so the caller only ever observes "completed".
/// Dispatch itself never fails synchronously.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Dispatch one probe and resolve on any outcome
    async fn probe(&self, url: &str);
}
