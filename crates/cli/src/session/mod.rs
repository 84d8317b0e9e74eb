//! Load session orchestration and statistics.

mod runner;
mod stats;

pub use runner::{Session, SessionConfig};
pub use stats::SessionStats;
