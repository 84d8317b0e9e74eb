//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Counter Model
//! - `total`, `completed` and `heat` are plain monotonic counts
//! - `busy` is always derived as `total - completed`, never stored

mod counter;
mod error;
mod plan;
mod sink;
mod transport;

pub use counter::*;
pub use error::*;
pub use plan::*;
pub use sink::*;
pub use transport::*;
