//! # Contracts
//!
//! Frozen interface contracts shared by the engine, the dispatcher and the loggers.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every event carries the simulation timestep (u64) it belongs to
//! - Timesteps are monotonically non-decreasing across posted events

mod config;
mod error;
mod event;
mod sim;

pub use config::*;
pub use error::*;
pub use event::*;
pub use sim::*;
