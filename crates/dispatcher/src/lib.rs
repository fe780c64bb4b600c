//! # Dispatcher
//!
//! Event registry and fan-out module.
//!
//! Responsibilities:
//! - Keep the kind → subscriber registry built at startup
//! - Reject unwanted kinds with a single mask test
//! - Deliver wanted kinds synchronously, in registration order
//! - Provide the sink adapters loggers write through

pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod sinks;

pub use contracts::{Event, EventKind, EventKinds};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use logger::{Activation, Logger, LoggerId, LoggerState};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use sinks::{
    Column, ColumnType, RecordFile, RotatingTextFiles, Table, TableSink, TextSink, Value,
};
