//! Logger trait - dispatcher output interface
//!
//! A logger converts a fixed subset of event kinds into persisted records.

use std::fmt;

use contracts::{Event, EventKinds, LogsConfig, SimContext};

use crate::error::DispatchError;

/// Identity of an installed logger (its installation index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoggerId(pub(crate) usize);

impl LoggerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of `Logger::init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// No resources were opened; the logger receives nothing
    Disabled,
    /// Sinks are open; register every kind in `Logger::handles`
    Enabled,
}

/// Lifecycle state tracked by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Unconfigured,
    Disabled,
    Enabled,
    Closed,
}

/// Event consumer trait
///
/// All loggers must implement this trait.
pub trait Logger {
    /// Logger name (used for tracing and error messages)
    fn name(&self) -> &'static str;

    /// Kinds this logger has handlers for
    ///
    /// The dispatcher registers exactly this set when the logger is enabled.
    fn handles(&self) -> EventKinds;

    /// Read this logger's configuration section and open sinks if enabled
    ///
    /// # Errors
    /// Sink open failures; these abort simulation startup
    fn init(&mut self, sim: &SimContext, config: &LogsConfig)
        -> Result<Activation, DispatchError>;

    /// Convert one event into records
    ///
    /// Only called for kinds in `handles()`.
    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError>;

    /// Number of output files kept by loggers that roll their sink
    fn max_output_files(&self) -> usize {
        1
    }

    /// Flush and release sinks
    fn close(&mut self) -> Result<(), DispatchError>;
}
