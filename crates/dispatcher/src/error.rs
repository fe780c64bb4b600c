//! Dispatcher error types

use std::path::{Path, PathBuf};

use contracts::{EventKind, EventKinds};
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Same (logger, kind) pair registered twice
    #[error("logger '{logger}' registered twice for {kind}")]
    DuplicateRegistration { logger: String, kind: EventKind },

    /// Registration for a kind the logger declares no handler for
    #[error("logger '{logger}' registered for {kinds} but handles only {handles}")]
    UnhandledKind {
        logger: String,
        kinds: EventKinds,
        handles: EventKinds,
    },

    /// Event delivered to a logger with no handler arm for its kind
    #[error("logger '{logger}' has no handler for {kind}")]
    UnexpectedKind { logger: String, kind: EventKind },

    /// Unsigned value that does not fit an int column
    #[error("value {value} does not fit an int column")]
    IntOutOfRange { value: u64 },

    /// Install or register after dispatch has begun
    #[error("registration closed, cannot register logger '{logger}'")]
    RegistrationClosed { logger: String },

    /// Logger id not known to this dispatcher
    #[error("unknown logger id {0}")]
    UnknownLogger(usize),

    /// Sink creation error
    #[error("failed to open sink '{name}' at {}: {source}", path.display())]
    SinkOpen {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write to a sink that was already closed
    #[error("sink '{name}' is closed")]
    SinkClosed { name: String },

    /// Table schema violated
    #[error("table '{table}': {message}")]
    Schema { table: String, message: String },

    /// Logger-specific initialization failure
    #[error("logger '{logger}' init failed: {message}")]
    Init { logger: String, message: String },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Create a sink open error
    pub fn sink_open(name: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::SinkOpen {
            name: name.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a schema error
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected kind error
    pub fn unexpected_kind(logger: impl Into<String>, kind: EventKind) -> Self {
        Self::UnexpectedKind {
            logger: logger.into(),
            kind,
        }
    }

    /// Create an init error
    pub fn init(logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Init {
            logger: logger.into(),
            message: message.into(),
        }
    }
}
