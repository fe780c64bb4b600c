//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Malformed line in an event script
    #[error("{path}:{line}: invalid event: {message}")]
    ScriptParse {
        path: String,
        line: usize,
        message: String,
    },

    /// Event referring to an agent the script never created
    #[error("{path}:{line}: unknown agent {agent}")]
    UnknownAgent {
        path: String,
        line: usize,
        agent: u64,
    },

    /// Requested table absent from the file
    #[error("no table '{name}' in {path}")]
    TableNotFound { name: String, path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn script_parse(path: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::ScriptParse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
