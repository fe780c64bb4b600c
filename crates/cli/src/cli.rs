//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Logs CLI - run and inspect simulation event logs
#[derive(Parser, Debug)]
#[command(
    name = "logs-cli",
    author,
    version,
    about = "Simulation event logging toolkit",
    long_about = "Validates logging configuration, replays recorded event scripts through \n\
                  the loggers, and prints the artifacts they produce, whether plain \n\
                  or gzip compressed."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGS_CLI_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGS_CLI_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a logging configuration file
    Validate(ValidateArgs),

    /// Show which loggers a configuration enables
    Info(InfoArgs),

    /// Feed a JSON-lines event script through the loggers
    Replay(ReplayArgs),

    /// Print a record file, decompressing if needed
    Cat(CatArgs),

    /// Parse and print the tables of a tabular log
    Table(TableArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logs.toml", env = "LOGS_CLI_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "logs.toml", env = "LOGS_CLI_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logs.toml", env = "LOGS_CLI_CONFIG")]
    pub config: PathBuf,

    /// Run directory the logs are written to
    #[arg(short, long, default_value = "run", env = "LOGS_CLI_RUN_DIR")]
    pub run_dir: PathBuf,

    /// Event script, one JSON event per line
    #[arg(short, long)]
    pub events: PathBuf,

    /// Genes per genome
    #[arg(long, default_value = "16")]
    pub genome_len: usize,

    /// Energy types tracked per agent
    #[arg(long, default_value = "1")]
    pub energy_types: usize,

    /// Stop at the first event a logger fails on
    #[arg(long)]
    pub fail_fast: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGS_CLI_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `cat` command
#[derive(Parser, Debug)]
pub struct CatArgs {
    /// Record file to print
    pub path: PathBuf,
}

/// Arguments for the `table` command
#[derive(Parser, Debug)]
pub struct TableArgs {
    /// Tabular log file
    pub path: PathBuf,

    /// Print only this table
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
