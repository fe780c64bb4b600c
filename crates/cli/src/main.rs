//! # Logs CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 事件脚本回放 (被动驱动 loggers)
//! - 产物查看 (record 文件 / 表格日志)

mod cli;
mod commands;
mod error;
mod script;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_cat, run_info, run_replay, run_table, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Logs CLI starting");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Replay(args) => run_replay(args),
        Commands::Cat(args) => run_cat(args),
        Commands::Table(args) => run_table(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let config = ObservabilityConfig::for_verbosity(cli.verbose, cli.quiet)
        .with_log_format(cli.log_format.clone().into());
    observability::init(&config)
}
