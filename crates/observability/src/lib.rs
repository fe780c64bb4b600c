//! # Observability
//!
//! 可观测性模块：Tracing 订阅器 + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化：日志写入 stderr，stdout 留给命令输出
//! - 详细程度 (`-v`/`-q`) → 日志级别映射，`RUST_LOG` 优先
//! - Prometheus 指标导出 (可选)
//! - Dispatcher 计数快照发布与每步事件统计
//!
//! ## 使用示例
//!
//! ```ignore
//! let config = ObservabilityConfig::for_verbosity(1, false).with_log_format(LogFormat::Compact);
//! observability::init(&config)?;
//!
//! // 回放过程中发布分发计数
//! metrics::record_dispatch_summary(&previous, &logs.dispatcher().metrics());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    filtered_ratio, record_dispatch_summary, record_logger_enabled, record_step_events,
    MetricsSummary, RunMetricsAggregator, RunningStats, StatsSummary,
};

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    Json,
    /// 人类可读格式
    #[default]
    Pretty,
    /// 紧凑单行格式
    Compact,
}

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// `RUST_LOG` 未设置时使用的级别
    pub default_log_level: &'static str,
    /// 为 true 时忽略 `RUST_LOG` (对应 `--quiet`)
    pub ignore_env: bool,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::for_verbosity(0, false)
    }
}

impl ObservabilityConfig {
    /// `-v` 计数与 `--quiet` 映射到日志级别
    pub fn for_verbosity(verbose: u8, quiet: bool) -> Self {
        let default_log_level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            log_format: LogFormat::default(),
            default_log_level,
            ignore_env: quiet,
            metrics_port: None,
        }
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// 端口 0 视为禁用
    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = (port != 0).then_some(port);
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if self.ignore_env {
            return EnvFilter::new(self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_log_level))
    }
}

/// 安装全局 Tracing 订阅器，并按需启动 Prometheus 导出
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = config.default_log_level,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );
    Ok(())
}

/// 启动 Prometheus HTTP 导出并注册为全局 recorder
pub fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}
