//! 事件分发指标模块
//!
//! 将 Dispatcher 的计数快照发布到 `metrics` facade，并在内存中聚合每步事件统计。

use std::fmt;

use dispatcher::MetricsSnapshot;
use metrics::{counter, gauge, histogram};

/// 发布分发计数快照
///
/// 计数器为累计值，只增加与上一次快照的差值。
///
/// ```ignore
/// let before = logs.dispatcher().metrics();
/// // ... post events ...
/// record_dispatch_summary(&before, &logs.dispatcher().metrics());
/// ```
pub fn record_dispatch_summary(previous: &MetricsSnapshot, current: &MetricsSnapshot) {
    counter!("polyworld_logs_events_posted_total")
        .increment(current.posted_count.saturating_sub(previous.posted_count));
    counter!("polyworld_logs_events_filtered_total")
        .increment(current.filtered_count.saturating_sub(previous.filtered_count));
    counter!("polyworld_logs_deliveries_total", "status" => "success")
        .increment(current.delivered_count.saturating_sub(previous.delivered_count));
    counter!("polyworld_logs_deliveries_total", "status" => "failure")
        .increment(current.failure_count.saturating_sub(previous.failure_count));

    gauge!("polyworld_logs_filtered_ratio").set(filtered_ratio(current));
}

/// 记录 logger 启用状态 (1 = enabled)
pub fn record_logger_enabled(logger: &'static str, enabled: bool) {
    gauge!("polyworld_logs_logger_enabled", "logger" => logger).set(if enabled { 1.0 } else { 0.0 });
}

/// 记录单步事件数
pub fn record_step_events(events: u64) {
    histogram!("polyworld_logs_step_events").record(events as f64);
}

/// 被掩码过滤的事件比例
pub fn filtered_ratio(snapshot: &MetricsSnapshot) -> f64 {
    if snapshot.posted_count == 0 {
        0.0
    } else {
        snapshot.filtered_count as f64 / snapshot.posted_count as f64
    }
}

/// 运行指标聚合器
///
/// 在内存中按步聚合事件数，便于回放结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    /// 已结束的步数
    pub steps: u64,
    /// 每步事件数统计
    pub step_events: RunningStats,
    /// 最后一次分发快照
    pub last: MetricsSnapshot,
}

impl RunMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 一步结束时调用
    pub fn end_step(&mut self, events: u64) {
        self.steps += 1;
        self.step_events.push(events as f64);
    }

    /// 更新分发快照
    pub fn update(&mut self, snapshot: MetricsSnapshot) {
        self.last = snapshot;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            steps: self.steps,
            posted: self.last.posted_count,
            filtered: self.last.filtered_count,
            delivered: self.last.delivered_count,
            failures: self.last.failure_count,
            filtered_ratio: filtered_ratio(&self.last),
            step_events: StatsSummary::from(&self.step_events),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub steps: u64,
    pub posted: u64,
    pub filtered: u64,
    pub delivered: u64,
    pub failures: u64,
    pub filtered_ratio: f64,
    pub step_events: StatsSummary,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(
            f,
            "Events posted: {} (filtered {:.2}%)",
            self.posted,
            self.filtered_ratio * 100.0
        )?;
        writeln!(f, "Deliveries: {} ok, {} failed", self.delivered, self.failures)?;
        writeln!(f, "Events per step: {}", self.step_events)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.0}, max={:.0}, mean={:.2} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

/// 在线均值/极值
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_filtered_ratio() {
        assert_eq!(filtered_ratio(&MetricsSnapshot::default()), 0.0);
        let snapshot = MetricsSnapshot {
            posted_count: 4,
            filtered_count: 1,
            ..Default::default()
        };
        assert!((filtered_ratio(&snapshot) - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = RunMetricsAggregator::new();
        aggregator.end_step(3);
        aggregator.end_step(5);
        aggregator.update(MetricsSnapshot {
            posted_count: 8,
            filtered_count: 2,
            lookup_count: 6,
            delivered_count: 9,
            failure_count: 0,
        });

        let output = aggregator.summary().to_string();
        assert!(output.contains("Steps: 2"));
        assert!(output.contains("filtered 25.00%"));
        assert!(output.contains("mean=4.00 (n=2)"));
    }

    #[test]
    fn test_record_without_recorder() {
        // No global recorder installed: calls are no-ops
        record_dispatch_summary(&MetricsSnapshot::default(), &MetricsSnapshot::default());
        record_logger_enabled("CarryLog", true);
        record_step_events(3);
    }
}
