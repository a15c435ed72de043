//! 吞吐指标收集模块
//!
//! 基于 ThroughputSnapshot 收集和统计分发引擎的运行指标。

use contracts::ThroughputSnapshot;
use metrics::{counter, gauge, histogram};

/// 从吞吐快照记录指标
///
/// 上报协作方每次采样时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_throughput;
///
/// record_throughput(&stat.snapshot());
/// ```
pub fn record_throughput(snapshot: &ThroughputSnapshot) {
    // 请求总量（单调递增）
    gauge!("replicast_requests_total").set(snapshot.total_requests as f64);

    // 每秒派发速率
    gauge!("replicast_requests_per_second").set(snapshot.per_second as f64);
    histogram!("replicast_requests_per_second_hist").record(snapshot.per_second as f64);

    // 运行时长
    gauge!("replicast_elapsed_seconds").set(snapshot.elapsed.as_secs_f64());
}

/// 记录单个 sender 的最终结果
pub fn record_sender_outcome(sender: &str, writes: u64, failures: u64, dropped: u64) {
    counter!(
        "replicast_sender_writes_total",
        "sender" => sender.to_string()
    )
    .increment(writes);

    if failures > 0 {
        counter!(
            "replicast_sender_failures_total",
            "sender" => sender.to_string()
        )
        .increment(failures);
    }

    if dropped > 0 {
        counter!(
            "replicast_sender_dropped_total",
            "sender" => sender.to_string()
        )
        .increment(dropped);
    }
}

/// 吞吐指标聚合器
///
/// 在内存中聚合采样值，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ThroughputAggregator {
    /// 最近一次快照
    pub last: ThroughputSnapshot,

    /// 每秒速率统计
    pub rate_stats: RunningStats,
}

impl ThroughputAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, snapshot: &ThroughputSnapshot) {
        // 预热期（尚无完整采样窗口）不计入速率统计
        if snapshot.per_second > 0 || snapshot.total_requests > 0 {
            self.rate_stats.push(snapshot.per_second as f64);
        }
        self.last = *snapshot;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> ThroughputSummary {
        ThroughputSummary {
            total_requests: self.last.total_requests,
            elapsed_secs: self.last.elapsed.as_secs_f64(),
            rate: StatsSummary::from(&self.rate_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 吞吐摘要
#[derive(Debug, Clone, Default)]
pub struct ThroughputSummary {
    pub total_requests: u64,
    pub elapsed_secs: f64,
    pub rate: StatsSummary,
}

impl std::fmt::Display for ThroughputSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Throughput Summary ===")?;
        writeln!(f, "Total requests: {}", self.total_requests)?;
        writeln!(f, "Elapsed: {:.2}s", self.elapsed_secs)?;
        writeln!(f, "Rate (req/s): {}", self.rate)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
