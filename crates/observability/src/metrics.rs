//! 指标采集模块
//!
//! 定义会话相关的 Prometheus 指标：
//! - `volley_probes_launched`: 已发射探测数 (Gauge)
//! - `volley_probes_completed`: 已完成探测数 (Gauge)
//! - `volley_probes_busy`: 在途探测数 (Gauge)
//! - `volley_heat_window`: 每秒窗口发射数 (Histogram)

use contracts::CounterSnapshot;
use metrics::{gauge, histogram};

/// 记录一个 heat 窗口采样
pub fn record_heat_window(heat: u64) {
    histogram!("volley_heat_window").record(heat as f64);
}

/// 记录计数器快照
pub fn record_counters(snapshot: &CounterSnapshot) {
    gauge!("volley_probes_busy").set(snapshot.busy as f64);
    gauge!("volley_probes_launched").set(snapshot.total as f64);
    gauge!("volley_probes_completed").set(snapshot.completed as f64);
}

/// Heat 窗口聚合器
///
/// 在会话内累积每秒窗口样本，结束时产出统计摘要。
#[derive(Debug, Default)]
pub struct HeatAggregator {
    heat: RunningStats,
    peak_busy: u64,
}

impl HeatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合器 (每个 heat 窗口调用一次)
    pub fn update(&mut self, heat: u64, busy: u64) {
        self.heat.push(heat as f64);
        self.peak_busy = self.peak_busy.max(busy);
        record_heat_window(heat);
    }

    /// 产出摘要
    pub fn summary(&self) -> HeatSummary {
        HeatSummary {
            windows: self.heat.count(),
            heat: StatsSummary::from(&self.heat),
            peak_busy: self.peak_busy,
        }
    }

    /// 重置聚合器
    pub fn reset(&mut self) {
        self.heat = RunningStats::default();
        self.peak_busy = 0;
    }
}

/// Heat 窗口统计摘要
#[derive(Debug, Clone)]
pub struct HeatSummary {
    /// 采样窗口数
    pub windows: u64,
    /// 每秒完成数统计
    pub heat: StatsSummary,
    /// 在途峰值
    pub peak_busy: u64,
}

impl std::fmt::Display for HeatSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Heat Summary:")?;
        writeln!(f, "  Windows sampled: {}", self.windows)?;
        writeln!(f, "  Completions/sec: {}", self.heat)?;
        write!(f, "  Peak busy: {}", self.peak_busy)
    }
}

/// 统计摘要 (用于展示)
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: u64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
            count: stats.count(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "no samples")
        } else {
            write!(
                f,
                "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 运行时统计 (Welford 在线算法)
///
/// 单遍计算 mean/variance，数值稳定。
#[derive(Debug, Clone)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }
}
