//! 对齐结果指标收集模块
//!
//! 基于 CoverageReport 收集和统计每个会话的对齐指标。

use std::collections::HashMap;

use contracts::{AlignmentStrategy, CoverageReport};
use metrics::{counter, gauge, histogram};

/// 从 CoverageReport 记录指标
///
/// 每个会话完成对齐后调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_coverage_metrics;
///
/// let outcome = SyncEngine::run(config, input)?;
/// record_coverage_metrics(&session.id, &outcome.coverage);
/// ```
pub fn record_coverage_metrics(session_id: &str, report: &CoverageReport) {
    // 会话计数器 (按策略)
    counter!(
        "vessel_sync_sessions_total",
        "strategy" => report.strategy.as_str()
    )
    .increment(1);

    // 记录数
    counter!("vessel_sync_records_total").increment(report.total_frames as u64);

    // 覆盖率
    let ratio = report.coverage_ratio();
    gauge!(
        "vessel_sync_coverage_ratio",
        "session" => session_id.to_string()
    )
    .set(ratio);
    histogram!("vessel_sync_coverage_ratio_hist").record(ratio);

    // 各来源匹配数
    for (provenance, count) in [
        ("direct", report.matched_directly),
        ("interpolated", report.matched_by_interpolation),
        ("fallback", report.matched_by_fallback),
        ("missing", report.unmatched),
    ] {
        if count > 0 {
            counter!(
                "vessel_sync_records_by_provenance_total",
                "provenance" => provenance
            )
            .increment(count as u64);
        }
    }

    // 时钟偏移 (秒)
    gauge!(
        "vessel_sync_time_offset_seconds",
        "session" => session_id.to_string()
    )
    .set(report.time_offset_seconds);

    // 输入质量
    if report.malformed_pressure_rows > 0 {
        counter!("vessel_sync_malformed_pressure_rows_total")
            .increment(report.malformed_pressure_rows as u64);
    }
    if report.malformed_frame_timestamps > 0 {
        counter!("vessel_sync_malformed_frame_timestamps_total")
            .increment(report.malformed_frame_timestamps as u64);
    }
    if report.frames_out_of_video_range > 0 {
        counter!("vessel_sync_frames_out_of_range_total")
            .increment(report.frames_out_of_video_range as u64);
    }

    // 降级路径
    if report.pressure_missing {
        counter!("vessel_sync_pressure_missing_total").increment(1);
    }
    if report.degenerate_frame_range {
        counter!("vessel_sync_degenerate_frame_range_total").increment(1);
    }
}

/// 记录 sink 的最终写入结果
pub fn record_sink_totals(sink_name: &str, writes: u64, failures: u64) {
    let sink = sink_name.to_string();
    counter!("vessel_sync_sessions_dispatched_total", "sink" => sink.clone(), "status" => "success")
        .increment(writes);
    if failures > 0 {
        counter!("vessel_sync_sessions_dispatched_total", "sink" => sink, "status" => "failure")
            .increment(failures);
    }
}

/// 记录单个会话的处理耗时
pub fn record_session_duration_ms(duration_ms: f64) {
    histogram!("vessel_sync_session_duration_ms").record(duration_ms);
}

/// 覆盖率指标聚合器
///
/// 在内存中聚合一次批量运行的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct CoverageAggregator {
    /// 会话数
    pub total_sessions: u64,

    /// 记录总数
    pub total_records: u64,

    /// 有压力值的记录数
    pub matched_records: u64,

    /// 降级会话数
    pub degraded_sessions: u64,

    /// 坏行总数 (压力 + 时间戳)
    pub malformed_rows: u64,

    /// 覆盖率统计
    pub coverage_stats: RunningStats,

    /// 时钟偏移统计 (秒)
    pub offset_stats: RunningStats,

    /// 各策略的会话数
    pub strategy_counts: HashMap<AlignmentStrategy, u64>,
}

impl CoverageAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, report: &CoverageReport) {
        self.total_sessions += 1;
        self.total_records += report.total_frames as u64;
        self.matched_records += report.matched() as u64;
        self.malformed_rows +=
            (report.malformed_pressure_rows + report.malformed_frame_timestamps) as u64;

        if report.is_degraded() {
            self.degraded_sessions += 1;
        }

        self.coverage_stats.push(report.coverage_ratio() * 100.0);
        if !report.pressure_missing {
            self.offset_stats.push(report.time_offset_seconds);
        }

        *self.strategy_counts.entry(report.strategy).or_insert(0) += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> CoverageSummary {
        let mut strategies: Vec<_> = self
            .strategy_counts
            .iter()
            .map(|(strategy, count)| (*strategy, *count))
            .collect();
        strategies.sort_by_key(|(strategy, _)| strategy.as_str());

        CoverageSummary {
            total_sessions: self.total_sessions,
            total_records: self.total_records,
            matched_records: self.matched_records,
            degraded_sessions: self.degraded_sessions,
            malformed_rows: self.malformed_rows,
            overall_coverage: if self.total_records > 0 {
                self.matched_records as f64 / self.total_records as f64 * 100.0
            } else {
                0.0
            },
            coverage_pct: StatsSummary::from(&self.coverage_stats),
            time_offset_s: StatsSummary::from(&self.offset_stats),
            strategies,
        }
    }
}

/// 批量运行摘要
#[derive(Debug, Clone, Default)]
pub struct CoverageSummary {
    pub total_sessions: u64,
    pub total_records: u64,
    pub matched_records: u64,
    pub degraded_sessions: u64,
    pub malformed_rows: u64,
    pub overall_coverage: f64,
    pub coverage_pct: StatsSummary,
    pub time_offset_s: StatsSummary,
    /// (策略, 会话数)，按名称排序
    pub strategies: Vec<(AlignmentStrategy, u64)>,
}

impl std::fmt::Display for CoverageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alignment Summary ===")?;
        writeln!(f, "Sessions: {}", self.total_sessions)?;
        writeln!(
            f,
            "Records with pressure: {}/{} ({:.2}%)",
            self.matched_records, self.total_records, self.overall_coverage
        )?;
        writeln!(f, "Degraded sessions: {}", self.degraded_sessions)?;
        writeln!(f, "Malformed input rows: {}", self.malformed_rows)?;
        writeln!(f, "Coverage per session (%): {}", self.coverage_pct)?;
        writeln!(f, "Clock offset (s): {}", self.time_offset_s)?;

        if !self.strategies.is_empty() {
            writeln!(f, "Strategies:")?;
            for (strategy, count) in &self.strategies {
                writeln!(f, "  {}: {}", strategy, count)?;
            }
        }

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
            count: stats.count,
            min: stats.min,
            max: stats.max,
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
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
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

    /// 样本方差
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
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
