//! # Sync Engine
//!
//! 直径序列与压力序列的时间对齐引擎。
//!
//! 负责：
//! - 两种时钟格式的时间戳解析
//! - 帧号到图像时间的映射
//! - 重叠检测与策略选择 (Direct / Interpolated / FallbackScaled)
//! - 帧号归一化到视频范围
//! - 输出 `SyncOutcome` 与覆盖率报告
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::{AlignmentConfig, AlignmentInput, SyncEngine};
//!
//! let input = AlignmentInput::new(diameter_rows)
//!     .with_pressure(pressure_rows)
//!     .with_frame_timestamps(timestamp_rows)
//!     .with_total_video_frames(300);
//!
//! let outcome = SyncEngine::run(AlignmentConfig::default(), input)?;
//! println!("strategy: {}", outcome.coverage.strategy);
//! ```

mod elasticity;
mod engine;
mod frame_time;
mod interpolate;
mod normalize;
mod overlap;
mod strategy;
mod timestamp;
mod worker;

pub use elasticity::{classify, compute_elasticity, PA_TO_MMHG};
pub use engine::{PressureAligner, SyncEngine, SyncState};
pub use frame_time::FrameTimeResolver;
pub use interpolate::{interpolate_by_frame, interpolate_by_position, PressureInterpolator};
pub use normalize::{FrameRangeNormalizer, NormalizedFrames};
pub use overlap::OverlapAnalyzer;
pub use strategy::{nearest_index, AlignmentStrategySelector, DirectMatch, Selection};
pub use timestamp::{ParsedBatch, TimestampParser};
pub use worker::{AlignmentTicket, AlignmentWorker};

// Re-export contracts types
pub use contracts::{
    AlignmentConfig, AlignmentInput, AlignmentStrategy, CoverageReport, ExtrapolationPolicy,
    SyncOutcome, SyncedRecord,
};
