//! # Contracts
//!
//! Frozen interface contracts, defining the data structures and traits shared
//! by every crate in the workspace. Business crates depend on this crate only;
//! reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every stream is expressed in seconds (f64) relative to a stream-local origin
//! - Two streams are never compared directly; the sync engine aligns them first
//! - `frame_index` is the diameter series' own frame numbering; `video_frame`
//!   is the normalized index into the decoded video

mod aligner;
mod alignment_config;
mod blueprint;
mod columns;
mod elasticity;
mod error;
mod series;
mod series_source;
mod sink;
mod sync;
mod time;

pub use aligner::Aligner;
pub use alignment_config::*;
pub use blueprint::*;
pub use columns::ColumnAliases;
pub use elasticity::*;
pub use error::*;
pub use series::*;
pub use series_source::SeriesSource;
pub use sink::*;
pub use sync::*;
pub use time::TimePoint;
