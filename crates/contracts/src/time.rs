//! TimePoint - stream-local time

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Instant on one stream's clock, in seconds from that stream's origin.
///
/// Values from different streams are only comparable after the sync engine
/// has aligned them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct TimePoint {
    pub absolute_seconds: f64,
}

impl TimePoint {
    #[inline]
    pub const fn from_seconds(absolute_seconds: f64) -> Self {
        Self { absolute_seconds }
    }

    #[inline]
    pub fn seconds(self) -> f64 {
        self.absolute_seconds
    }

    /// Shift this point so that `origin` becomes zero
    #[inline]
    pub fn relative_to(self, origin: f64) -> Self {
        Self::from_seconds(self.absolute_seconds - origin)
    }
}

impl Sub for TimePoint {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        self.absolute_seconds - rhs.absolute_seconds
    }
}

impl From<f64> for TimePoint {
    fn from(seconds: f64) -> Self {
        Self::from_seconds(seconds)
    }
}
