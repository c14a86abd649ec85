//! Frame number → image-clock time lookup.

use std::collections::BTreeMap;

/// Resolves a time for any frame from a sparse frame/time table.
///
/// Frames between two known entries are linearly interpolated; frames
/// outside the table's range stay unresolved.
#[derive(Debug, Clone, Default)]
pub struct FrameTimeResolver {
    table: BTreeMap<i64, f64>,
}

impl FrameTimeResolver {
    /// Build from `(frame, seconds)` pairs. The first entry for a frame wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let mut table = BTreeMap::new();
        for (frame, seconds) in pairs {
            if seconds.is_finite() {
                table.entry(frame).or_insert(seconds);
            }
        }
        Self { table }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn resolve(&self, frame: i64) -> Option<f64> {
        if let Some(&t) = self.table.get(&frame) {
            return Some(t);
        }
        let (&f0, &t0) = self.table.range(..frame).next_back()?;
        let (&f1, &t1) = self.table.range(frame..).next()?;
        let ratio = (frame - f0) as f64 / (f1 - f0) as f64;
        Some(t0 + ratio * (t1 - t0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_interpolated() {
        let resolver = FrameTimeResolver::from_pairs([(0, 0.0), (99, 10.0)]);
        assert_eq!(resolver.resolve(0), Some(0.0));
        assert_eq!(resolver.resolve(99), Some(10.0));
        let t = resolver.resolve(50).unwrap();
        assert!((t - 50.0 * 10.0 / 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_outside_range_unresolved() {
        let resolver = FrameTimeResolver::from_pairs([(10, 1.0), (20, 2.0)]);
        assert_eq!(resolver.resolve(9), None);
        assert_eq!(resolver.resolve(21), None);
        assert_eq!(FrameTimeResolver::default().resolve(0), None);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let resolver = FrameTimeResolver::from_pairs([(5, 1.0), (5, 9.0), (6, f64::NAN)]);
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve(5), Some(1.0));
        assert_eq!(resolver.resolve(6), None);
    }
}
