//! Time-range overlap between two aligned series.

use contracts::OverlapResult;

/// Pure overlap computation
pub struct OverlapAnalyzer;

impl OverlapAnalyzer {
    /// Span of each series and their intersection.
    ///
    /// Returns `None` when either series is empty.
    pub fn analyze(a: &[f64], b: &[f64]) -> Option<OverlapResult> {
        let (start_a, end_a) = span(a)?;
        let (start_b, end_b) = span(b)?;
        let overlap_start = start_a.max(start_b);
        let overlap_end = end_a.min(end_b);

        Some(OverlapResult {
            start_a,
            end_a,
            start_b,
            end_b,
            overlap_start,
            overlap_end,
            has_overlap: overlap_end > overlap_start,
        })
    }
}

fn span(times: &[f64]) -> Option<(f64, f64)> {
    let first = *times.first()?;
    Some(
        times
            .iter()
            .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_overlap() {
        let r = OverlapAnalyzer::analyze(&[2.0, 0.0, 10.0], &[5.0, 12.0]).unwrap();
        assert_eq!((r.start_a, r.end_a), (0.0, 10.0));
        assert_eq!((r.start_b, r.end_b), (5.0, 12.0));
        assert_eq!((r.overlap_start, r.overlap_end), (5.0, 10.0));
        assert!(r.has_overlap);
    }

    #[test]
    fn test_disjoint_and_touching() {
        let r = OverlapAnalyzer::analyze(&[0.0, 5.0], &[100.0, 105.0]).unwrap();
        assert!(!r.has_overlap);
        assert_eq!(r.duration(), 0.0);

        // Touching endpoints is not an overlap
        let r = OverlapAnalyzer::analyze(&[0.0, 5.0], &[5.0, 8.0]).unwrap();
        assert!(!r.has_overlap);
    }

    #[test]
    fn test_empty_input() {
        assert!(OverlapAnalyzer::analyze(&[], &[1.0]).is_none());
        assert!(OverlapAnalyzer::analyze(&[1.0], &[]).is_none());
    }
}
