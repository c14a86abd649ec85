//! Pressure interpolation: by time, by frame distance, and by position.

use std::collections::BTreeMap;

/// Piecewise-linear interpolator over time-sorted pressure samples.
///
/// Construction requires at least one sample, so lookups never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureInterpolator {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl PressureInterpolator {
    /// Build from `(seconds, value)` samples in any order; equal times keep
    /// their input order. Non-finite samples are skipped.
    ///
    /// Returns `None` when no finite sample remains.
    pub fn new<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut samples: Vec<(f64, f64)> = samples
            .into_iter()
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .collect();
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, values) = samples.into_iter().unzip();
        Some(Self { times, values })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times, ascending
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start() && t <= self.end()
    }

    /// Linear inside the sampled range, flat edge value outside
    pub fn interpolate(&self, t: f64) -> f64 {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.values[0];
        }
        if t >= self.times[last] {
            return self.values[last];
        }

        let upper = self.times.partition_point(|&x| x <= t);
        let (t0, t1) = (self.times[upper - 1], self.times[upper]);
        let (v0, v1) = (self.values[upper - 1], self.values[upper]);
        lerp(t0, v0, t1, v1, t)
    }

    /// Like [`interpolate`](Self::interpolate) but `None` outside the range
    pub fn interpolate_within(&self, t: f64) -> Option<f64> {
        self.contains(t).then(|| self.interpolate(t))
    }

    /// Map the sample timeline linearly onto `[image_start, image_end]`.
    ///
    /// A zero-length pressure timeline collapses to its first value; a
    /// zero-length image timeline pins every sample to `image_start`.
    pub fn rescaled_onto(&self, image_start: f64, image_end: f64) -> Self {
        let duration = self.end() - self.start();
        if duration <= 0.0 {
            return Self {
                times: vec![image_start],
                values: vec![self.values[0]],
            };
        }

        let factor = (image_end - image_start).max(0.0) / duration;
        let origin = self.start();
        Self {
            times: self
                .times
                .iter()
                .map(|&t| image_start + (t - origin) * factor)
                .collect(),
            values: self.values.clone(),
        }
    }
}

/// Interpolate a value for `target` from values known at other frames.
///
/// Exact hit returns the known value; otherwise the strictly-lower and
/// strictly-higher neighbours are blended by frame distance. Outside the
/// known range the nearest edge value is returned. `None` only for an
/// empty map.
pub fn interpolate_by_frame(target: i64, known: &BTreeMap<i64, f64>) -> Option<f64> {
    if let Some(&v) = known.get(&target) {
        return Some(v);
    }
    let lower = known.range(..target).next_back();
    let upper = known.range(target..).next();
    match (lower, upper) {
        (Some((&f0, &v0)), Some((&f1, &v1))) => Some(lerp(f0 as f64, v0, f1 as f64, v1, target as f64)),
        (Some((_, &v)), None) | (None, Some((_, &v))) => Some(v),
        (None, None) => None,
    }
}

/// Interpolate over `values` (log order) at relative position `fraction`
/// in `[0, 1]`, mapped onto indices `fraction × (n - 1)`.
pub fn interpolate_by_position(values: &[f64], fraction: f64) -> Option<f64> {
    let last = values.len().checked_sub(1)?;
    let position = fraction.clamp(0.0, 1.0) * last as f64;
    let lower = (position.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    if lower == upper {
        return Some(values[lower]);
    }
    Some(lerp(lower as f64, values[lower], upper as f64, values[upper], position))
}

/// Linear blend clamped to the segment's value range
fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    let span = x1 - x0;
    if span <= 0.0 {
        return y0;
    }
    let y = y0 + (y1 - y0) * ((x - x0) / span);
    y.clamp(y0.min(y1), y0.max(y1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpolator() -> PressureInterpolator {
        PressureInterpolator::new([(10.0, 2.0), (0.0, 1.0), (5.0, 4.0)]).unwrap()
    }

    #[test]
    fn test_sorted_on_construction() {
        let p = interpolator();
        assert_eq!(p.times(), &[0.0, 5.0, 10.0]);
        assert_eq!(p.values(), &[1.0, 4.0, 2.0]);
    }

    #[test]
    fn test_linear_inside_flat_outside() {
        let p = interpolator();
        assert_eq!(p.interpolate(2.5), 2.5);
        assert_eq!(p.interpolate(5.0), 4.0);
        assert_eq!(p.interpolate(-1.0), 1.0);
        assert_eq!(p.interpolate(99.0), 2.0);
        assert_eq!(p.interpolate_within(99.0), None);
        assert_eq!(p.interpolate_within(7.5), Some(3.0));
    }

    #[test]
    fn test_bounded_by_observed_values() {
        let p = PressureInterpolator::new([(0.0, 0.3), (0.7, 0.1), (1.3, 0.9), (2.0, 0.2)]).unwrap();
        for i in 0..=400 {
            let t = i as f64 * 0.005;
            let v = p.interpolate(t);
            assert!((0.1..=0.9).contains(&v), "t={t} v={v}");
        }
    }

    #[test]
    fn test_single_sample_is_flat() {
        let p = PressureInterpolator::new([(3.0, 7.5)]).unwrap();
        assert_eq!(p.interpolate(-100.0), 7.5);
        assert_eq!(p.interpolate(3.0), 7.5);
        assert_eq!(p.interpolate(100.0), 7.5);
    }

    #[test]
    fn test_empty_or_non_finite() {
        assert!(PressureInterpolator::new(Vec::new()).is_none());
        assert!(PressureInterpolator::new([(f64::NAN, 1.0), (0.0, f64::INFINITY)]).is_none());
    }

    #[test]
    fn test_rescaled_onto() {
        let p = PressureInterpolator::new([(0.0, 1.0), (5.0, 2.0)]).unwrap();
        let scaled = p.rescaled_onto(100.0, 110.0);
        assert_eq!(scaled.times(), &[100.0, 110.0]);
        assert_eq!(scaled.interpolate(105.0), 1.5);

        let pinned = p.rescaled_onto(100.0, 100.0);
        assert_eq!(pinned.interpolate(100.0), 1.0);

        let flat = PressureInterpolator::new([(2.0, 3.0), (2.0, 4.0)]).unwrap();
        assert_eq!(flat.rescaled_onto(0.0, 10.0).interpolate(5.0), 3.0);
    }

    #[test]
    fn test_interpolate_by_frame() {
        let known: BTreeMap<i64, f64> = [(10, 1.0), (20, 3.0)].into_iter().collect();
        assert_eq!(interpolate_by_frame(10, &known), Some(1.0));
        assert_eq!(interpolate_by_frame(15, &known), Some(2.0));
        assert_eq!(interpolate_by_frame(5, &known), Some(1.0));
        assert_eq!(interpolate_by_frame(25, &known), Some(3.0));
        assert_eq!(interpolate_by_frame(0, &BTreeMap::new()), None);
    }

    #[test]
    fn test_interpolate_by_position() {
        let values = [0.0, 10.0, 20.0];
        assert_eq!(interpolate_by_position(&values, 0.0), Some(0.0));
        assert_eq!(interpolate_by_position(&values, 0.25), Some(5.0));
        assert_eq!(interpolate_by_position(&values, 1.0), Some(20.0));
        assert_eq!(interpolate_by_position(&[4.0], 0.7), Some(4.0));
        assert_eq!(interpolate_by_position(&[], 0.5), None);
    }
}
