//! Fit logged frame numbers onto the decoded video's frame range.

use contracts::FrameScaling;
use tracing::instrument;

/// Normalizer output, positionally aligned with the input frames
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFrames {
    /// Mapped frame per input row (may be outside the video for `Unchanged`)
    pub mapped: Vec<i64>,
    pub scaling: FrameScaling,
    /// Rows whose mapped frame is not a valid video frame
    pub out_of_range: usize,
    upper_bound: Option<i64>,
}

impl NormalizedFrames {
    /// Valid video frame for row `i`, `None` when it cannot be placed
    pub fn video_frame(&self, i: usize) -> Option<i64> {
        let frame = *self.mapped.get(i)?;
        let in_range = frame >= 0 && self.upper_bound.map_or(true, |total| frame < total);
        in_range.then_some(frame)
    }
}

pub struct FrameRangeNormalizer;

impl FrameRangeNormalizer {
    /// Decide and apply a mapping of `frames` into `[0, total_video_frames)`.
    #[instrument(
        name = "frame_normalize",
        level = "debug",
        skip(frames),
        fields(frames = frames.len())
    )]
    pub fn normalize(frames: &[i64], total_video_frames: i64) -> NormalizedFrames {
        if total_video_frames <= 0 {
            tracing::warn!(total_video_frames, "no video frames, mapping everything to frame 0");
            return Self::finish(vec![0; frames.len()], FrameScaling::Degenerate, Some(0));
        }

        let bounds = frames
            .iter()
            .fold(None, |acc: Option<(i64, i64)>, &f| match acc {
                None => Some((f, f)),
                Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
            });
        let Some((min, max)) = bounds else {
            return Self::finish(Vec::new(), FrameScaling::Unchanged, Some(total_video_frames));
        };

        let total = total_video_frames;
        let (mapped, scaling) = if min >= total && max - min + 1 <= total {
            let mapped = frames.iter().map(|&f| f - min).collect();
            (mapped, FrameScaling::Offset { offset: min })
        } else if max >= total {
            Self::scale(frames, min, max, total)
        } else {
            (frames.to_vec(), FrameScaling::Unchanged)
        };

        Self::finish(mapped, scaling, Some(total))
    }

    /// Keep frames as-is when the video length is unknown; only negative
    /// frames are unplaceable.
    pub fn passthrough(frames: &[i64]) -> NormalizedFrames {
        Self::finish(frames.to_vec(), FrameScaling::Unchanged, None)
    }

    /// Only reached with `min < total <= max`, so the range is never empty.
    fn scale(frames: &[i64], min: i64, max: i64, total: i64) -> (Vec<i64>, FrameScaling) {
        let factor = (total - 1) as f64 / (max - min) as f64;
        let mapped = frames
            .iter()
            .map(|&f| (((f - min) as f64 * factor).round() as i64).clamp(0, total - 1))
            .collect();
        (mapped, FrameScaling::Scaled { origin: min, factor })
    }

    fn finish(mapped: Vec<i64>, scaling: FrameScaling, upper_bound: Option<i64>) -> NormalizedFrames {
        let mut normalized = NormalizedFrames {
            mapped,
            scaling,
            out_of_range: 0,
            upper_bound,
        };
        normalized.out_of_range = (0..normalized.mapped.len())
            .filter(|&i| normalized.video_frame(i).is_none())
            .count();
        if normalized.out_of_range > 0 {
            tracing::debug!(
                out_of_range = normalized.out_of_range,
                "frames could not be placed in the video"
            );
        }
        normalized
    }
}
