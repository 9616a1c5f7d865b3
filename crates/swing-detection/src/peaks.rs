//! Adaptive peak detection over the swing score

use crate::config::AnalysisConfig;
use std::cmp::Ordering;
use std::ops::Range;
use tracing::debug;

/// Conditioned series the detector, segmenter and classifier work on.
///
/// All vectors are indexed like the analyzed frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSignals {
    pub frames: Vec<u32>,
    pub timestamps: Vec<f64>,
    /// Composite swing score
    pub score: Vec<Option<f64>>,
    /// Selected wrist speed, smoothed (px/frame)
    pub wrist_px: Vec<Option<f64>>,
    /// Selected wrist speed, smoothed (km/h)
    pub wrist_kmh: Vec<Option<f64>>,
    /// Smoothed rotation velocity (degrees/frame)
    pub rotation: Vec<Option<f64>>,
    /// Body orientation (degrees)
    pub orientation: Vec<Option<f64>>,
}

impl DetectionSignals {
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Indices of the frames numbered within `[frame(center) - before, frame(center) + after]`
    #[must_use]
    pub fn window(&self, center: usize, before: u32, after: u32) -> Range<usize> {
        let frame = self.frames[center];
        let lo = frame.saturating_sub(before);
        let hi = frame.saturating_add(after);
        let start = self.frames.partition_point(|&f| f < lo);
        let end = self.frames.partition_point(|&f| f <= hi);
        start..end
    }

    /// Index of the frame whose timestamp is closest to `time` (earlier wins ties)
    #[must_use]
    pub fn nearest_index(&self, time: f64) -> Option<usize> {
        self.timestamps
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - time)
                    .abs()
                    .partial_cmp(&(*b - time).abs())
                    .unwrap_or(Ordering::Equal)
            })
            .map(|(i, _)| i)
    }
}

/// Accepted swing peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Index into the analyzed frames
    pub index: usize,
    pub score: f64,
}

/// Output of the detector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakDetection {
    /// Adaptive score threshold; `None` when no score was known
    pub threshold: Option<f64>,
    /// Accepted peaks in frame order
    pub peaks: Vec<Peak>,
}

/// Score at `percentile` of the known samples, floored at `floor`
#[must_use]
pub fn adaptive_threshold(scores: &[Option<f64>], percentile: f64, floor: f64) -> Option<f64> {
    let mut known: Vec<f64> = scores.iter().flatten().copied().collect();
    if known.is_empty() {
        return None;
    }
    known.sort_by(f64::total_cmp);
    let rank = ((percentile / 100.0) * known.len() as f64).floor() as usize;
    let value = known[rank.min(known.len() - 1)];
    Some(value.max(floor))
}

/// Local maxima at or above the threshold.
///
/// Both neighbours must be known and strictly lower, so plateaus and
/// series edges never produce a peak.
#[must_use]
pub fn local_maxima(scores: &[Option<f64>], threshold: f64) -> Vec<Peak> {
    if scores.len() < 3 {
        return Vec::new();
    }
    (1..scores.len() - 1)
        .filter_map(|i| {
            let (prev, value, next) = (scores[i - 1]?, scores[i]?, scores[i + 1]?);
            (value > prev && value > next && value >= threshold).then_some(Peak {
                index: i,
                score: value,
            })
        })
        .collect()
}

/// Keep the best-scoring peak of every group closer than `min_distance` frames
#[must_use]
pub fn suppress_close_peaks(mut peaks: Vec<Peak>, frames: &[u32], min_distance: u32) -> Vec<Peak> {
    // Best first; earlier frame wins ties
    peaks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });

    let mut keep: Vec<Peak> = Vec::with_capacity(peaks.len());
    for peak in peaks {
        let frame = frames[peak.index];
        let conflicts = keep
            .iter()
            .any(|kept| frames[kept.index].abs_diff(frame) < min_distance);
        if !conflicts {
            keep.push(peak);
        }
    }

    keep.sort_by_key(|p| p.index);
    keep
}

/// Run the full detector: threshold, maxima, separation, rotation and speed gates
#[must_use]
pub fn detect_peaks(
    signals: &DetectionSignals,
    config: &AnalysisConfig,
    fps: f64,
) -> PeakDetection {
    let Some(threshold) =
        adaptive_threshold(&signals.score, config.score_percentile, config.min_swing_score)
    else {
        debug!("No known swing score samples, skipping peak detection");
        return PeakDetection::default();
    };

    let candidates = local_maxima(&signals.score, threshold);
    let min_distance = config.min_peak_distance_frames(fps);
    let separated = suppress_close_peaks(candidates.clone(), &signals.frames, min_distance);
    debug!(
        "Swing score threshold {:.3}: {} local maxima, {} after {}-frame separation",
        threshold,
        candidates.len(),
        separated.len(),
        min_distance
    );

    let peaks = separated
        .into_iter()
        .filter(|peak| {
            let frame = signals.frames[peak.index];
            if config.require_rotation {
                let rotation = signals.rotation[peak.index].map(f64::abs);
                if !rotation.is_some_and(|r| r >= config.min_rotation_velocity) {
                    debug!("Peak at frame {frame} rejected: rotation {rotation:?} too low");
                    return false;
                }
            }
            let speed = signals.wrist_kmh[peak.index];
            if !speed.is_some_and(|v| v >= config.min_velocity_kmh) {
                debug!("Peak at frame {frame} rejected: wrist speed {speed:?} km/h too low");
                return false;
            }
            true
        })
        .collect();

    PeakDetection {
        threshold: Some(threshold),
        peaks,
    }
}
