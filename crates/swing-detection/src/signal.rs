//! Signal conditioning for per-frame metric series
//!
//! Series are `Option<f64>` slices aligned with the analyzed frames. Cleaning
//! happens in two independent passes:
//!
//! 1. [`fill_drops`] repairs isolated single-frame detection dropouts and
//!    leaves genuine minima alone.
//! 2. [`kernel_smooth`] (fixed 5-tap kernel) followed by [`moving_average`]
//!    (configurable width) produces the smoothed series.
//!
//! [`VelocityScale`] converts pixel speeds to km/h from the average torso size.

use swing_analysis_common::finite;
use tracing::{debug, warn};

/// Centered smoothing kernel
pub const SMOOTHING_KERNEL: [f64; 5] = [0.1, 0.2, 0.4, 0.2, 0.1];

/// A sample below this share of its neighbours' mean is a dropout candidate
pub const DROP_SEVERITY_RATIO: f64 = 0.3;

/// Neighbours must differ by less than this share of their mean
pub const NEIGHBOR_SIMILARITY_RATIO: f64 = 0.5;

/// Neighbour means at or below this are noise, never repaired
pub const DROP_NOISE_FLOOR: f64 = 0.5;

/// Replace isolated single-frame dropouts with the mean of their neighbours.
///
/// A sample is a candidate when it is far below its neighbours, the neighbours
/// agree with each other, and their mean is above the noise floor. Candidates
/// are found on the unmodified input and only repaired when no other candidate
/// sits two samples away: a repeated dip is a real oscillation, not a glitch.
/// Unknown samples stay unknown.
#[must_use]
pub fn fill_drops(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = series.len();
    let mut candidates = vec![None; n];

    for i in 1..n.saturating_sub(1) {
        let (Some(prev), Some(value), Some(next)) = (series[i - 1], series[i], series[i + 1])
        else {
            continue;
        };
        let mean = (prev + next) / 2.0;
        if mean > DROP_NOISE_FLOOR
            && (prev - next).abs() < NEIGHBOR_SIMILARITY_RATIO * mean
            && value < DROP_SEVERITY_RATIO * mean
        {
            candidates[i] = Some(mean);
        }
    }

    let mut filled = series.to_vec();
    for i in 0..n {
        let Some(mean) = candidates[i] else {
            continue;
        };
        let repeated = (i >= 2 && candidates[i - 2].is_some())
            || (i + 2 < n && candidates[i + 2].is_some());
        if !repeated {
            filled[i] = Some(mean);
        }
    }
    filled
}

/// Apply [`SMOOTHING_KERNEL`] around every known sample.
///
/// Taps falling outside the series or on unknown samples are dropped and the
/// remaining weights renormalised. Unknown samples stay unknown.
#[must_use]
pub fn kernel_smooth(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = series.len() as isize;
    let half = (SMOOTHING_KERNEL.len() / 2) as isize;

    (0..n)
        .map(|i| {
            series[i as usize]?;
            let (sum, weight) = SMOOTHING_KERNEL.iter().enumerate().fold(
                (0.0, 0.0),
                |(sum, weight), (k, w)| {
                    let j = i + k as isize - half;
                    if j < 0 || j >= n {
                        return (sum, weight);
                    }
                    match series[j as usize] {
                        Some(v) => (sum + w * v, weight + w),
                        None => (sum, weight),
                    }
                },
            );
            finite(sum / weight)
        })
        .collect()
}

/// Centered moving average of width `window` over the known samples.
///
/// An unknown sample is interpolated from the window mean only when the window
/// holds known samples on both sides of it; edges are never extrapolated.
#[must_use]
pub fn moving_average(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return series.to_vec();
    }
    let n = series.len();
    let before = (window - 1) / 2;
    let after = window / 2;

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(n.saturating_sub(1));
            if series[i].is_none() {
                let left_known = series[lo..i].iter().any(Option::is_some);
                let right_known = series[i + 1..=hi].iter().any(Option::is_some);
                if !(left_known && right_known) {
                    return None;
                }
            }
            let (sum, count) = series[lo..=hi]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                None
            } else {
                finite(sum / count as f64)
            }
        })
        .collect()
}

/// A raw series after both cleaning passes
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionedSeries {
    /// Drop-filled and kernel-smoothed
    pub filtered: Vec<Option<f64>>,
    /// `filtered` after the configurable moving average
    pub smoothed: Vec<Option<f64>>,
}

/// Run the full cleaning chain on one series
#[must_use]
pub fn condition(series: &[Option<f64>], smoothing_window: usize) -> ConditionedSeries {
    let filtered = kernel_smooth(&fill_drops(series));
    let smoothed = moving_average(&filtered, smoothing_window);
    ConditionedSeries { filtered, smoothed }
}

/// Pixel-to-real-world speed conversion for one video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityScale {
    pub meters_per_pixel: f64,
    pub fps: f64,
    /// Average torso height the scale was derived from (px)
    pub torso_height_px: f64,
    /// No frame had a usable torso; the fallback height was used
    pub used_fallback: bool,
}

impl VelocityScale {
    /// Derive the scale from per-frame torso heights.
    ///
    /// `meters_per_pixel = person_height × torso_ratio / average_torso_px`
    #[must_use]
    pub fn estimate<I>(
        torso_heights: I,
        fps: f64,
        person_height_m: f64,
        torso_to_height_ratio: f64,
        fallback_torso_height_px: f64,
    ) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let (sum, count) = torso_heights
            .into_iter()
            .flatten()
            .filter(|h| h.is_finite() && *h > 0.0)
            .fold((0.0, 0usize), |(sum, count), h| (sum + h, count + 1));

        let (torso_height_px, used_fallback) = if count > 0 {
            (sum / count as f64, false)
        } else {
            warn!(
                "No reliable torso measurement, assuming {fallback_torso_height_px}px torso height"
            );
            (fallback_torso_height_px, true)
        };

        let meters_per_pixel = person_height_m * torso_to_height_ratio / torso_height_px;
        debug!(
            "Velocity scale: torso {:.1}px from {} frames → {:.5} m/px",
            torso_height_px, count, meters_per_pixel
        );

        Self {
            meters_per_pixel,
            fps,
            torso_height_px,
            used_fallback,
        }
    }

    /// px/frame → km/h
    #[must_use]
    pub fn to_kmh(&self, px_per_frame: f64) -> Option<f64> {
        finite(px_per_frame * self.meters_per_pixel * self.fps * 3.6)
    }

    /// Convert a whole series, keeping unknown samples unknown
    #[must_use]
    pub fn series_to_kmh(&self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        series
            .iter()
            .map(|v| v.and_then(|px| self.to_kmh(px)))
            .collect()
    }
}

/// Centered finite difference of a km/h series, in km/h per second.
///
/// `frames` holds the frame number of every sample so gaps in the frame
/// numbering stretch the time step. The first and last samples, and samples
/// next to an unknown one, are unknown.
#[must_use]
pub fn acceleration(kmh: &[Option<f64>], frames: &[u32], fps: f64) -> Vec<Option<f64>> {
    let n = kmh.len();
    (0..n)
        .map(|i| {
            if i == 0 || i + 1 >= n {
                return None;
            }
            let (before, after) = (kmh[i - 1]?, kmh[i + 1]?);
            let dt = f64::from(frames[i + 1] - frames[i - 1]) / fps;
            finite((after - before) / dt)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_fill_single_dropout() {
        let filled = fill_drops(&known(&[10.0, 10.0, 1.0, 10.0, 10.0]));
        assert!((filled[2].unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(filled[0], Some(10.0));
        assert_eq!(filled[4], Some(10.0));
    }

    #[test]
    fn test_alternating_series_is_preserved() {
        let series = known(&[10.0, 1.0, 10.0, 1.0, 10.0]);
        assert_eq!(fill_drops(&series), series);
        // Applying the pass again changes nothing either
        assert_eq!(fill_drops(&fill_drops(&series)), series);
    }

    #[test]
    fn test_genuine_minimum_is_preserved() {
        // Neighbours disagree: a real dip in a decelerating swing
        let series = known(&[20.0, 12.0, 2.0, 4.0, 8.0]);
        assert_eq!(fill_drops(&series), series);
        // Below the noise floor
        let quiet = known(&[0.4, 0.0, 0.4]);
        assert_eq!(fill_drops(&quiet), quiet);
        // Only moderately low
        let shallow = known(&[10.0, 5.0, 10.0]);
        assert_eq!(fill_drops(&shallow), shallow);
    }

    #[test]
    fn test_fill_keeps_unknown() {
        let series = vec![Some(10.0), None, Some(10.0)];
        assert_eq!(fill_drops(&series), series);
    }

    #[test]
    fn test_kernel_smooth_constant_and_edges() {
        let smoothed = kernel_smooth(&known(&[5.0; 6]));
        for v in smoothed {
            assert!((v.unwrap() - 5.0).abs() < 1e-12);
        }

        // Edge renormalisation: [0.4, 0.2, 0.1] over [0, 10, 20]
        let edge = kernel_smooth(&known(&[0.0, 10.0, 20.0]));
        let expected = (0.4 * 0.0 + 0.2 * 10.0 + 0.1 * 20.0) / 0.7;
        assert!((edge[0].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_smooth_around_gap() {
        let series = vec![Some(1.0), Some(1.0), None, Some(3.0), Some(3.0)];
        let smoothed = kernel_smooth(&series);
        assert_eq!(smoothed[2], None);
        // Index 1 uses taps 0, 1 and 3 with weights 0.2, 0.4, 0.1
        let expected = (0.2 * 1.0 + 0.4 * 1.0 + 0.1 * 3.0) / 0.7;
        assert!((smoothed[1].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_interpolates_interior_gaps_only() {
        let series = vec![None, Some(2.0), None, Some(4.0), None];
        let averaged = moving_average(&series, 3);
        assert_eq!(averaged[0], None);
        assert_eq!(averaged[1], Some(2.0));
        assert_eq!(averaged[2], Some(3.0));
        assert_eq!(averaged[3], Some(4.0));
        assert_eq!(averaged[4], None);
    }

    #[test]
    fn test_moving_average_width_one_is_identity() {
        let series = vec![Some(1.0), None, Some(7.0)];
        assert_eq!(moving_average(&series, 1), series);
    }

    #[test]
    fn test_velocity_conversion() {
        // 1.7m player whose torso covers 30% of a 1000px frame
        let scale = VelocityScale::estimate([Some(300.0), None], 30.0, 1.7, 0.30, 100.0);
        assert!(!scale.used_fallback);
        assert!((scale.meters_per_pixel - 0.0017).abs() < 1e-12);
        let kmh = scale.to_kmh(1.0).unwrap();
        assert!((kmh - 0.0017 * 30.0 * 3.6).abs() < 1e-12);
        assert!((kmh - 0.1836).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_scale_fallback() {
        let scale = VelocityScale::estimate([None, None], 25.0, 1.7, 0.30, 100.0);
        assert!(scale.used_fallback);
        assert!((scale.meters_per_pixel - 0.0051).abs() < 1e-12);
        assert_eq!(scale.series_to_kmh(&[None]), vec![None]);
    }

    #[test]
    fn test_acceleration_centered_difference() {
        let kmh = known(&[0.0, 3.0, 6.0, 9.0]);
        let accel = acceleration(&kmh, &[0, 1, 2, 3], 30.0);
        assert_eq!(accel[0], None);
        assert!((accel[1].unwrap() - 90.0).abs() < 1e-9);
        assert!((accel[2].unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(accel[3], None);

        let gappy = vec![Some(0.0), None, Some(6.0), Some(9.0)];
        let accel = acceleration(&gappy, &[0, 1, 2, 3], 30.0);
        assert_eq!(accel[2], None);
        assert!((accel[1].unwrap() - 90.0).abs() < 1e-9);
    }
}
