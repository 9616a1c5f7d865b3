//! Stroke classification
//!
//! Heuristics are tried in order and the first one that decides wins:
//!
//! 1. **Serve**: a wrist well above the shoulders shortly before the peak.
//! 2. **Rotation direction**: sign of the trunk rotation around the peak.
//! 3. **Orientation bias**: which way the body is turned around the peak,
//!    used when the rotation is too small to read.
//!
//! Backhands are then split into one- and two-handed by how close the wrists
//! stay together. A shot none of the checks can read stays `Unknown`.

use crate::config::{seconds_to_frames, AnalysisConfig};
use crate::metrics::FrameMetrics;
use crate::peaks::DetectionSignals;
use crate::swing::SwingType;
use crate::track::PoseTrack;
use swing_analysis_common::{finite, mean_known, Side};
use swing_analysis_pose::Joint;
use tracing::debug;

/// Wrist height above the shoulder line (torso heights) that marks a serve
pub const SERVE_HEIGHT_THRESHOLD: f64 = 0.4;

/// Mean body orientation (degrees) that decides the orientation fallback
pub const ORIENTATION_THRESHOLD: f64 = 15.0;

/// Wrist spread (shoulder widths) at or below which a backhand is two-handed
pub const TWO_HANDED_THRESHOLD: f64 = 0.6;

/// Mean rotation velocity (degrees/frame) below which the direction is unreadable
pub const MIN_DIRECTION_ROTATION: f64 = 0.5;

const SERVE_LOOKBACK_SECONDS: f64 = 1.5;
const SERVE_LOOKAHEAD_SECONDS: f64 = 0.3;
const DIRECTION_WINDOW_SECONDS: f64 = 0.15;

const CONFIDENCE_JOINTS: [Joint; 4] = [
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftShoulder,
    Joint::RightShoulder,
];

/// Classifier verdict for one peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub swing_type: SwingType,
    pub dominant_side: Side,
    pub confidence: f64,
}

/// Classifies peaks of one analysis run
pub struct SwingClassifier<'a> {
    config: &'a AnalysisConfig,
    signals: &'a DetectionSignals,
    frames: &'a [FrameMetrics],
    track: &'a PoseTrack<'a>,
    fps: f64,
}

impl<'a> SwingClassifier<'a> {
    #[must_use]
    pub fn new(
        config: &'a AnalysisConfig,
        signals: &'a DetectionSignals,
        frames: &'a [FrameMetrics],
        track: &'a PoseTrack<'a>,
        fps: f64,
    ) -> Self {
        Self {
            config,
            signals,
            frames,
            track,
            fps,
        }
    }

    /// Classify the swing peaking at `peak` with swing score `score`
    #[must_use]
    pub fn classify(&self, peak: usize, score: f64, threshold: f64) -> Classification {
        let swing_type = self.swing_type(peak);
        let dominant_side = self.dominant_side(peak);
        let confidence = self.confidence(peak, score, threshold);
        debug!(
            "Frame {}: {} ({} side, confidence {:.2})",
            self.signals.frames[peak], swing_type, dominant_side, confidence
        );
        Classification {
            swing_type,
            dominant_side,
            confidence,
        }
    }

    fn swing_type(&self, peak: usize) -> SwingType {
        if self.is_serve(peak) {
            return SwingType::Serve;
        }
        let Some(forehand) = self
            .direction_from_rotation(peak)
            .or_else(|| self.direction_from_orientation(peak))
        else {
            return SwingType::Unknown;
        };
        if forehand {
            SwingType::Forehand
        } else if self.is_two_handed(peak) {
            SwingType::BackhandTwoHanded
        } else {
            SwingType::Backhand
        }
    }

    /// Maximum wrist height of either wrist before and around the peak
    #[must_use]
    pub fn max_wrist_height(&self, peak: usize) -> Option<f64> {
        let window = self.signals.window(
            peak,
            seconds_to_frames(SERVE_LOOKBACK_SECONDS, self.fps),
            seconds_to_frames(SERVE_LOOKAHEAD_SECONDS, self.fps),
        );
        window
            .flat_map(|i| [Side::Left, Side::Right].map(|side| self.track.wrist_height(i, side)))
            .flatten()
            .max_by(f64::total_cmp)
    }

    fn is_serve(&self, peak: usize) -> bool {
        self.max_wrist_height(peak)
            .is_some_and(|h| h > SERVE_HEIGHT_THRESHOLD)
    }

    fn direction_window(&self) -> u32 {
        seconds_to_frames(DIRECTION_WINDOW_SECONDS, self.fps)
    }

    /// `Some(true)` for a forehand, `Some(false)` for a backhand
    fn direction_from_rotation(&self, peak: usize) -> Option<bool> {
        let w = self.direction_window();
        let window = self.signals.window(peak, w, w);
        let mean = mean_known(self.signals.rotation[window].iter().copied())?;
        if mean.abs() < MIN_DIRECTION_ROTATION {
            return None;
        }
        Some(mean * self.config.handedness.sign() > 0.0)
    }

    /// Coiled toward the racket side before contact reads as a forehand.
    ///
    /// The mean absolute orientation decides whether the body is turned at
    /// all; the side comes from the circular mean, which stays put across the
    /// ±180° seam.
    fn direction_from_orientation(&self, peak: usize) -> Option<bool> {
        let w = self.direction_window();
        let window = self.signals.window(peak, 2 * w, w);
        let known: Vec<f64> = self.signals.orientation[window]
            .iter()
            .flatten()
            .copied()
            .collect();
        let turned = mean_known(known.iter().map(|o| Some(o.abs())))?;
        if turned < ORIENTATION_THRESHOLD {
            return None;
        }
        let heading = circular_mean(&known)?;
        if heading == 0.0 {
            return None;
        }
        Some(heading * self.config.handedness.sign() < 0.0)
    }

    fn is_two_handed(&self, peak: usize) -> bool {
        let w = self.direction_window();
        self.signals
            .window(peak, w, w)
            .filter_map(|i| self.track.wrist_spread(i))
            .min_by(f64::total_cmp)
            .is_some_and(|spread| spread <= TWO_HANDED_THRESHOLD)
    }

    /// The faster wrist at the peak, else the configured racket hand
    fn dominant_side(&self, peak: usize) -> Side {
        let wrist = &self.frames[peak].velocity.wrist.smoothed_px;
        match (wrist.left, wrist.right) {
            (Some(l), Some(r)) if l > r => Side::Left,
            (Some(l), Some(r)) if r > l => Side::Right,
            (Some(_), None) => Side::Left,
            (None, Some(_)) => Side::Right,
            _ => self.config.handedness.dominant_side(),
        }
    }

    /// Half score strength, half keypoint confidence
    fn confidence(&self, peak: usize, score: f64, threshold: f64) -> f64 {
        let strength = if threshold > 0.0 {
            (score / (2.0 * threshold)).min(1.0)
        } else {
            1.0
        };
        let keypoints = self.frames[peak]
            .mean_confidence(&CONFIDENCE_JOINTS)
            .unwrap_or(0.0);
        (0.5 * strength + 0.5 * keypoints).clamp(0.0, 1.0)
    }
}

/// Mean direction of angles in degrees, `None` when they cancel out
fn circular_mean(degrees: &[f64]) -> Option<f64> {
    let (sin, cos) = degrees.iter().fold((0.0, 0.0), |(s, c), d| {
        let (ds, dc) = d.to_radians().sin_cos();
        (s + ds, c + dc)
    });
    if sin.hypot(cos) < 1e-9 {
        return None;
    }
    finite(sin.atan2(cos).to_degrees())
}
