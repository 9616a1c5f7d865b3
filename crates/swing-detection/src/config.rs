//! Analysis configuration

use crate::SwingAnalysisError;
use serde::{Deserialize, Serialize};
use swing_analysis_common::{Handedness, Side};

/// Which wrist drives the swing score and the phase walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WristSelection {
    /// The racket hand according to the configured handedness
    Dominant,
    Left,
    Right,
    /// The faster of the two wrists
    #[default]
    Max,
    /// Mean of the two wrists
    Average,
}

impl WristSelection {
    /// Pick the wrist value for one frame
    #[must_use]
    pub fn select(
        &self,
        left: Option<f64>,
        right: Option<f64>,
        handedness: Handedness,
    ) -> Option<f64> {
        match self {
            WristSelection::Dominant => match handedness.dominant_side() {
                Side::Left => left,
                Side::Right => right,
            },
            WristSelection::Left => left,
            WristSelection::Right => right,
            WristSelection::Max => match (left, right) {
                (Some(l), Some(r)) => Some(l.max(r)),
                (l, r) => l.or(r),
            },
            WristSelection::Average => match (left, right) {
                (Some(l), Some(r)) => Some((l + r) / 2.0),
                (l, r) => l.or(r),
            },
        }
    }
}

/// Configuration for swing analysis
///
/// Every field has a default, so a partial JSON/YAML document only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum wrist speed at a swing peak (km/h)
    pub min_velocity_kmh: f64,
    /// Absolute floor of the adaptive swing-score threshold
    pub min_swing_score: f64,
    /// Percentile of the swing-score distribution used as threshold (0-100)
    pub score_percentile: f64,
    /// Wrist feeding the swing score
    pub wrist_selection: WristSelection,
    /// Reject peaks without trunk rotation
    pub require_rotation: bool,
    /// Minimum |rotation velocity| at a peak (degrees/frame)
    pub min_rotation_velocity: f64,
    /// Share of rotation speed in the swing score (0-1)
    pub rotation_weight: f64,
    /// Minimum time between two swings (seconds)
    pub min_time_between_swings: f64,
    /// Rotation speed that still counts as loading (degrees/frame)
    pub loading_rotation_threshold: f64,
    /// Fraction of the peak velocity used as the phase-walk reference
    pub contact_velocity_ratio: f64,
    /// Moving-average width for the smoothed series (frames)
    pub smoothing_window: usize,
    /// Keypoint confidence floor (0-1)
    pub min_confidence: f64,
    pub handedness: Handedness,
    /// Clip start before the end of the follow-through (seconds)
    pub clip_lead_time: f64,
    /// Clip end after the end of the follow-through (seconds)
    pub clip_trail_time: f64,
    /// Assumed height of the player (meters)
    pub person_height_m: f64,
    /// Torso length as a share of body height
    pub torso_to_height_ratio: f64,
    /// Torso height used when no frame yields a measurement (px)
    pub fallback_torso_height_px: f64,
    /// Pose used in multi-person frames
    pub selected_pose_index: usize,
    /// Clip overlap ratio above which two swings are merged (0-1)
    pub merge_overlap_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_velocity_kmh: 3.0,
            min_swing_score: 2.0,
            score_percentile: 75.0,
            wrist_selection: WristSelection::Max,
            require_rotation: true,
            min_rotation_velocity: 2.0,
            rotation_weight: 0.3,
            min_time_between_swings: 1.0,
            loading_rotation_threshold: 1.0,
            contact_velocity_ratio: 0.8,
            smoothing_window: 3,
            min_confidence: 0.3,
            handedness: Handedness::Right,
            clip_lead_time: 2.0,
            clip_trail_time: 1.0,
            person_height_m: 1.7,
            torso_to_height_ratio: 0.30,
            fallback_torso_height_px: 100.0,
            selected_pose_index: 0,
            merge_overlap_threshold: 0.7,
        }
    }
}

impl AnalysisConfig {
    /// Lower thresholds, no rotation requirement (slow or partial shots)
    #[must_use]
    pub fn sensitive() -> Self {
        Self {
            min_velocity_kmh: 1.5,
            min_swing_score: 1.0,
            score_percentile: 60.0,
            require_rotation: false,
            min_rotation_velocity: 1.0,
            min_time_between_swings: 0.7,
            ..Self::default()
        }
    }

    /// Higher thresholds for noisy footage with many false positives
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_velocity_kmh: 8.0,
            min_swing_score: 4.0,
            score_percentile: 85.0,
            min_rotation_velocity: 3.0,
            min_time_between_swings: 1.5,
            min_confidence: 0.5,
            ..Self::default()
        }
    }

    /// Check that every knob is within its meaningful range
    pub fn validate(&self) -> Result<(), SwingAnalysisError> {
        fn check(ok: bool, message: &str) -> Result<(), SwingAnalysisError> {
            if ok {
                Ok(())
            } else {
                Err(SwingAnalysisError::InvalidConfig(message.to_string()))
            }
        }

        let finite = [
            self.min_velocity_kmh,
            self.min_swing_score,
            self.score_percentile,
            self.min_rotation_velocity,
            self.rotation_weight,
            self.min_time_between_swings,
            self.loading_rotation_threshold,
            self.contact_velocity_ratio,
            self.min_confidence,
            self.clip_lead_time,
            self.clip_trail_time,
            self.person_height_m,
            self.torso_to_height_ratio,
            self.fallback_torso_height_px,
            self.merge_overlap_threshold,
        ];
        check(
            finite.iter().all(|v| v.is_finite()),
            "all numeric fields must be finite",
        )?;
        check(
            (0.0..=100.0).contains(&self.score_percentile),
            "score_percentile must be within [0, 100]",
        )?;
        check(
            (0.0..=1.0).contains(&self.rotation_weight),
            "rotation_weight must be within [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.min_confidence),
            "min_confidence must be within [0, 1]",
        )?;
        check(
            self.merge_overlap_threshold > 0.0 && self.merge_overlap_threshold <= 1.0,
            "merge_overlap_threshold must be within (0, 1]",
        )?;
        check(
            self.contact_velocity_ratio > 0.0 && self.contact_velocity_ratio <= 1.0,
            "contact_velocity_ratio must be within (0, 1]",
        )?;
        check(self.smoothing_window >= 1, "smoothing_window must be at least 1")?;
        check(
            self.person_height_m > 0.0
                && self.torso_to_height_ratio > 0.0
                && self.fallback_torso_height_px > 0.0,
            "body dimensions must be positive",
        )?;
        check(
            self.min_velocity_kmh >= 0.0
                && self.min_swing_score >= 0.0
                && self.min_rotation_velocity >= 0.0
                && self.loading_rotation_threshold >= 0.0,
            "thresholds must not be negative",
        )?;
        check(
            self.min_time_between_swings >= 0.0
                && self.clip_lead_time >= 0.0
                && self.clip_trail_time >= 0.0,
            "time spans must not be negative",
        )?;
        Ok(())
    }

    /// Minimum distance between two peaks in frames (at least one)
    #[must_use]
    pub fn min_peak_distance_frames(&self, fps: f64) -> u32 {
        seconds_to_frames(self.min_time_between_swings, fps).max(1)
    }
}

/// Convert a duration to a whole number of frames
#[must_use]
pub fn seconds_to_frames(seconds: f64, fps: f64) -> u32 {
    let frames = (seconds * fps).round();
    if frames.is_finite() && frames > 0.0 {
        frames as u32
    } else {
        0
    }
}
