//! Analysis result assembly

use crate::metrics::FrameMetrics;
use crate::swing::{DetectedSwing, SwingType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swing_analysis_common::mean_known;
use swing_analysis_pose::PoseModel;

/// Aggregate statistics over the detected swings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwingSummary {
    pub total_swings: usize,
    pub forehands: usize,
    pub backhands: usize,
    pub two_handed_backhands: usize,
    pub serves: usize,
    pub unknown: usize,
    pub average_peak_velocity_kmh: Option<f64>,
    pub max_peak_velocity_kmh: Option<f64>,
    pub average_rotation_range: Option<f64>,
    pub average_confidence: Option<f64>,
}

impl SwingSummary {
    #[must_use]
    pub fn from_swings(swings: &[DetectedSwing]) -> Self {
        let count = |t: SwingType| swings.iter().filter(|s| s.swing_type == t).count();
        Self {
            total_swings: swings.len(),
            forehands: count(SwingType::Forehand),
            backhands: count(SwingType::Backhand),
            two_handed_backhands: count(SwingType::BackhandTwoHanded),
            serves: count(SwingType::Serve),
            unknown: count(SwingType::Unknown),
            average_peak_velocity_kmh: mean_known(swings.iter().map(|s| Some(s.peak_velocity_kmh))),
            max_peak_velocity_kmh: swings
                .iter()
                .map(|s| s.peak_velocity_kmh)
                .max_by(f64::total_cmp),
            average_rotation_range: mean_known(swings.iter().map(|s| s.rotation_range)),
            average_confidence: mean_known(swings.iter().map(|s| Some(s.confidence))),
        }
    }
}

/// Facts about the analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub frame_count: usize,
    pub fps: f64,
    /// Span covered by the analyzed frames (seconds)
    pub duration_seconds: f64,
    pub pose_model: PoseModel,
    pub meters_per_pixel: f64,
    /// Average torso height behind the velocity scale (px)
    pub torso_height_px: f64,
    /// The configured fallback torso height was used
    pub used_fallback_scale: bool,
    /// Adaptive swing-score threshold; `None` when no score was known
    pub score_threshold: Option<f64>,
    pub analyzed_at: DateTime<Utc>,
}

/// Complete output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One entry per analyzed frame, in frame order
    pub frames: Vec<FrameMetrics>,
    /// Detected swings in frame order
    pub swings: Vec<DetectedSwing>,
    pub summary: SwingSummary,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Metrics of one frame
    #[must_use]
    pub fn frame(&self, frame: u32) -> Option<&FrameMetrics> {
        self.frames
            .binary_search_by_key(&frame, |m| m.frame)
            .ok()
            .map(|i| &self.frames[i])
    }

    /// Same frames, swings and summary, ignoring when the runs happened
    #[must_use]
    pub fn same_analysis(&self, other: &AnalysisResult) -> bool {
        let mut metadata = other.metadata.clone();
        metadata.analyzed_at = self.metadata.analyzed_at;
        self.frames == other.frames
            && self.swings == other.swings
            && self.summary == other.summary
            && self.metadata == metadata
    }
}
