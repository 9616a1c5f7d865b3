//! Detected swing types

use serde::{Deserialize, Serialize};
use std::fmt;
use swing_analysis_common::Side;

/// Stroke classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingType {
    Forehand,
    Backhand,
    BackhandTwoHanded,
    Serve,
    /// No heuristic gave a direction; reported as-is
    #[default]
    Unknown,
}

impl SwingType {
    pub const ALL: [SwingType; 5] = [
        SwingType::Forehand,
        SwingType::Backhand,
        SwingType::BackhandTwoHanded,
        SwingType::Serve,
        SwingType::Unknown,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SwingType::Forehand => "forehand",
            SwingType::Backhand => "backhand",
            SwingType::BackhandTwoHanded => "backhand_two_handed",
            SwingType::Serve => "serve",
            SwingType::Unknown => "unknown",
        }
    }

    /// Either backhand variant
    #[must_use]
    pub fn is_backhand(&self) -> bool {
        matches!(self, SwingType::Backhand | SwingType::BackhandTwoHanded)
    }
}

impl fmt::Display for SwingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase boundaries as frame numbers.
///
/// Always ordered `loading_start <= swing_start <= contact <= follow_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBoundaries {
    pub loading_start: u32,
    pub swing_start: u32,
    pub contact: u32,
    pub follow_end: u32,
}

impl PhaseBoundaries {
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.loading_start <= self.swing_start
            && self.swing_start <= self.contact
            && self.contact <= self.follow_end
    }
}

/// A frame of interest inside a swing with an associated measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPosition {
    pub frame: u32,
    pub timestamp: f64,
    /// Meaning depends on the position: coil angle (degrees) for the loading
    /// peak, wrist height in torso heights for trophy and contact point,
    /// ankle image y (px) for the landing
    pub value: Option<f64>,
}

/// Serve key positions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ServePositions {
    /// Maximum arm elevation before the forward swing
    pub trophy: Option<KeyPosition>,
    /// Highest point of the racket wrist
    pub contact_point: Option<KeyPosition>,
    /// Front foot back on the ground
    pub landing: Option<KeyPosition>,
}

/// Key frames of a swing, depending on the stroke
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyPositions {
    /// Frame of maximum coil (groundstrokes)
    pub loading_peak: Option<KeyPosition>,
    pub serve: Option<ServePositions>,
}

/// Playback window exported around a swing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipWindow {
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: u32,
    pub end_frame: u32,
}

impl ClipWindow {
    /// Inclusive number of frames covered
    #[must_use]
    pub fn frame_span(&self) -> u32 {
        self.end_frame.saturating_sub(self.start_frame) + 1
    }

    /// Frames covered by both windows (inclusive)
    #[must_use]
    pub fn overlap_frames(&self, other: &ClipWindow) -> u32 {
        let start = self.start_frame.max(other.start_frame);
        let end = self.end_frame.min(other.end_frame);
        if end < start {
            0
        } else {
            end - start + 1
        }
    }
}

/// One detected swing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSwing {
    pub contact_frame: u32,
    pub contact_timestamp: f64,
    /// Selected-wrist speed at contact (px/frame, smoothed)
    pub peak_velocity_px: f64,
    /// Selected-wrist speed at contact (km/h, smoothed)
    pub peak_velocity_kmh: f64,
    /// Total trunk turn accumulated between loading start and follow end (degrees)
    pub rotation_range: Option<f64>,
    /// Signed rotation velocity with the largest magnitude during the swing
    pub peak_rotation_velocity: Option<f64>,
    pub swing_score: f64,
    pub swing_type: SwingType,
    pub dominant_side: Side,
    /// Detection confidence (0-1)
    pub confidence: f64,
    pub phases: PhaseBoundaries,
    pub key_positions: KeyPositions,
    pub clip: ClipWindow,
}

impl DetectedSwing {
    /// Duration from swing start to follow end in frames
    #[must_use]
    pub fn stroke_frames(&self) -> u32 {
        self.phases.follow_end - self.phases.swing_start
    }
}
