//! Posture measurements read straight from the selected poses

use swing_analysis_common::{finite, Side};
use swing_analysis_pose::{Joint, KeypointIndexMap, Pose};

/// Shoulder widths below this (px) are too foreshortened to normalize by
const MIN_SHOULDER_WIDTH_PX: f64 = 1.0;

/// The selected pose of every analyzed frame
#[derive(Debug, Clone)]
pub struct PoseTrack<'a> {
    poses: Vec<Option<&'a Pose>>,
    map: &'a KeypointIndexMap,
    min_confidence: f64,
}

impl<'a> PoseTrack<'a> {
    #[must_use]
    pub fn new(
        poses: Vec<Option<&'a Pose>>,
        map: &'a KeypointIndexMap,
        min_confidence: f64,
    ) -> Self {
        Self {
            poses,
            map,
            min_confidence,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    #[must_use]
    pub fn pose(&self, index: usize) -> Option<&'a Pose> {
        self.poses.get(index).copied().flatten()
    }

    /// Height of a wrist above the shoulder line, in torso heights.
    ///
    /// Positive when the wrist is above the shoulders (image y grows downward).
    #[must_use]
    pub fn wrist_height(&self, index: usize, side: Side) -> Option<f64> {
        let pose = self.pose(index)?;
        let shoulders = pose.shoulder_center(self.map, self.min_confidence)?;
        let wrist = pose.confident_point(self.map, Joint::wrist(side), self.min_confidence)?;
        let torso = pose.torso_height(self.map, self.min_confidence)?;
        finite((shoulders.y - wrist.y) / torso)
    }

    /// Distance between the wrists in shoulder widths
    #[must_use]
    pub fn wrist_spread(&self, index: usize) -> Option<f64> {
        let pose = self.pose(index)?;
        let point = |joint| pose.confident_point(self.map, joint, self.min_confidence);
        let width = point(Joint::LeftShoulder)?.distance(point(Joint::RightShoulder)?);
        if width < MIN_SHOULDER_WIDTH_PX {
            return None;
        }
        let gap = point(Joint::LeftWrist)?.distance(point(Joint::RightWrist)?);
        finite(gap / width)
    }

    /// Image y of an ankle (px, larger is lower)
    #[must_use]
    pub fn ankle_y(&self, index: usize, side: Side) -> Option<f64> {
        let pose = self.pose(index)?;
        pose.confident_point(self.map, Joint::ankle(side), self.min_confidence)
            .map(|p| p.y)
    }
}
