//! Body orientation estimation
//!
//! The extractor only needs a signed body angle per frame and the direction of
//! body segments. [`OrientationEstimator`] is the seam for plugging in a better
//! estimator (e.g. one using 3D landmarks); [`ShoulderWidthEstimator`] is the
//! default 2D implementation.

use crate::geometry::{line_angle, wrap_degrees, Point};
use crate::{Joint, KeypointIndexMap, Pose};

/// Estimates how far the body is turned away from the camera
pub trait OrientationEstimator: Send + Sync {
    /// Signed body orientation in degrees, (-180, 180]; 0 means facing the camera
    fn body_orientation(
        &self,
        pose: &Pose,
        map: &KeypointIndexMap,
        min_confidence: f64,
    ) -> Option<f64>;

    /// Direction of a body segment (hip line, shoulder line) in degrees
    fn segment_angle(&self, from: Point, to: Point) -> Option<f64> {
        line_angle(from, to)
    }
}

/// Orientation from shoulder foreshortening.
///
/// A frontal torso shows shoulders roughly `frontal_shoulder_ratio` torso
/// heights apart; the narrower they appear, the further the body is turned.
/// The turn direction comes from shoulder depth when the model reports it,
/// otherwise from the nose offset relative to the shoulder midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoulderWidthEstimator {
    /// Apparent shoulder width of a frontal pose, in torso heights
    pub frontal_shoulder_ratio: f64,
}

impl Default for ShoulderWidthEstimator {
    fn default() -> Self {
        Self {
            frontal_shoulder_ratio: 0.6,
        }
    }
}

/// Nose offsets smaller than this (pixels) carry no direction
const NOSE_OFFSET_DEADBAND_PX: f64 = 1.0;

impl OrientationEstimator for ShoulderWidthEstimator {
    fn body_orientation(
        &self,
        pose: &Pose,
        map: &KeypointIndexMap,
        min_confidence: f64,
    ) -> Option<f64> {
        let left = pose.keypoint(map, Joint::LeftShoulder)?;
        let right = pose.keypoint(map, Joint::RightShoulder)?;
        if !left.is_confident(min_confidence) || !right.is_confident(min_confidence) {
            return None;
        }
        let torso = pose.torso_height(map, min_confidence)?;

        // In-plane tilt keeps the shoulder distance; only a turn foreshortens it
        let width = left.point().distance(right.point());
        let ratio = (width / (torso * self.frontal_shoulder_ratio)).min(1.0);
        let turn = ratio.acos().to_degrees();

        let direction = match (left.z, right.z) {
            (Some(lz), Some(rz)) if (lz - rz).abs() > f64::EPSILON => (lz - rz).signum(),
            _ => {
                let mid = left.point().midpoint(right.point());
                match pose.confident_point(map, Joint::Nose, min_confidence) {
                    Some(nose) if (nose.x - mid.x).abs() >= NOSE_OFFSET_DEADBAND_PX => {
                        (nose.x - mid.x).signum()
                    }
                    _ => 1.0,
                }
            }
        };

        let facing_camera = facing_camera(pose, map, min_confidence, left.point(), right.point());
        let angle = if facing_camera {
            direction * turn
        } else {
            direction * (180.0 - turn)
        };
        let angle = wrap_degrees(angle);
        angle.is_finite().then_some(angle)
    }
}

/// Facing the camera puts the right shoulder on the image left of the torso
/// axis (hip centre to shoulder centre); without hips the image x order decides
fn facing_camera(
    pose: &Pose,
    map: &KeypointIndexMap,
    min_confidence: f64,
    left: Point,
    right: Point,
) -> bool {
    let across = left.sub(right);
    match (
        pose.shoulder_center(map, min_confidence),
        pose.hip_center(map, min_confidence),
    ) {
        (Some(shoulders), Some(hips)) => {
            let up = shoulders.sub(hips);
            across.x * up.y - across.y * up.x <= 0.0
        }
        _ => across.x >= 0.0,
    }
}
