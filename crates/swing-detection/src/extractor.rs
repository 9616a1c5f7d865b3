//! Per-frame metric extraction
//!
//! Turns consecutive poses into raw velocities, joint angles and rotation
//! signals. Velocities are measured relative to the body center so camera pans
//! and the player running across the court do not register as arm speed.

use crate::metrics::{AngleJoint, BodyPart, FrameMetrics, SidedValue};
use swing_analysis_common::{finite, Side};
use swing_analysis_pose::{
    joint_angle, wrap_degrees, Joint, KeypointIndexMap, OrientationEstimator, Pose,
};

/// One analyzed frame of input
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub frame: u32,
    pub timestamp: f64,
    pub pose: Option<&'a Pose>,
}

/// Computes raw per-frame metrics from poses
pub struct MetricExtractor<'a> {
    map: &'a KeypointIndexMap,
    min_confidence: f64,
    estimator: &'a dyn OrientationEstimator,
}

impl<'a> MetricExtractor<'a> {
    #[must_use]
    pub fn new(
        map: &'a KeypointIndexMap,
        min_confidence: f64,
        estimator: &'a dyn OrientationEstimator,
    ) -> Self {
        Self {
            map,
            min_confidence,
            estimator,
        }
    }

    /// Raw metrics for every frame, in input order.
    ///
    /// Each frame is compared with the previous analyzed frame; the first frame
    /// and frames following a missing pose have unknown velocities.
    #[must_use]
    pub fn extract(&self, frames: &[FrameInput<'_>]) -> Vec<FrameMetrics> {
        let mut metrics = Vec::with_capacity(frames.len());
        let mut previous: Option<(u32, &Pose)> = None;

        for input in frames {
            metrics.push(self.frame_metrics(input, previous));
            previous = input.pose.map(|pose| (input.frame, pose));
        }
        metrics
    }

    fn frame_metrics(
        &self,
        input: &FrameInput<'_>,
        previous: Option<(u32, &Pose)>,
    ) -> FrameMetrics {
        let mut metrics = FrameMetrics::new(input.frame, input.timestamp);
        let Some(pose) = input.pose else {
            return metrics;
        };

        for joint in Joint::ALL {
            if let Some(score) = pose.confidence(self.map, joint) {
                metrics.confidence.insert(joint, score);
            }
        }
        metrics.torso_height = pose.torso_height(self.map, self.min_confidence);

        for joint in AngleJoint::ALL {
            metrics.angles.joint_mut(joint).raw = SidedValue::new(
                self.joint_angle(pose, joint, Side::Left),
                self.joint_angle(pose, joint, Side::Right),
            );
        }

        let orientation = self
            .estimator
            .body_orientation(pose, self.map, self.min_confidence);
        let hip_line = self.segment_angle(pose, Joint::LeftHip, Joint::RightHip);
        let shoulder_line = self.segment_angle(pose, Joint::LeftShoulder, Joint::RightShoulder);

        let rotation = &mut metrics.rotation;
        rotation.body_orientation = orientation;
        rotation.hip_line_angle = hip_line;
        rotation.shoulder_line_angle = shoulder_line;
        rotation.x_factor = match (shoulder_line, hip_line) {
            (Some(s), Some(h)) => finite(wrap_degrees(s - h)),
            _ => None,
        };

        let Some((prev_frame, prev_pose)) = previous else {
            return metrics;
        };
        let gap = f64::from(input.frame.saturating_sub(prev_frame).max(1));

        let prev_orientation =
            self.estimator
                .body_orientation(prev_pose, self.map, self.min_confidence);
        let prev_hip_line = self.segment_angle(prev_pose, Joint::LeftHip, Joint::RightHip);
        let prev_shoulder_line =
            self.segment_angle(prev_pose, Joint::LeftShoulder, Joint::RightShoulder);

        let rotation = &mut metrics.rotation;
        rotation.orientation_delta = angular_velocity(prev_orientation, orientation, gap);
        rotation.hip_angular_velocity = angular_velocity(prev_hip_line, hip_line, gap);
        rotation.shoulder_angular_velocity =
            angular_velocity(prev_shoulder_line, shoulder_line, gap);
        rotation.rotation_velocity = trunk_rotation(
            rotation.shoulder_angular_velocity,
            rotation.orientation_delta,
        );

        let center = pose.body_center(self.map, self.min_confidence);
        let prev_center = prev_pose.body_center(self.map, self.min_confidence);
        if let (Some(center), Some(prev_center)) = (center, prev_center) {
            for part in BodyPart::ALL {
                let velocity = |side: Side| {
                    let joint = part.joint(side);
                    let now = pose.confident_point(self.map, joint, self.min_confidence)?;
                    let before =
                        prev_pose.confident_point(self.map, joint, self.min_confidence)?;
                    let displacement = now.sub(center).distance(before.sub(prev_center));
                    finite(displacement / gap)
                };
                metrics.velocity.part_mut(part).raw_px =
                    SidedValue::new(velocity(Side::Left), velocity(Side::Right));
            }
        }

        metrics
    }

    fn joint_angle(&self, pose: &Pose, joint: AngleJoint, side: Side) -> Option<f64> {
        let (a, vertex, c) = joint.keypoints(side);
        joint_angle(
            pose.confident_point(self.map, a, self.min_confidence)?,
            pose.confident_point(self.map, vertex, self.min_confidence)?,
            pose.confident_point(self.map, c, self.min_confidence)?,
        )
    }

    fn segment_angle(&self, pose: &Pose, from: Joint, to: Joint) -> Option<f64> {
        self.estimator.segment_angle(
            pose.confident_point(self.map, from, self.min_confidence)?,
            pose.confident_point(self.map, to, self.min_confidence)?,
        )
    }
}

/// Wrapped angle change per frame
fn angular_velocity(before: Option<f64>, after: Option<f64>, gap: f64) -> Option<f64> {
    finite(wrap_degrees(after? - before?) / gap)
}

/// Trunk rotation speed from the two views of the turn.
///
/// A tilt in the image plane moves the shoulder line; a turn around the
/// vertical axis only narrows the shoulders and shows up in the orientation.
/// The faster of the two wins, the shoulder line on a tie.
fn trunk_rotation(shoulder_line: Option<f64>, orientation: Option<f64>) -> Option<f64> {
    match (shoulder_line, orientation) {
        (Some(s), Some(o)) if o.abs() > s.abs() => Some(o),
        (Some(s), _) => Some(s),
        (None, o) => o,
    }
}

/// Blend of wrist speed and trunk rotation speed.
///
/// `rotation_weight` is the share of the rotation term. The rotation term is
/// only required when it carries weight.
#[must_use]
pub fn swing_score(
    wrist_velocity: Option<f64>,
    rotation_velocity: Option<f64>,
    rotation_weight: f64,
) -> Option<f64> {
    let wrist = wrist_velocity?;
    if rotation_weight <= 0.0 {
        return finite(wrist);
    }
    let rotation = rotation_velocity?.abs();
    finite((1.0 - rotation_weight) * wrist + rotation_weight * rotation)
}
