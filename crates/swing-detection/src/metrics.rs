//! Per-frame biomechanical metrics
//!
//! Every measurement is an `Option<f64>`: `None` means the value could not be
//! measured reliably (occlusion, low confidence, missing previous frame) and
//! must show up as a gap downstream. It is never replaced by zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use swing_analysis_common::{mean_known, Side};
use swing_analysis_pose::Joint;

/// Left/right measurement plus the mean of the known sides
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SidedValue {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub combined: Option<f64>,
}

impl SidedValue {
    #[must_use]
    pub fn new(left: Option<f64>, right: Option<f64>) -> Self {
        Self {
            left,
            right,
            combined: mean_known([left, right]),
        }
    }

    #[must_use]
    pub fn side(&self, side: Side) -> Option<f64> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Replace one side and refresh the combined value
    pub fn set(&mut self, side: Side, value: Option<f64>) {
        match side {
            Side::Left => self.left = value,
            Side::Right => self.right = value,
        }
        self.combined = mean_known([self.left, self.right]);
    }

    fn push_values(&self, prefix: &str, out: &mut Vec<(String, Option<f64>)>) {
        out.push((format!("{prefix}.left"), self.left));
        out.push((format!("{prefix}.right"), self.right));
        out.push((format!("{prefix}.combined"), self.combined));
    }
}

/// Tracked body parts with a velocity series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Wrist,
    Elbow,
    Shoulder,
    Hip,
    Knee,
    Ankle,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Wrist,
        BodyPart::Elbow,
        BodyPart::Shoulder,
        BodyPart::Hip,
        BodyPart::Knee,
        BodyPart::Ankle,
    ];

    /// Keypoint of this part on one side
    #[must_use]
    pub fn joint(&self, side: Side) -> Joint {
        match self {
            BodyPart::Wrist => Joint::wrist(side),
            BodyPart::Elbow => Joint::elbow(side),
            BodyPart::Shoulder => Joint::shoulder(side),
            BodyPart::Hip => Joint::hip(side),
            BodyPart::Knee => Joint::knee(side),
            BodyPart::Ankle => Joint::ankle(side),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Wrist => "wrist",
            BodyPart::Elbow => "elbow",
            BodyPart::Shoulder => "shoulder",
            BodyPart::Hip => "hip",
            BodyPart::Knee => "knee",
            BodyPart::Ankle => "ankle",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Velocity series of one body part at one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartVelocity {
    /// Speed relative to the body center (px/frame)
    pub raw_px: SidedValue,
    /// Drop-filled and smoothed speed (px/frame)
    pub smoothed_px: SidedValue,
    /// Raw speed in km/h
    pub kmh: SidedValue,
    /// Smoothed speed in km/h
    pub smoothed_kmh: SidedValue,
    /// Acceleration from the smoothed km/h series (km/h per second)
    pub acceleration: SidedValue,
}

/// Velocities of all tracked body parts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocities {
    pub wrist: PartVelocity,
    pub elbow: PartVelocity,
    pub shoulder: PartVelocity,
    pub hip: PartVelocity,
    pub knee: PartVelocity,
    pub ankle: PartVelocity,
}

impl Velocities {
    #[must_use]
    pub fn part(&self, part: BodyPart) -> &PartVelocity {
        match part {
            BodyPart::Wrist => &self.wrist,
            BodyPart::Elbow => &self.elbow,
            BodyPart::Shoulder => &self.shoulder,
            BodyPart::Hip => &self.hip,
            BodyPart::Knee => &self.knee,
            BodyPart::Ankle => &self.ankle,
        }
    }

    pub fn part_mut(&mut self, part: BodyPart) -> &mut PartVelocity {
        match part {
            BodyPart::Wrist => &mut self.wrist,
            BodyPart::Elbow => &mut self.elbow,
            BodyPart::Shoulder => &mut self.shoulder,
            BodyPart::Hip => &mut self.hip,
            BodyPart::Knee => &mut self.knee,
            BodyPart::Ankle => &mut self.ankle,
        }
    }
}

/// Joints with a measured bend angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleJoint {
    Knee,
    Shoulder,
    Elbow,
    Hip,
}

impl AngleJoint {
    pub const ALL: [AngleJoint; 4] = [
        AngleJoint::Knee,
        AngleJoint::Shoulder,
        AngleJoint::Elbow,
        AngleJoint::Hip,
    ];

    /// The three keypoints (end, vertex, end) defining the angle on one side
    #[must_use]
    pub fn keypoints(&self, side: Side) -> (Joint, Joint, Joint) {
        match self {
            AngleJoint::Knee => (Joint::hip(side), Joint::knee(side), Joint::ankle(side)),
            AngleJoint::Shoulder => (Joint::elbow(side), Joint::shoulder(side), Joint::hip(side)),
            AngleJoint::Elbow => (Joint::shoulder(side), Joint::elbow(side), Joint::wrist(side)),
            AngleJoint::Hip => (Joint::shoulder(side), Joint::hip(side), Joint::knee(side)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AngleJoint::Knee => "knee",
            AngleJoint::Shoulder => "shoulder",
            AngleJoint::Elbow => "elbow",
            AngleJoint::Hip => "hip",
        }
    }
}

/// Bend angle of one joint (degrees, 0-180)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngle {
    pub raw: SidedValue,
    pub smoothed: SidedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngles {
    pub knee: JointAngle,
    pub shoulder: JointAngle,
    pub elbow: JointAngle,
    pub hip: JointAngle,
}

impl JointAngles {
    #[must_use]
    pub fn joint(&self, joint: AngleJoint) -> &JointAngle {
        match joint {
            AngleJoint::Knee => &self.knee,
            AngleJoint::Shoulder => &self.shoulder,
            AngleJoint::Elbow => &self.elbow,
            AngleJoint::Hip => &self.hip,
        }
    }

    pub fn joint_mut(&mut self, joint: AngleJoint) -> &mut JointAngle {
        match joint {
            AngleJoint::Knee => &mut self.knee,
            AngleJoint::Shoulder => &mut self.shoulder,
            AngleJoint::Elbow => &mut self.elbow,
            AngleJoint::Hip => &mut self.hip,
        }
    }
}

/// Trunk rotation signals (degrees and degrees/frame)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationMetrics {
    pub body_orientation: Option<f64>,
    pub orientation_delta: Option<f64>,
    pub hip_line_angle: Option<f64>,
    pub shoulder_line_angle: Option<f64>,
    pub hip_angular_velocity: Option<f64>,
    pub shoulder_angular_velocity: Option<f64>,
    /// Shoulder line minus hip line, wrapped into (-180, 180]
    pub x_factor: Option<f64>,
    /// Trunk rotation speed used for detection
    pub rotation_velocity: Option<f64>,
    pub smoothed_rotation_velocity: Option<f64>,
}

/// Phase of the swing a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingPhase {
    #[default]
    Neutral,
    Loading,
    Swing,
    Contact,
    Follow,
    Recovery,
}

impl fmt::Display for SwingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwingPhase::Neutral => "neutral",
            SwingPhase::Loading => "loading",
            SwingPhase::Swing => "swing",
            SwingPhase::Contact => "contact",
            SwingPhase::Follow => "follow",
            SwingPhase::Recovery => "recovery",
        };
        f.write_str(name)
    }
}

/// All metrics of one analyzed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub frame: u32,
    pub timestamp: f64,
    /// Shoulder-to-hip midpoint distance (px)
    pub torso_height: Option<f64>,
    pub velocity: Velocities,
    pub angles: JointAngles,
    pub rotation: RotationMetrics,
    /// Keypoint confidence of every joint present in the pose
    pub confidence: BTreeMap<Joint, f64>,
    /// Composite of wrist speed and rotation speed driving peak detection
    pub swing_score: Option<f64>,
    pub phase: SwingPhase,
}

impl FrameMetrics {
    /// Empty metrics for a frame; every measurement starts unknown
    #[must_use]
    pub fn new(frame: u32, timestamp: f64) -> Self {
        Self {
            frame,
            timestamp,
            torso_height: None,
            velocity: Velocities::default(),
            angles: JointAngles::default(),
            rotation: RotationMetrics::default(),
            confidence: BTreeMap::new(),
            swing_score: None,
            phase: SwingPhase::Neutral,
        }
    }

    /// Every numeric field with a dotted name, for validation and export
    #[must_use]
    pub fn numeric_values(&self) -> Vec<(String, Option<f64>)> {
        let mut out = Vec::with_capacity(128);
        out.push(("timestamp".to_string(), Some(self.timestamp)));
        out.push(("torso_height".to_string(), self.torso_height));

        for part in BodyPart::ALL {
            let v = self.velocity.part(part);
            let name = part.as_str();
            v.raw_px.push_values(&format!("velocity.{name}.raw_px"), &mut out);
            v.smoothed_px
                .push_values(&format!("velocity.{name}.smoothed_px"), &mut out);
            v.kmh.push_values(&format!("velocity.{name}.kmh"), &mut out);
            v.smoothed_kmh
                .push_values(&format!("velocity.{name}.smoothed_kmh"), &mut out);
            v.acceleration
                .push_values(&format!("velocity.{name}.acceleration"), &mut out);
        }

        for joint in AngleJoint::ALL {
            let a = self.angles.joint(joint);
            let name = joint.as_str();
            a.raw.push_values(&format!("angles.{name}.raw"), &mut out);
            a.smoothed
                .push_values(&format!("angles.{name}.smoothed"), &mut out);
        }

        let r = &self.rotation;
        for (name, value) in [
            ("body_orientation", r.body_orientation),
            ("orientation_delta", r.orientation_delta),
            ("hip_line_angle", r.hip_line_angle),
            ("shoulder_line_angle", r.shoulder_line_angle),
            ("hip_angular_velocity", r.hip_angular_velocity),
            ("shoulder_angular_velocity", r.shoulder_angular_velocity),
            ("x_factor", r.x_factor),
            ("rotation_velocity", r.rotation_velocity),
            ("smoothed_rotation_velocity", r.smoothed_rotation_velocity),
        ] {
            out.push((format!("rotation.{name}"), value));
        }

        for (joint, score) in &self.confidence {
            out.push((format!("confidence.{joint}"), Some(*score)));
        }
        out.push(("swing_score".to_string(), self.swing_score));
        out
    }

    /// Mean keypoint confidence over a set of joints
    #[must_use]
    pub fn mean_confidence(&self, joints: &[Joint]) -> Option<f64> {
        mean_known(joints.iter().map(|j| self.confidence.get(j).copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sided_value_combined() {
        let both = SidedValue::new(Some(2.0), Some(4.0));
        assert_eq!(both.combined, Some(3.0));
        let one = SidedValue::new(None, Some(4.0));
        assert_eq!(one.combined, Some(4.0));
        assert_eq!(one.side(Side::Left), None);
        assert_eq!(SidedValue::new(None, None).combined, None);

        let mut value = SidedValue::new(Some(2.0), None);
        value.set(Side::Right, Some(6.0));
        assert_eq!(value.combined, Some(4.0));
        value.set(Side::Left, None);
        assert_eq!(value.combined, Some(6.0));
    }

    #[test]
    fn test_new_frame_is_all_unknown() {
        let metrics = FrameMetrics::new(7, 0.25);
        assert_eq!(metrics.phase, SwingPhase::Neutral);
        let values = metrics.numeric_values();
        assert!(values.len() > 100);
        assert!(values
            .iter()
            .filter(|(name, _)| name != "timestamp")
            .all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_unknown_serializes_as_null() {
        let metrics = FrameMetrics::new(0, 0.0);
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json["swing_score"].is_null());
        assert!(json["velocity"]["wrist"]["raw_px"]["left"].is_null());
        assert_eq!(json["phase"], "neutral");
    }

    #[test]
    fn test_angle_keypoints() {
        assert_eq!(
            AngleJoint::Elbow.keypoints(Side::Right),
            (Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist)
        );
        assert_eq!(BodyPart::Ankle.joint(Side::Left), Joint::LeftAnkle);
    }
}
