//! Pose input model for swing analysis
//!
//! Keypoints arrive from an external pose detector (MoveNet / YOLOv8-Pose with
//! 17 COCO keypoints, or BlazePose with 33 landmarks). This crate holds the
//! per-frame pose containers, resolves named joints to model-specific keypoint
//! indices, and provides the geometry used by the metric extractor.
//!
//! # Example
//! ```no_run
//! use swing_analysis_pose::{Joint, PoseModel, PoseSequence};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let poses = PoseSequence::from_json_str(&std::fs::read_to_string("poses.json")?)?;
//! let map = poses.model.index_map();
//!
//! for frame in poses.frame_numbers() {
//!     if let Some(pose) = poses.selected_pose(frame, 0) {
//!         if let Some(wrist) = pose.confident_point(map, Joint::RightWrist, 0.3) {
//!             println!("frame {frame}: right wrist at ({:.0}, {:.0})", wrist.x, wrist.y);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod geometry;
pub mod orientation;

pub use geometry::{joint_angle, line_angle, wrap_degrees, Point};
pub use orientation::{OrientationEstimator, ShoulderWidthEstimator};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use swing_analysis_common::{AnalysisError, Side};
use tracing::info;

/// Supported pose model skeletons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoseModel {
    /// 17 COCO keypoints (MoveNet, YOLOv8-Pose)
    #[default]
    Coco17,
    /// 33 BlazePose landmarks (MediaPipe)
    BlazePose33,
}

impl PoseModel {
    /// Number of keypoints a pose of this model carries
    #[must_use]
    pub fn keypoint_count(&self) -> usize {
        match self {
            PoseModel::Coco17 => 17,
            PoseModel::BlazePose33 => 33,
        }
    }

    /// Joint index lookup for this model
    #[must_use]
    pub fn index_map(&self) -> &'static KeypointIndexMap {
        match self {
            PoseModel::Coco17 => &COCO17_INDICES,
            PoseModel::BlazePose33 => &BLAZEPOSE33_INDICES,
        }
    }

    /// Canonical identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseModel::Coco17 => "coco17",
            PoseModel::BlazePose33 => "blazepose33",
        }
    }
}

impl fmt::Display for PoseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseModel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coco17" | "coco" | "17" | "movenet" | "yolov8-pose" | "yolo" => Ok(PoseModel::Coco17),
            "blazepose33" | "blazepose" | "mediapipe" | "33" => Ok(PoseModel::BlazePose33),
            _ => Err(AnalysisError::UnsupportedPoseModel(s.to_string())),
        }
    }
}

impl TryFrom<String> for PoseModel {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PoseModel> for String {
    fn from(model: PoseModel) -> Self {
        model.as_str().to_string()
    }
}

/// The 13 joints used by the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const ALL: [Joint; 13] = [
        Joint::Nose,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// Human-readable name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        }
    }

    /// Body side, `None` for the nose
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        match self {
            Joint::Nose => None,
            Joint::LeftShoulder
            | Joint::LeftElbow
            | Joint::LeftWrist
            | Joint::LeftHip
            | Joint::LeftKnee
            | Joint::LeftAnkle => Some(Side::Left),
            _ => Some(Side::Right),
        }
    }

    #[must_use]
    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftShoulder,
            Side::Right => Joint::RightShoulder,
        }
    }

    #[must_use]
    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftElbow,
            Side::Right => Joint::RightElbow,
        }
    }

    #[must_use]
    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftWrist,
            Side::Right => Joint::RightWrist,
        }
    }

    #[must_use]
    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftHip,
            Side::Right => Joint::RightHip,
        }
    }

    #[must_use]
    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftKnee,
            Side::Right => Joint::RightKnee,
        }
    }

    #[must_use]
    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftAnkle,
            Side::Right => Joint::RightAnkle,
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed keypoint indices of the 13 analysis joints for one pose model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypointIndexMap {
    pub nose: usize,
    pub left_shoulder: usize,
    pub right_shoulder: usize,
    pub left_elbow: usize,
    pub right_elbow: usize,
    pub left_wrist: usize,
    pub right_wrist: usize,
    pub left_hip: usize,
    pub right_hip: usize,
    pub left_knee: usize,
    pub right_knee: usize,
    pub left_ankle: usize,
    pub right_ankle: usize,
}

impl KeypointIndexMap {
    /// Keypoint index of a joint
    #[must_use]
    pub fn index(&self, joint: Joint) -> usize {
        match joint {
            Joint::Nose => self.nose,
            Joint::LeftShoulder => self.left_shoulder,
            Joint::RightShoulder => self.right_shoulder,
            Joint::LeftElbow => self.left_elbow,
            Joint::RightElbow => self.right_elbow,
            Joint::LeftWrist => self.left_wrist,
            Joint::RightWrist => self.right_wrist,
            Joint::LeftHip => self.left_hip,
            Joint::RightHip => self.right_hip,
            Joint::LeftKnee => self.left_knee,
            Joint::RightKnee => self.right_knee,
            Joint::LeftAnkle => self.left_ankle,
            Joint::RightAnkle => self.right_ankle,
        }
    }
}

static COCO17_INDICES: KeypointIndexMap = KeypointIndexMap {
    nose: 0,
    left_shoulder: 5,
    right_shoulder: 6,
    left_elbow: 7,
    right_elbow: 8,
    left_wrist: 9,
    right_wrist: 10,
    left_hip: 11,
    right_hip: 12,
    left_knee: 13,
    right_knee: 14,
    left_ankle: 15,
    right_ankle: 16,
};

static BLAZEPOSE33_INDICES: KeypointIndexMap = KeypointIndexMap {
    nose: 0,
    left_shoulder: 11,
    right_shoulder: 12,
    left_elbow: 13,
    right_elbow: 14,
    left_wrist: 15,
    right_wrist: 16,
    left_hip: 23,
    right_hip: 24,
    left_knee: 25,
    right_knee: 26,
    left_ankle: 27,
    right_ankle: 28,
};

/// Single keypoint in pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate (pixels)
    pub x: f64,
    /// Y coordinate (pixels, growing downwards)
    pub y: f64,
    /// Depth, when the model provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence (0-1)
    #[serde(alias = "confidence")]
    pub score: f64,
    /// Keypoint name as reported by the detector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    /// Create a new 2D keypoint
    #[must_use]
    pub fn new(x: f64, y: f64, score: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            score,
            name: None,
        }
    }

    /// Confident enough and with usable coordinates
    #[must_use]
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.score >= min_confidence && self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One detected person
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Overall detection score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Pose {
    #[must_use]
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    /// Keypoint of a joint, regardless of confidence
    #[must_use]
    pub fn keypoint(&self, map: &KeypointIndexMap, joint: Joint) -> Option<&Keypoint> {
        self.keypoints.get(map.index(joint))
    }

    /// Position of a joint when its confidence reaches the floor
    #[must_use]
    pub fn confident_point(
        &self,
        map: &KeypointIndexMap,
        joint: Joint,
        min_confidence: f64,
    ) -> Option<Point> {
        self.keypoint(map, joint)
            .filter(|kp| kp.is_confident(min_confidence))
            .map(Keypoint::point)
    }

    /// Confidence score of a joint, if the keypoint exists
    #[must_use]
    pub fn confidence(&self, map: &KeypointIndexMap, joint: Joint) -> Option<f64> {
        self.keypoint(map, joint)
            .map(|kp| kp.score)
            .filter(|s| s.is_finite())
    }

    /// Mean of the confident shoulder and hip keypoints (needs at least two)
    #[must_use]
    pub fn body_center(&self, map: &KeypointIndexMap, min_confidence: f64) -> Option<Point> {
        let core = [
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftHip,
            Joint::RightHip,
        ];
        let points: Vec<Point> = core
            .iter()
            .filter_map(|&joint| self.confident_point(map, joint, min_confidence))
            .collect();
        if points.len() < 2 {
            return None;
        }
        Point::centroid(&points)
    }

    /// Midpoint of the confident shoulders (one shoulder is enough)
    #[must_use]
    pub fn shoulder_center(&self, map: &KeypointIndexMap, min_confidence: f64) -> Option<Point> {
        self.pair_center(map, Joint::LeftShoulder, Joint::RightShoulder, min_confidence)
    }

    /// Midpoint of the confident hips (one hip is enough)
    #[must_use]
    pub fn hip_center(&self, map: &KeypointIndexMap, min_confidence: f64) -> Option<Point> {
        self.pair_center(map, Joint::LeftHip, Joint::RightHip, min_confidence)
    }

    /// Vertical distance between shoulder and hip midpoints (pixels)
    #[must_use]
    pub fn torso_height(&self, map: &KeypointIndexMap, min_confidence: f64) -> Option<f64> {
        let shoulders = self.shoulder_center(map, min_confidence)?;
        let hips = self.hip_center(map, min_confidence)?;
        let height = (hips.y - shoulders.y).abs();
        (height >= MIN_TORSO_HEIGHT_PX && height.is_finite()).then_some(height)
    }

    fn pair_center(
        &self,
        map: &KeypointIndexMap,
        a: Joint,
        b: Joint,
        min_confidence: f64,
    ) -> Option<Point> {
        match (
            self.confident_point(map, a, min_confidence),
            self.confident_point(map, b, min_confidence),
        ) {
            (Some(pa), Some(pb)) => Some(pa.midpoint(pb)),
            (Some(p), None) | (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// Torso heights below this are treated as degenerate detections
pub const MIN_TORSO_HEIGHT_PX: f64 = 5.0;

/// Poses of a whole video, keyed by frame number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    /// Video frame rate
    pub fps: f64,
    /// Skeleton layout of every pose in the sequence
    #[serde(default)]
    pub model: PoseModel,
    /// Frame number → detected poses (possibly several people)
    pub frames: BTreeMap<u32, Vec<Pose>>,
}

impl PoseSequence {
    #[must_use]
    pub fn new(fps: f64, model: PoseModel) -> Self {
        Self {
            fps,
            model,
            frames: BTreeMap::new(),
        }
    }

    /// Parse a sequence from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let sequence: PoseSequence = serde_json::from_str(json)?;
        info!(
            "Loaded {} pose frames ({} model, {:.2} fps)",
            sequence.len(),
            sequence.model,
            sequence.fps
        );
        Ok(sequence)
    }

    /// Record the poses detected in one frame
    pub fn insert(&mut self, frame: u32, poses: Vec<Pose>) {
        self.frames.insert(frame, poses);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame numbers in ascending order
    pub fn frame_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.keys().copied()
    }

    /// Timestamp of a frame in seconds
    #[must_use]
    pub fn timestamp(&self, frame: u32) -> f64 {
        if self.fps > 0.0 {
            f64::from(frame) / self.fps
        } else {
            0.0
        }
    }

    /// Pose at `index` in a frame; `None` when the frame or person is missing
    #[must_use]
    pub fn selected_pose(&self, frame: u32, index: usize) -> Option<&Pose> {
        self.frames.get(&frame).and_then(|poses| poses.get(index))
    }

    /// Time span covered by the sequence in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        match (self.frames.keys().next(), self.frames.keys().next_back()) {
            (Some(&first), Some(&last)) if self.fps > 0.0 => {
                f64::from(last - first + 1) / self.fps
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coco_pose(points: &[(Joint, f64, f64)], score: f64) -> Pose {
        let map = PoseModel::Coco17.index_map();
        let mut keypoints = vec![Keypoint::new(0.0, 0.0, 0.0); 17];
        for &(joint, x, y) in points {
            keypoints[map.index(joint)] = Keypoint::new(x, y, score);
        }
        Pose::new(keypoints)
    }

    #[test]
    fn test_index_maps() {
        let coco = PoseModel::Coco17.index_map();
        assert_eq!(coco.index(Joint::Nose), 0);
        assert_eq!(coco.index(Joint::LeftShoulder), 5);
        assert_eq!(coco.index(Joint::RightWrist), 10);
        assert_eq!(coco.index(Joint::RightAnkle), 16);

        let blaze = PoseModel::BlazePose33.index_map();
        assert_eq!(blaze.index(Joint::LeftShoulder), 11);
        assert_eq!(blaze.index(Joint::RightWrist), 16);
        assert_eq!(blaze.index(Joint::LeftHip), 23);
        assert_eq!(blaze.index(Joint::RightAnkle), 28);

        for joint in Joint::ALL {
            assert!(coco.index(joint) < PoseModel::Coco17.keypoint_count());
            assert!(blaze.index(joint) < PoseModel::BlazePose33.keypoint_count());
        }
    }

    #[test]
    fn test_pose_model_parsing() {
        assert_eq!("MoveNet".parse::<PoseModel>().unwrap(), PoseModel::Coco17);
        assert_eq!("17".parse::<PoseModel>().unwrap(), PoseModel::Coco17);
        assert_eq!(
            "BlazePose".parse::<PoseModel>().unwrap(),
            PoseModel::BlazePose33
        );
        assert!(matches!(
            "openpose".parse::<PoseModel>(),
            Err(AnalysisError::UnsupportedPoseModel(_))
        ));
    }

    #[test]
    fn test_sequence_json() {
        let json = r#"{
            "fps": 30.0,
            "model": "movenet",
            "frames": {
                "3": [{"keypoints": [{"x": 1.0, "y": 2.0, "score": 0.9}]}],
                "1": []
            }
        }"#;
        let seq = PoseSequence::from_json_str(json).unwrap();
        assert_eq!(seq.model, PoseModel::Coco17);
        assert_eq!(seq.frame_numbers().collect::<Vec<_>>(), vec![1, 3]);
        assert!(seq.selected_pose(1, 0).is_none());
        assert_eq!(seq.selected_pose(3, 0).unwrap().keypoints[0].y, 2.0);
        assert!((seq.timestamp(3) - 0.1).abs() < 1e-12);
        assert!((seq.duration() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_body_center_needs_two_core_points() {
        let map = PoseModel::Coco17.index_map();
        let one = coco_pose(&[(Joint::LeftShoulder, 10.0, 10.0)], 0.9);
        assert!(one.body_center(map, 0.3).is_none());

        let two = coco_pose(
            &[(Joint::LeftShoulder, 10.0, 10.0), (Joint::RightHip, 30.0, 50.0)],
            0.9,
        );
        let center = two.body_center(map, 0.3).unwrap();
        assert_eq!(center, Point::new(20.0, 30.0));

        let weak = coco_pose(
            &[(Joint::LeftShoulder, 10.0, 10.0), (Joint::RightHip, 30.0, 50.0)],
            0.1,
        );
        assert!(weak.body_center(map, 0.3).is_none());
    }

    #[test]
    fn test_torso_height() {
        let map = PoseModel::Coco17.index_map();
        let pose = coco_pose(
            &[
                (Joint::LeftShoulder, 60.0, 100.0),
                (Joint::RightShoulder, 40.0, 100.0),
                (Joint::LeftHip, 55.0, 300.0),
            ],
            0.8,
        );
        assert_eq!(pose.torso_height(map, 0.3), Some(200.0));
        assert!(pose.torso_height(map, 0.9).is_none());
    }
}
