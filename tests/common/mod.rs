//! Synthetic rally generator for integration tests and benchmarks
//!
//! A frontal player with a 200px torso centred at (500, 500). Every stroke is a
//! Gaussian burst (σ = 4 frames) of racket-wrist angular speed around the body
//! centre, paired with a burst of trunk rotation whose sign tells forehand from
//! backhand. The trunk turns back to neutral 30 frames after contact. By
//! default the trunk tilts the shoulder line in the image plane; an axial rally
//! turns it around the vertical axis instead, which only narrows the shoulders.
//! The motion is noise-free, so expected values can be derived by hand:
//!
//! - peak wrist speed 150px × 0.4 rad/frame ≈ 60px/frame
//! - peak rotation 8°/frame, about 80° per stroke
//! - 1.7m × 0.30 / 200px = 0.00255 m/px

#![allow(dead_code)]

use swing_analysis::pose::Joint;
use swing_analysis::{Keypoint, Pose, PoseModel, PoseSequence};

pub const FPS: f64 = 30.0;

const CENTER: (f64, f64) = (500.0, 500.0);
const SHOULDER_HALF_WIDTH: f64 = 60.0;
const HIP_HALF_WIDTH: f64 = 40.0;
const ARM_LENGTH: f64 = 150.0;
const PARKED_WRIST: (f64, f64) = (700.0, 700.0);

const SIGMA: f64 = 4.0;
const WRIST_SPEED: f64 = 0.4;
const ROTATION_SPEED: f64 = 8.0;
const RECOVERY_OFFSET: f64 = 30.0;
const RECOVERY_SIGMA: f64 = 8.0;
/// Nose shift per unit of sin(turn) in an axial rally
const NOSE_LEAD: f64 = 20.0;

/// Toss arm apex relative to the contact frame
const TOSS_OFFSET: i64 = -40;
const TOSS_SIGMA: f64 = 12.0;
/// Rise of the toss wrist: from y = 700 to 0.6 torso heights above the shoulders
const TOSS_RISE: f64 = 420.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Forehand,
    Backhand,
    TwoHandedBackhand,
    Serve,
}

impl Stroke {
    /// Shoulder rotation direction for a right-handed player
    fn rotation_sign(self) -> f64 {
        match self {
            Stroke::Forehand | Stroke::Serve => 1.0,
            Stroke::Backhand | Stroke::TwoHandedBackhand => -1.0,
        }
    }
}

/// Builder for a synthetic pose sequence
#[derive(Debug, Clone)]
pub struct Rally {
    frames: u32,
    model: PoseModel,
    strokes: Vec<(u32, Stroke)>,
    dropped: Vec<u32>,
    axial: bool,
}

impl Rally {
    pub fn new(frames: u32) -> Self {
        Self {
            frames,
            model: PoseModel::Coco17,
            strokes: Vec::new(),
            dropped: Vec::new(),
            axial: false,
        }
    }

    /// Turn the trunk around the vertical axis instead of tilting it
    pub fn axial(mut self) -> Self {
        self.axial = true;
        self
    }

    pub fn model(mut self, model: PoseModel) -> Self {
        self.model = model;
        self
    }

    /// Add a stroke whose wrist speed peaks at `contact`
    pub fn stroke(mut self, contact: u32, stroke: Stroke) -> Self {
        self.strokes.push((contact, stroke));
        self
    }

    /// Frames where the detector found nobody
    pub fn drop_frames(mut self, frames: impl IntoIterator<Item = u32>) -> Self {
        self.dropped.extend(frames);
        self
    }

    fn burst(&self, frame: u32) -> (f64, f64) {
        self.strokes
            .iter()
            .fold((0.0, 0.0), |(wrist, rotation), &(contact, stroke)| {
                let t = f64::from(frame) - f64::from(contact);
                let g = gaussian(t, SIGMA);
                // Same area as the burst, so the trunk ends where it started
                let back = gaussian(t - RECOVERY_OFFSET, RECOVERY_SIGMA) * SIGMA / RECOVERY_SIGMA;
                (
                    wrist + WRIST_SPEED * g,
                    rotation + stroke.rotation_sign() * ROTATION_SPEED * (g - back),
                )
            })
    }

    fn toss_rise(&self, frame: u32) -> f64 {
        self.strokes
            .iter()
            .filter(|(_, stroke)| *stroke == Stroke::Serve)
            .map(|&(contact, _)| {
                let apex = i64::from(contact) + TOSS_OFFSET;
                TOSS_RISE * gaussian((i64::from(frame) - apex) as f64, TOSS_SIGMA)
            })
            .sum()
    }

    pub fn build(&self) -> PoseSequence {
        // Both hands stay on the racket for a whole two-handed rally
        let two_handed = self
            .strokes
            .iter()
            .any(|(_, stroke)| *stroke == Stroke::TwoHandedBackhand);

        let mut sequence = PoseSequence::new(FPS, self.model);
        let mut arm = 0.0_f64;
        let mut trunk = 0.0_f64;

        for frame in 0..self.frames {
            let (d_arm, d_trunk) = self.burst(frame);
            arm += d_arm;
            trunk += d_trunk;

            if self.dropped.contains(&frame) {
                sequence.insert(frame, Vec::new());
                continue;
            }

            let right_wrist = (
                CENTER.0 + ARM_LENGTH * arm.cos(),
                CENTER.1 + ARM_LENGTH * arm.sin(),
            );
            let left_wrist = if two_handed {
                (right_wrist.0 + 20.0, right_wrist.1)
            } else {
                (PARKED_WRIST.0, PARKED_WRIST.1 - self.toss_rise(frame))
            };
            let pose = if self.axial {
                turned_player_pose(self.model, trunk, right_wrist, left_wrist)
            } else {
                player_pose(self.model, trunk, right_wrist, left_wrist)
            };
            sequence.insert(frame, vec![pose]);
        }
        sequence
    }
}

fn gaussian(t: f64, sigma: f64) -> f64 {
    (-(t * t) / (2.0 * sigma * sigma)).exp()
}

/// Frontal player with the shoulders turned `trunk` degrees in the image plane
/// and the hips half as far
pub fn player_pose(
    model: PoseModel,
    trunk: f64,
    right_wrist: (f64, f64),
    left_wrist: (f64, f64),
) -> Pose {
    let map = model.index_map();
    let mut keypoints = vec![Keypoint::new(0.0, 0.0, 0.0); model.keypoint_count()];
    let mut set = |joint: Joint, (x, y): (f64, f64)| {
        keypoints[map.index(joint)] = Keypoint::new(x, y, 0.9);
    };

    let (s, c) = trunk.to_radians().sin_cos();
    let (hs, hc) = (trunk / 2.0).to_radians().sin_cos();
    let left_shoulder = (
        CENTER.0 + SHOULDER_HALF_WIDTH * c,
        400.0 + SHOULDER_HALF_WIDTH * s,
    );
    let right_shoulder = (
        CENTER.0 - SHOULDER_HALF_WIDTH * c,
        400.0 - SHOULDER_HALF_WIDTH * s,
    );
    let midpoint = |a: (f64, f64), b: (f64, f64)| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);

    set(Joint::Nose, (CENTER.0, 330.0));
    set(Joint::LeftShoulder, left_shoulder);
    set(Joint::RightShoulder, right_shoulder);
    set(Joint::LeftElbow, midpoint(left_shoulder, left_wrist));
    set(Joint::RightElbow, midpoint(right_shoulder, right_wrist));
    set(Joint::LeftWrist, left_wrist);
    set(Joint::RightWrist, right_wrist);
    set(
        Joint::LeftHip,
        (CENTER.0 + HIP_HALF_WIDTH * hc, 600.0 + HIP_HALF_WIDTH * hs),
    );
    set(
        Joint::RightHip,
        (CENTER.0 - HIP_HALF_WIDTH * hc, 600.0 - HIP_HALF_WIDTH * hs),
    );
    set(Joint::LeftKnee, (540.0, 750.0));
    set(Joint::RightKnee, (460.0, 750.0));
    set(Joint::LeftAnkle, (540.0, 900.0));
    set(Joint::RightAnkle, (460.0, 900.0));
    Pose::new(keypoints)
}

/// Player with level shoulders, turned `trunk` degrees around the vertical
/// axis and the hips half as far; the nose leads the turn
pub fn turned_player_pose(
    model: PoseModel,
    trunk: f64,
    right_wrist: (f64, f64),
    left_wrist: (f64, f64),
) -> Pose {
    let map = model.index_map();
    let mut pose = player_pose(model, 0.0, right_wrist, left_wrist);
    let mut set = |joint: Joint, (x, y): (f64, f64)| {
        pose.keypoints[map.index(joint)] = Keypoint::new(x, y, 0.9);
    };

    let (s, c) = trunk.to_radians().sin_cos();
    let hc = (trunk / 2.0).to_radians().cos();
    let left_shoulder = (CENTER.0 + SHOULDER_HALF_WIDTH * c, 400.0);
    let right_shoulder = (CENTER.0 - SHOULDER_HALF_WIDTH * c, 400.0);
    let midpoint = |a: (f64, f64), b: (f64, f64)| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);

    set(Joint::Nose, (CENTER.0 + NOSE_LEAD * s, 330.0));
    set(Joint::LeftShoulder, left_shoulder);
    set(Joint::RightShoulder, right_shoulder);
    set(Joint::LeftElbow, midpoint(left_shoulder, left_wrist));
    set(Joint::RightElbow, midpoint(right_shoulder, right_wrist));
    set(Joint::LeftHip, (CENTER.0 + HIP_HALF_WIDTH * hc, 600.0));
    set(Joint::RightHip, (CENTER.0 - HIP_HALF_WIDTH * hc, 600.0));
    pose
}
