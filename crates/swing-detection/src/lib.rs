//! Swing detection and biomechanical signal processing
//!
//! Turns a per-frame stream of body keypoints into biomechanical time series
//! and a list of detected swings.
//!
//! # Pipeline
//! 1. **Extraction**: velocities relative to the body center, joint angles,
//!    body orientation, segment line angles, X-Factor
//! 2. **Conditioning**: drop-fill, kernel smoothing, moving average,
//!    px/frame → km/h conversion, acceleration
//! 3. **Detection**: adaptive percentile threshold over the composite swing
//!    score, separated local maxima, rotation and speed gates
//! 4. **Segmentation**: loading → swing → contact → follow → recovery
//! 5. **Classification**: serve / forehand / backhand / two-handed backhand
//! 6. **Key positions**: loading peak, serve trophy, contact point, landing
//! 7. **Merging** of duplicate detections and result assembly
//!
//! Measurements that cannot be taken reliably are `None` all the way through;
//! they are never replaced by zero.
//!
//! # Example
//! ```no_run
//! use swing_analysis_detection::{AnalysisConfig, SwingAnalyzer};
//! use swing_analysis_pose::PoseSequence;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let poses = PoseSequence::from_json_str(&std::fs::read_to_string("poses.json")?)?;
//! let analyzer = SwingAnalyzer::new(AnalysisConfig::default())?;
//! let result = analyzer.analyze(&poses)?;
//!
//! for swing in &result.swings {
//!     println!(
//!         "{:.2}s: {} ({:.1} km/h, {:.0}% confidence)",
//!         swing.contact_timestamp,
//!         swing.swing_type,
//!         swing.peak_velocity_kmh,
//!         swing.confidence * 100.0
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod extractor;
pub mod key_positions;
pub mod merger;
pub mod metrics;
pub mod peaks;
pub mod phases;
pub mod result;
pub mod series;
pub mod signal;
pub mod swing;
pub mod track;

pub use classifier::{Classification, SwingClassifier};
pub use config::{AnalysisConfig, WristSelection};
pub use extractor::{swing_score, FrameInput, MetricExtractor};
pub use metrics::{
    AngleJoint, BodyPart, FrameMetrics, JointAngle, JointAngles, PartVelocity, RotationMetrics,
    SidedValue, SwingPhase, Velocities,
};
pub use peaks::{DetectionSignals, Peak, PeakDetection};
pub use result::{AnalysisMetadata, AnalysisResult, SwingSummary};
pub use series::{ChartDataPoint, MetricType, SeriesQuery, SeriesSide};
pub use signal::VelocityScale;
pub use swing::{
    ClipWindow, DetectedSwing, KeyPosition, KeyPositions, PhaseBoundaries, ServePositions,
    SwingType,
};

use chrono::Utc;
use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use swing_analysis_common::{finite, AnalysisError, Side};
use swing_analysis_pose::{OrientationEstimator, PoseSequence, ShoulderWidthEstimator};
use thiserror::Error;
use tracing::{debug, info};

use crate::phases::PhaseIndices;
use crate::track::PoseTrack;

/// Swing analysis errors
#[derive(Debug, Error)]
pub enum SwingAnalysisError {
    #[error("No pose data to analyze")]
    NoData,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),
    #[error("Invalid series query: {0}")]
    InvalidQuery(String),
    #[error("Analysis failed: {0}")]
    Computation(String),
}

impl From<SwingAnalysisError> for AnalysisError {
    fn from(err: SwingAnalysisError) -> Self {
        match err {
            SwingAnalysisError::NoData => AnalysisError::NoData,
            SwingAnalysisError::InvalidConfig(msg) | SwingAnalysisError::InvalidQuery(msg) => {
                AnalysisError::InvalidConfig(msg)
            }
            SwingAnalysisError::InvalidFrameRate(fps) => {
                AnalysisError::InvalidConfig(format!("invalid frame rate {fps}"))
            }
            SwingAnalysisError::Computation(msg) => AnalysisError::Computation(msg),
        }
    }
}

/// Clip edges closer than this (seconds) to a frame timestamp snap onto it
const CLIP_SNAP_EPSILON: f64 = 1e-9;

/// Swing analyzer
///
/// Holds only immutable configuration, so one analyzer can serve concurrent
/// calls.
pub struct SwingAnalyzer {
    config: AnalysisConfig,
    estimator: Box<dyn OrientationEstimator>,
}

impl SwingAnalyzer {
    /// Create an analyzer after validating the configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, SwingAnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            estimator: Box::new(ShoulderWidthEstimator::default()),
        })
    }

    /// Replace the body orientation estimator
    #[must_use]
    pub fn with_estimator(mut self, estimator: Box<dyn OrientationEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a pose sequence.
    ///
    /// Fails with `NoData` on an empty sequence and with `Computation` when
    /// the run faults or produces a non-finite value; no partial result is
    /// returned in either case. Finding no swings is not an error.
    pub fn analyze(&self, poses: &PoseSequence) -> Result<AnalysisResult, SwingAnalysisError> {
        if poses.is_empty() {
            return Err(SwingAnalysisError::NoData);
        }
        if !(poses.fps.is_finite() && poses.fps > 0.0) {
            return Err(SwingAnalysisError::InvalidFrameRate(poses.fps));
        }

        info!(
            "Analyzing {} frames at {:.2} fps ({} model)",
            poses.len(),
            poses.fps,
            poses.model
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(poses)))
            .map_err(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unexpected fault".to_string());
                SwingAnalysisError::Computation(message)
            })?;
        check_result(&result)?;

        info!(
            "Detected {} swings ({} forehand, {} backhand, {} two-handed backhand, {} serve, {} unknown)",
            result.summary.total_swings,
            result.summary.forehands,
            result.summary.backhands,
            result.summary.two_handed_backhands,
            result.summary.serves,
            result.summary.unknown
        );
        Ok(result)
    }

    fn run(&self, poses: &PoseSequence) -> AnalysisResult {
        let config = &self.config;
        let fps = poses.fps;
        let map = poses.model.index_map();

        let inputs: Vec<FrameInput<'_>> = poses
            .frame_numbers()
            .map(|frame| FrameInput {
                frame,
                timestamp: poses.timestamp(frame),
                pose: poses.selected_pose(frame, config.selected_pose_index),
            })
            .collect();
        let frame_numbers: Vec<u32> = inputs.iter().map(|f| f.frame).collect();

        let extractor = MetricExtractor::new(map, config.min_confidence, self.estimator.as_ref());
        let mut frames = extractor.extract(&inputs);

        let scale = VelocityScale::estimate(
            frames.iter().map(|m| m.torso_height),
            fps,
            config.person_height_m,
            config.torso_to_height_ratio,
            config.fallback_torso_height_px,
        );
        let signals = self.condition(&mut frames, &frame_numbers, &scale, fps);

        let detection = peaks::detect_peaks(&signals, config, fps);
        let threshold = detection.threshold.unwrap_or(config.min_swing_score);

        let track = PoseTrack::new(
            inputs.iter().map(|f| f.pose).collect(),
            map,
            config.min_confidence,
        );
        let classifier = SwingClassifier::new(config, &signals, &frames, &track, fps);

        let mut swings = Vec::with_capacity(detection.peaks.len());
        let mut floor = None;
        for peak in &detection.peaks {
            let Some(peak_velocity) = signals.wrist_px[peak.index] else {
                debug!(
                    "Peak at frame {} has no wrist velocity, skipping",
                    signals.frames[peak.index]
                );
                continue;
            };
            let Some(peak_kmh) = signals.wrist_kmh[peak.index] else {
                continue;
            };

            let phases = phases::segment(&signals, peak.index, peak_velocity, floor, config);
            floor = Some(phases.follow_end);

            let class = classifier.classify(peak.index, peak.score, threshold);
            let (clip, clip_range) = clip_window(&signals, phases.follow_end, config);
            let key_positions = if class.swing_type == SwingType::Serve {
                KeyPositions {
                    loading_peak: None,
                    serve: Some(key_positions::serve_positions(
                        &signals,
                        &track,
                        clip_range,
                        class.dominant_side,
                    )),
                }
            } else {
                KeyPositions {
                    loading_peak: key_positions::loading_peak(
                        &signals,
                        phases.loading_start,
                        phases.contact,
                    ),
                    serve: None,
                }
            };

            let stroke = phases.swing_start..=phases.follow_end;
            swings.push(DetectedSwing {
                contact_frame: signals.frames[peak.index],
                contact_timestamp: signals.timestamps[peak.index],
                peak_velocity_px: peak_velocity,
                peak_velocity_kmh: peak_kmh,
                rotation_range: rotation_range(
                    &signals.rotation,
                    phases.loading_start..=phases.follow_end,
                ),
                peak_rotation_velocity: peak_rotation(&signals.rotation, stroke),
                swing_score: peak.score,
                swing_type: class.swing_type,
                dominant_side: class.dominant_side,
                confidence: class.confidence,
                phases: boundaries(&signals, &phases),
                key_positions,
                clip,
            });
        }

        let detected = swings.len();
        let swings = merger::merge_swings(swings, config.merge_overlap_threshold);
        if swings.len() < detected {
            debug!("Merged {} detections into {} swings", detected, swings.len());
        }
        phases::assign_phases(&mut frames, &swings);

        let summary = SwingSummary::from_swings(&swings);
        let metadata = AnalysisMetadata {
            frame_count: frames.len(),
            fps,
            duration_seconds: poses.duration(),
            pose_model: poses.model,
            meters_per_pixel: scale.meters_per_pixel,
            torso_height_px: scale.torso_height_px,
            used_fallback_scale: scale.used_fallback,
            score_threshold: detection.threshold,
            analyzed_at: Utc::now(),
        };

        AnalysisResult {
            frames,
            swings,
            summary,
            metadata,
        }
    }

    /// Condition every series in place and build the detection signals
    fn condition(
        &self,
        frames: &mut [FrameMetrics],
        frame_numbers: &[u32],
        scale: &VelocityScale,
        fps: f64,
    ) -> DetectionSignals {
        let config = &self.config;
        let window = config.smoothing_window;
        let mut wrist_filtered: [Vec<Option<f64>>; 2] = [Vec::new(), Vec::new()];

        for part in BodyPart::ALL {
            for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
                let raw: Vec<Option<f64>> = frames
                    .iter()
                    .map(|m| m.velocity.part(part).raw_px.side(side))
                    .collect();
                let conditioned = signal::condition(&raw, window);
                let kmh = scale.series_to_kmh(&raw);
                let smoothed_kmh = scale.series_to_kmh(&conditioned.smoothed);
                let accel = signal::acceleration(&smoothed_kmh, frame_numbers, fps);

                for (i, m) in frames.iter_mut().enumerate() {
                    let v = m.velocity.part_mut(part);
                    v.smoothed_px.set(side, conditioned.smoothed[i]);
                    v.kmh.set(side, kmh[i]);
                    v.smoothed_kmh.set(side, smoothed_kmh[i]);
                    v.acceleration.set(side, accel[i]);
                }
                if part == BodyPart::Wrist {
                    wrist_filtered[slot] = conditioned.filtered;
                }
            }
        }

        for joint in AngleJoint::ALL {
            for side in [Side::Left, Side::Right] {
                let raw: Vec<Option<f64>> = frames
                    .iter()
                    .map(|m| m.angles.joint(joint).raw.side(side))
                    .collect();
                let conditioned = signal::condition(&raw, window);
                for (m, value) in frames.iter_mut().zip(conditioned.smoothed) {
                    m.angles.joint_mut(joint).smoothed.set(side, value);
                }
            }
        }

        let rotation_raw: Vec<Option<f64>> =
            frames.iter().map(|m| m.rotation.rotation_velocity).collect();
        let rotation = signal::condition(&rotation_raw, window);

        let [left_wrist, right_wrist] = wrist_filtered;
        let mut signals = DetectionSignals::default();
        for (i, m) in frames.iter_mut().enumerate() {
            m.rotation.smoothed_rotation_velocity = rotation.smoothed[i];
            let wrist = config
                .wrist_selection
                .select(left_wrist[i], right_wrist[i], config.handedness);
            m.swing_score = swing_score(wrist, rotation.filtered[i], config.rotation_weight);

            let velocity = &m.velocity.wrist;
            signals.frames.push(m.frame);
            signals.timestamps.push(m.timestamp);
            signals.score.push(m.swing_score);
            signals.wrist_px.push(config.wrist_selection.select(
                velocity.smoothed_px.left,
                velocity.smoothed_px.right,
                config.handedness,
            ));
            signals.wrist_kmh.push(config.wrist_selection.select(
                velocity.smoothed_kmh.left,
                velocity.smoothed_kmh.right,
                config.handedness,
            ));
            signals.rotation.push(m.rotation.smoothed_rotation_velocity);
            signals.orientation.push(m.rotation.body_orientation);
        }
        signals
    }
}

impl Default for SwingAnalyzer {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            estimator: Box::new(ShoulderWidthEstimator::default()),
        }
    }
}

fn boundaries(signals: &DetectionSignals, phases: &PhaseIndices) -> PhaseBoundaries {
    PhaseBoundaries {
        loading_start: signals.frames[phases.loading_start],
        swing_start: signals.frames[phases.swing_start],
        contact: signals.frames[phases.contact],
        follow_end: signals.frames[phases.follow_end],
    }
}

/// Clip around the follow end, clamped to the sequence and snapped to frames
fn clip_window(
    signals: &DetectionSignals,
    follow_end: usize,
    config: &AnalysisConfig,
) -> (ClipWindow, RangeInclusive<usize>) {
    let ts = &signals.timestamps;
    let anchor = ts[follow_end];
    let first = ts[0];
    let last = ts[ts.len() - 1];
    let start_time = (anchor - config.clip_lead_time).max(first);
    let end_time = (anchor + config.clip_trail_time).min(last);

    let start = ts
        .partition_point(|&t| t < start_time - CLIP_SNAP_EPSILON)
        .min(follow_end);
    let end = ts
        .partition_point(|&t| t <= end_time + CLIP_SNAP_EPSILON)
        .saturating_sub(1)
        .max(follow_end);

    let clip = ClipWindow {
        start_time: ts[start],
        end_time: ts[end],
        start_frame: signals.frames[start],
        end_frame: signals.frames[end],
    };
    (clip, start..=end)
}

/// Spread of the accumulated rotation over a range (degrees)
fn rotation_range(rotation: &[Option<f64>], range: RangeInclusive<usize>) -> Option<f64> {
    let mut total = 0.0;
    let mut low = 0.0_f64;
    let mut high = 0.0_f64;
    let mut known = false;
    for r in range.filter_map(|i| rotation[i]) {
        total += r;
        low = low.min(total);
        high = high.max(total);
        known = true;
    }
    known.then_some(high - low).and_then(finite)
}

/// Signed rotation velocity of largest magnitude in a range
fn peak_rotation(rotation: &[Option<f64>], range: RangeInclusive<usize>) -> Option<f64> {
    range
        .filter_map(|i| rotation[i])
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
}

/// Reject results carrying non-finite numbers or misordered swings
fn check_result(result: &AnalysisResult) -> Result<(), SwingAnalysisError> {
    for m in &result.frames {
        if let Some((name, _)) = m
            .numeric_values()
            .into_iter()
            .find(|(_, v)| v.is_some_and(|v| !v.is_finite()))
        {
            return Err(SwingAnalysisError::Computation(format!(
                "non-finite {name} at frame {}",
                m.frame
            )));
        }
    }
    for swing in &result.swings {
        let values = [
            swing.peak_velocity_px,
            swing.peak_velocity_kmh,
            swing.swing_score,
            swing.confidence,
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(SwingAnalysisError::Computation(format!(
                "non-finite swing value at frame {}",
                swing.contact_frame
            )));
        }
        if !swing.phases.is_ordered() {
            return Err(SwingAnalysisError::Computation(format!(
                "misordered phases at frame {}",
                swing.contact_frame
            )));
        }
    }
    Ok(())
}
