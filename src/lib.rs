//! Swing analysis for racket-sport video
//!
//! Facade over the workspace crates: pose input types, the detection engine and
//! the shared error type. Applications usually only need [`SwingAnalyzer`].
//!
//! # Example
//! ```no_run
//! use swing_analysis::{AnalysisConfig, PoseSequence, SwingAnalyzer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("poses.json")?;
//! let poses: PoseSequence = serde_json::from_str(&json)?;
//!
//! let analyzer = SwingAnalyzer::new(AnalysisConfig::default())?;
//! let result = analyzer.analyze(&poses)?;
//! println!("{} swings detected", result.swings.len());
//! # Ok(())
//! # }
//! ```

pub use swing_analysis_common as common;
pub use swing_analysis_detection as detection;
pub use swing_analysis_pose as pose;

pub use swing_analysis_common::{AnalysisError, Handedness, Side};
pub use swing_analysis_detection::{
    AnalysisConfig, AnalysisResult, DetectedSwing, FrameMetrics, SwingAnalysisError,
    SwingAnalyzer, SwingType,
};
pub use swing_analysis_pose::{Keypoint, Pose, PoseModel, PoseSequence};
