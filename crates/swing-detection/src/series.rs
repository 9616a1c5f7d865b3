//! Chart series projection
//!
//! Read-only view that picks one metric out of every frame, ready for a
//! charting front-end. Unknown samples stay `None` so charts break the line
//! instead of interpolating across missing data.

use crate::metrics::{AngleJoint, BodyPart, FrameMetrics, SidedValue, SwingPhase};
use crate::result::AnalysisResult;
use crate::SwingAnalysisError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Metric selectable for a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Body-part speed (px/frame)
    Velocity,
    /// Body-part speed (km/h)
    VelocityKmh,
    /// Body-part acceleration (km/h per second)
    Acceleration,
    /// Joint bend angle (degrees)
    Angle,
    /// Body orientation (degrees)
    Orientation,
    /// Trunk rotation velocity (degrees/frame)
    Rotation,
    /// Shoulder-hip separation (degrees)
    XFactor,
    SwingScore,
}

impl FromStr for MetricType {
    type Err = SwingAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "velocity" | "velocity_px" => Ok(MetricType::Velocity),
            "velocity_kmh" | "kmh" | "speed" => Ok(MetricType::VelocityKmh),
            "acceleration" => Ok(MetricType::Acceleration),
            "angle" => Ok(MetricType::Angle),
            "orientation" => Ok(MetricType::Orientation),
            "rotation" => Ok(MetricType::Rotation),
            "x_factor" | "xfactor" => Ok(MetricType::XFactor),
            "swing_score" | "score" => Ok(MetricType::SwingScore),
            other => Err(SwingAnalysisError::InvalidQuery(format!(
                "unknown metric '{other}'"
            ))),
        }
    }
}

/// Which side of a paired measurement to chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSide {
    Left,
    Right,
    #[default]
    Combined,
}

impl SeriesSide {
    fn pick(self, value: &SidedValue) -> Option<f64> {
        match self {
            SeriesSide::Left => value.left,
            SeriesSide::Right => value.right,
            SeriesSide::Combined => value.combined,
        }
    }
}

impl FromStr for SeriesSide {
    type Err = SwingAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(SeriesSide::Left),
            "right" | "r" => Ok(SeriesSide::Right),
            "combined" | "both" => Ok(SeriesSide::Combined),
            other => Err(SwingAnalysisError::InvalidQuery(format!(
                "unknown side '{other}'"
            ))),
        }
    }
}

impl FromStr for BodyPart {
    type Err = SwingAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        BodyPart::ALL
            .into_iter()
            .find(|part| part.as_str() == name)
            .ok_or_else(|| SwingAnalysisError::InvalidQuery(format!("unknown body part '{s}'")))
    }
}

/// Selection of one chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesQuery {
    pub metric: MetricType,
    /// Body part for velocity metrics, joint for angles
    pub part: BodyPart,
    pub side: SeriesSide,
    /// Smoothed rather than raw values where both exist
    pub smoothed: bool,
    pub from_frame: Option<u32>,
    pub to_frame: Option<u32>,
}

impl SeriesQuery {
    #[must_use]
    pub fn new(metric: MetricType) -> Self {
        Self {
            metric,
            part: BodyPart::Wrist,
            side: SeriesSide::Combined,
            smoothed: true,
            from_frame: None,
            to_frame: None,
        }
    }

    #[must_use]
    pub fn part(mut self, part: BodyPart) -> Self {
        self.part = part;
        self
    }

    #[must_use]
    pub fn side(mut self, side: SeriesSide) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn raw(mut self) -> Self {
        self.smoothed = false;
        self
    }

    #[must_use]
    pub fn frames(mut self, from: Option<u32>, to: Option<u32>) -> Self {
        self.from_frame = from;
        self.to_frame = to;
        self
    }

    fn angle_joint(&self) -> Result<AngleJoint, SwingAnalysisError> {
        match self.part {
            BodyPart::Knee => Ok(AngleJoint::Knee),
            BodyPart::Shoulder => Ok(AngleJoint::Shoulder),
            BodyPart::Elbow => Ok(AngleJoint::Elbow),
            BodyPart::Hip => Ok(AngleJoint::Hip),
            other => Err(SwingAnalysisError::InvalidQuery(format!(
                "no angle is measured at the {other}"
            ))),
        }
    }

    fn value(&self, m: &FrameMetrics) -> Result<Option<f64>, SwingAnalysisError> {
        let velocity = m.velocity.part(self.part);
        let value = match self.metric {
            MetricType::Velocity => {
                let values = if self.smoothed {
                    &velocity.smoothed_px
                } else {
                    &velocity.raw_px
                };
                self.side.pick(values)
            }
            MetricType::VelocityKmh => {
                let values = if self.smoothed {
                    &velocity.smoothed_kmh
                } else {
                    &velocity.kmh
                };
                self.side.pick(values)
            }
            MetricType::Acceleration => self.side.pick(&velocity.acceleration),
            MetricType::Angle => {
                let angle = m.angles.joint(self.angle_joint()?);
                let values = if self.smoothed {
                    &angle.smoothed
                } else {
                    &angle.raw
                };
                self.side.pick(values)
            }
            MetricType::Orientation => m.rotation.body_orientation,
            MetricType::Rotation => {
                if self.smoothed {
                    m.rotation.smoothed_rotation_velocity
                } else {
                    m.rotation.rotation_velocity
                }
            }
            MetricType::XFactor => m.rotation.x_factor,
            MetricType::SwingScore => m.swing_score,
        };
        Ok(value)
    }
}

/// One chart sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub frame: u32,
    pub timestamp: f64,
    pub value: Option<f64>,
    pub phase: SwingPhase,
}

impl AnalysisResult {
    /// Project one metric over the (optionally limited) frame range
    pub fn series(&self, query: &SeriesQuery) -> Result<Vec<ChartDataPoint>, SwingAnalysisError> {
        if let (Some(from), Some(to)) = (query.from_frame, query.to_frame) {
            if from > to {
                return Err(SwingAnalysisError::InvalidQuery(format!(
                    "frame range {from}..{to} is empty"
                )));
            }
        }
        self.frames
            .iter()
            .filter(|m| query.from_frame.map_or(true, |from| m.frame >= from))
            .filter(|m| query.to_frame.map_or(true, |to| m.frame <= to))
            .map(|m| {
                Ok(ChartDataPoint {
                    frame: m.frame,
                    timestamp: m.timestamp,
                    value: query.value(m)?,
                    phase: m.phase,
                })
            })
            .collect()
    }
}
