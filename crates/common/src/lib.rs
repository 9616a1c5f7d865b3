/// Common types and utilities shared by the swing analysis crates
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Analysis errors surfaced to callers of any workspace crate
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No pose data to analyze")]
    NoData,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported pose model: {0}")]
    UnsupportedPoseModel(String),

    #[error("Analysis failed: {0}")]
    Computation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Body side of a paired joint or measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other side
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Player handedness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    /// Side holding the racket
    #[must_use]
    pub fn dominant_side(self) -> Side {
        match self {
            Handedness::Right => Side::Right,
            Handedness::Left => Side::Left,
        }
    }

    /// +1.0 for right-handed players, -1.0 for left-handed ones
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        }
    }
}

impl FromStr for Handedness {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(Handedness::Right),
            "left" | "l" => Ok(Handedness::Left),
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown handedness '{other}'"
            ))),
        }
    }
}

/// Drop NaN and infinities so they never reach a result.
///
/// Every derived measurement goes through this before it is stored.
#[inline]
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Mean of the known values, `None` when there are none
#[must_use]
pub fn mean_known<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        finite(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_filters_nan_and_infinity() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_mean_known_skips_unknown() {
        assert_eq!(mean_known([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean_known([None, None]), None);
        assert_eq!(mean_known(std::iter::empty()), None);
    }

    #[test]
    fn test_handedness_parsing() {
        assert_eq!("Right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert_eq!("l".parse::<Handedness>().unwrap(), Handedness::Left);
        assert!("both".parse::<Handedness>().is_err());
        assert_eq!(Handedness::Left.dominant_side(), Side::Left);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
