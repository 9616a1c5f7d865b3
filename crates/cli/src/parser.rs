//! Argument parsers for frame ranges and series selections
//!
//! Parses strings like `"120..300"` or `"velocity_kmh:wrist:left"` into the
//! structured values the commands need.

use swing_analysis_detection::{BodyPart, MetricType, SeriesQuery, SeriesSide};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid frame number '{value}' in range: {input}")]
    InvalidFrame { value: String, input: String },

    #[error("Range start {start} is after range end {end}")]
    ReversedRange { start: u32, end: u32 },

    #[error("Invalid syntax: {message}")]
    InvalidSyntax { message: String },
}

/// Inclusive frame range; open ends are `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

/// Parse a frame range
///
/// # Syntax
///
/// ```text
/// "120..300" → frames 120 to 300
/// "120.."    → frame 120 to the end
/// "..300"    → start to frame 300
/// "150"      → frame 150 only
/// ```
///
/// # Errors
///
/// Returns `ParseError` if the input is empty, a bound is not a frame
/// number, or the start lies after the end.
pub fn parse_frame_range(input: &str) -> Result<FrameRange, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let frame = |value: &str| -> Result<Option<u32>, ParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ParseError::InvalidFrame {
                value: value.to_string(),
                input: input.to_string(),
            })
    };

    let range = match input.split_once("..") {
        Some((start, end)) => FrameRange {
            start: frame(start)?,
            end: frame(end)?,
        },
        None => {
            let single = frame(input)?;
            FrameRange {
                start: single,
                end: single,
            }
        }
    };

    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(ParseError::ReversedRange { start, end });
        }
    }
    Ok(range)
}

/// Parse a series selection `metric[:part[:side]]`
///
/// Part defaults to the wrist and side to the combined value, e.g.
/// `"velocity_kmh:wrist:left"`, `"angle:knee"` or `"x_factor"`.
///
/// # Errors
///
/// Returns `ParseError` for empty input, unknown names or extra segments.
pub fn parse_series_spec(input: &str) -> Result<SeriesQuery, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let invalid = |err: swing_analysis_detection::SwingAnalysisError| ParseError::InvalidSyntax {
        message: err.to_string(),
    };

    let mut segments = input.split(':');
    let metric: MetricType = segments
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(invalid)?;
    let mut query = SeriesQuery::new(metric);

    if let Some(part) = segments.next() {
        query = query.part(part.parse::<BodyPart>().map_err(invalid)?);
    }
    if let Some(side) = segments.next() {
        query = query.side(side.parse::<SeriesSide>().map_err(invalid)?);
    }
    if segments.next().is_some() {
        return Err(ParseError::InvalidSyntax {
            message: format!("too many segments in '{input}', expected metric[:part[:side]]"),
        });
    }
    Ok(query)
}
