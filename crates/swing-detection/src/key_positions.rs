//! Key-position search inside a detected swing

use crate::peaks::DetectionSignals;
use crate::swing::{KeyPosition, ServePositions};
use crate::track::PoseTrack;
use std::ops::RangeInclusive;
use swing_analysis_common::{finite, Side};
use swing_analysis_pose::wrap_degrees;

/// Time between the trophy position and the serve contact point (seconds)
pub const TROPHY_OFFSET_SECONDS: f64 = 0.4;

fn key_position(signals: &DetectionSignals, index: usize, value: Option<f64>) -> KeyPosition {
    KeyPosition {
        frame: signals.frames[index],
        timestamp: signals.timestamps[index],
        value,
    }
}

/// First index of `range` with the largest score; `None` when no score is known
fn arg_max(
    range: RangeInclusive<usize>,
    score: impl Fn(usize) -> Option<f64>,
) -> Option<(usize, f64)> {
    range.fold(None, |best, i| match (best, score(i)) {
        (Some((_, b)), Some(v)) if v > b => Some((i, v)),
        (None, Some(v)) => Some((i, v)),
        (best, _) => best,
    })
}

/// Frame of maximum coil between loading start and contact.
///
/// The coil is the body orientation relative to the orientation at contact;
/// the stored value is that signed difference in degrees.
#[must_use]
pub fn loading_peak(
    signals: &DetectionSignals,
    loading_start: usize,
    contact: usize,
) -> Option<KeyPosition> {
    let at_contact = signals.orientation[contact]?;
    let coil = |i: usize| {
        signals.orientation[i].and_then(|o| finite(wrap_degrees(o - at_contact)))
    };
    let (index, _) = arg_max(loading_start..=contact, |i| coil(i).map(f64::abs))?;
    Some(key_position(signals, index, coil(index)))
}

/// Trophy, contact point and landing of a serve.
///
/// `clip` is the swing's clip window as an index range and `racket_side` the
/// hitting arm. The front foot is the one opposite the racket arm.
#[must_use]
pub fn serve_positions(
    signals: &DetectionSignals,
    track: &PoseTrack<'_>,
    clip: RangeInclusive<usize>,
    racket_side: Side,
) -> ServePositions {
    let clip_end = *clip.end();
    let Some((contact, height)) = arg_max(clip, |i| track.wrist_height(i, racket_side)) else {
        return ServePositions::default();
    };
    let contact_point = key_position(signals, contact, Some(height));

    let trophy = signals
        .nearest_index(signals.timestamps[contact] - TROPHY_OFFSET_SECONDS)
        .map(|i| key_position(signals, i, track.wrist_height(i, racket_side)));

    let front_foot = racket_side.opposite();
    let landing = arg_max(contact..=clip_end, |i| track.ankle_y(i, front_foot))
        .map(|(i, y)| key_position(signals, i, Some(y)));

    ServePositions {
        trophy,
        contact_point: Some(contact_point),
        landing,
    }
}
