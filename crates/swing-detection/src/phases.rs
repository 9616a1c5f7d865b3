//! Phase segmentation
//!
//! Boundaries are found by walking away from the contact peak through the
//! smoothed wrist and rotation series. An unknown sample ends a walk.

use crate::config::AnalysisConfig;
use crate::metrics::{FrameMetrics, SwingPhase};
use crate::peaks::DetectionSignals;
use crate::swing::DetectedSwing;

/// Share of the reference velocity that still counts as the forward swing
pub const SWING_START_RATIO: f64 = 0.3;

/// Share of the reference velocity that still counts as follow-through
pub const FOLLOW_END_RATIO: f64 = 0.2;

/// Phase boundaries as frame indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseIndices {
    pub loading_start: usize,
    pub swing_start: usize,
    pub contact: usize,
    pub follow_end: usize,
}

/// Earliest index reachable from `from` while `keep` holds
fn walk_back(from: usize, keep: impl Fn(usize) -> bool) -> usize {
    let mut i = from;
    while i > 0 && keep(i - 1) {
        i -= 1;
    }
    i
}

/// Latest index reachable from `from` while `keep` holds
fn walk_forward(from: usize, len: usize, keep: impl Fn(usize) -> bool) -> usize {
    let mut i = from;
    while i + 1 < len && keep(i + 1) {
        i += 1;
    }
    i
}

fn at_least(series: &[Option<f64>], limit: f64) -> impl Fn(usize) -> bool + '_ {
    move |i| series[i].is_some_and(|v| v >= limit)
}

/// Segment the swing peaking at `peak`.
///
/// `floor` is the previous swing's follow end; no boundary of this swing is
/// placed before it.
#[must_use]
pub fn segment(
    signals: &DetectionSignals,
    peak: usize,
    peak_velocity: f64,
    floor: Option<usize>,
    config: &AnalysisConfig,
) -> PhaseIndices {
    let reference = config.contact_velocity_ratio * peak_velocity;
    let swing_walk = walk_back(peak, at_least(&signals.wrist_px, SWING_START_RATIO * reference));
    let loading_walk = walk_back(peak, |i| {
        signals.rotation[i].is_some_and(|r| r.abs() >= config.loading_rotation_threshold)
    });
    let follow_end = walk_forward(
        peak,
        signals.len(),
        at_least(&signals.wrist_px, FOLLOW_END_RATIO * reference),
    );

    let floor = floor.map_or(0, |f| f.min(peak));
    let swing_start = swing_walk.max(floor);
    let loading_start = loading_walk.min(swing_start).max(floor);

    PhaseIndices {
        loading_start,
        swing_start,
        contact: peak,
        follow_end,
    }
}

/// Tag every frame with its swing phase.
///
/// `swings` must be sorted by contact frame. Recovery runs from the follow end
/// to the clip end, stops before the next swing's loading phase and never
/// overwrites another swing's phases.
pub fn assign_phases(frames: &mut [FrameMetrics], swings: &[DetectedSwing]) {
    for m in frames.iter_mut() {
        m.phase = SwingPhase::Neutral;
    }

    for swing in swings {
        let p = swing.phases;
        for m in frames.iter_mut() {
            let f = m.frame;
            let phase = if f < p.loading_start || f > p.follow_end {
                continue;
            } else if f < p.swing_start {
                SwingPhase::Loading
            } else if f < p.contact {
                SwingPhase::Swing
            } else if f == p.contact {
                SwingPhase::Contact
            } else {
                SwingPhase::Follow
            };
            m.phase = phase;
        }
    }

    for (k, swing) in swings.iter().enumerate() {
        let mut end = swing.clip.end_frame;
        if let Some(next) = swings.get(k + 1) {
            end = end.min(next.phases.loading_start.saturating_sub(1));
        }
        let after = swing.phases.follow_end.saturating_add(1);
        let start = frames.partition_point(|m| m.frame < after);
        for m in frames[start..].iter_mut().take_while(|m| m.frame <= end) {
            if m.phase == SwingPhase::Neutral {
                m.phase = SwingPhase::Recovery;
            }
        }
    }
}
