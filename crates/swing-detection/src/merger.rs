//! Merging of duplicate swing detections

use crate::swing::DetectedSwing;
use tracing::debug;

/// Whether the clip windows of two swings overlap enough to be one swing.
///
/// The overlap is compared against each swing's own clip length, so a short
/// clip swallowed by a long one merges too.
#[must_use]
pub fn should_merge(a: &DetectedSwing, b: &DetectedSwing, threshold: f64) -> bool {
    let overlap = f64::from(a.clip.overlap_frames(&b.clip));
    if overlap == 0.0 {
        return false;
    }
    overlap >= threshold * f64::from(a.clip.frame_span())
        || overlap >= threshold * f64::from(b.clip.frame_span())
}

/// Combine two detections of the same swing.
///
/// The higher-scoring swing keeps its identity and classification (the earlier
/// one on a tie); clip, loading start and follow end cover both.
#[must_use]
pub fn merge_pair(a: DetectedSwing, b: DetectedSwing) -> DetectedSwing {
    let a_wins = a.swing_score > b.swing_score
        || (a.swing_score == b.swing_score && a.contact_frame <= b.contact_frame);
    let (mut winner, other) = if a_wins { (a, b) } else { (b, a) };

    if other.clip.start_frame < winner.clip.start_frame {
        winner.clip.start_frame = other.clip.start_frame;
        winner.clip.start_time = other.clip.start_time;
    }
    if other.clip.end_frame > winner.clip.end_frame {
        winner.clip.end_frame = other.clip.end_frame;
        winner.clip.end_time = other.clip.end_time;
    }
    winner.phases.loading_start = winner.phases.loading_start.min(other.phases.loading_start);
    winner.phases.follow_end = winner.phases.follow_end.max(other.phases.follow_end);
    winner
}

/// Collapse overlapping detections; the result is sorted by contact frame
#[must_use]
pub fn merge_swings(mut swings: Vec<DetectedSwing>, threshold: f64) -> Vec<DetectedSwing> {
    swings.sort_by_key(|s| s.contact_frame);
    let mut accepted: Vec<DetectedSwing> = Vec::with_capacity(swings.len());

    for swing in swings {
        let mut current = swing;
        while let Some(pos) = accepted
            .iter()
            .position(|kept| should_merge(kept, &current, threshold))
        {
            let kept = accepted.remove(pos);
            debug!(
                "Merging swings at frames {} and {}",
                kept.contact_frame, current.contact_frame
            );
            current = merge_pair(kept, current);
        }
        accepted.push(current);
    }

    accepted.sort_by_key(|s| s.contact_frame);
    accepted
}
