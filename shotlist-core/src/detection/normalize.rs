//! Interval normalization
//!
//! Every engine's raw intervals pass through [`normalize`] before they leave
//! the crate. The result is clamped to `[0, duration]`, free of shots shorter
//! than the minimum length, densely indexed and extended to the end of the
//! video.

use crate::shot::{RawInterval, Shot};

/// Clamps, filters, reindexes and extends raw intervals.
///
/// Steps run in this order:
/// 1. clamp each interval to `[0, duration]`
/// 2. drop intervals shorter than `min_length` (inverted and NaN ones included)
/// 3. assign indices `0..n` in input order
/// 4. stretch the last shot to end at `duration`
pub(crate) fn normalize(raw: &[RawInterval], duration: f64, min_length: f64) -> Vec<Shot> {
    if !(duration > 0.0) {
        return Vec::new();
    }

    let mut shots: Vec<Shot> = Vec::with_capacity(raw.len());
    for interval in raw {
        if interval.start.is_nan() || interval.end.is_nan() {
            log::debug!("Dropping interval with NaN bound: {:?}", interval);
            continue;
        }
        let start = interval.start.max(0.0);
        let end = interval.end.min(duration);
        let span = end - start;
        if span < min_length || span <= 0.0 {
            log::debug!(
                "Dropping interval [{:.3}, {:.3}] ({:.3}s < {:.3}s minimum)",
                interval.start,
                interval.end,
                span,
                min_length
            );
            continue;
        }
        shots.push(Shot::new(shots.len(), start, end));
    }

    if let Some(last) = shots.last_mut() {
        if last.t_end() < duration {
            last.set_t_end(duration);
        }
    }
    shots
}

/// Stable sort by start time followed by a dense reindex.
pub fn finalize_order(shots: &mut [Shot]) {
    shots.sort_by(|a, b| a.t_start().total_cmp(&b.t_start()));
    for (index, shot) in shots.iter_mut().enumerate() {
        shot.set_index(index);
    }
}
