//! Cut-time folding shared by the filter-log and probability engines
//!
//! Engines collect cut times starting from `0.0`. Before intervals are built,
//! the list is closed at the video duration and near-duplicate cuts are
//! collapsed onto the first cut of their cluster.

use crate::shot::RawInterval;

/// Appends `duration` unless the list already reaches it.
pub(crate) fn close_at_duration(cut_times: &mut Vec<f64>, duration: f64) {
    match cut_times.last() {
        Some(&last) if last >= duration => {}
        _ => cut_times.push(duration),
    }
}

/// Turns consecutive cut times into intervals.
///
/// A cut closer than `merge_gap` seconds to the last kept cut is dropped, so
/// `[0.0, 0.05, 3.0, 10.0]` becomes `[0.0, 3.0], [3.0, 10.0]`.
pub(crate) fn intervals_from_cuts(cut_times: &[f64], merge_gap: f64) -> Vec<RawInterval> {
    let mut kept: Vec<f64> = Vec::with_capacity(cut_times.len());
    for &t in cut_times {
        match kept.last() {
            Some(&last) if t - last < merge_gap => {
                log::trace!("Absorbing cut at {:.3}s into cut at {:.3}s", t, last);
            }
            _ => kept.push(t),
        }
    }
    kept.windows(2)
        .map(|pair| RawInterval::new(pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_duplicate_cut_absorbed() {
        let intervals = intervals_from_cuts(&[0.0, 0.05, 3.0, 10.0], 0.1);
        assert_eq!(
            intervals,
            vec![RawInterval::new(0.0, 3.0), RawInterval::new(3.0, 10.0)]
        );
    }

    #[test]
    fn cluster_collapses_onto_first_cut() {
        let intervals = intervals_from_cuts(&[0.0, 2.0, 2.04, 2.08, 2.15, 5.0], 0.1);
        assert_eq!(
            intervals,
            vec![
                RawInterval::new(0.0, 2.0),
                RawInterval::new(2.0, 2.15),
                RawInterval::new(2.15, 5.0),
            ]
        );
    }

    #[test]
    fn single_cut_yields_nothing() {
        assert!(intervals_from_cuts(&[0.0], 0.1).is_empty());
    }

    #[test]
    fn close_appends_missing_duration() {
        let mut cuts = vec![0.0, 2.3, 5.0];
        close_at_duration(&mut cuts, 10.0);
        assert_eq!(cuts, vec![0.0, 2.3, 5.0, 10.0]);

        let mut cuts = vec![0.0, 10.0];
        close_at_duration(&mut cuts, 10.0);
        assert_eq!(cuts, vec![0.0, 10.0]);
    }
}
