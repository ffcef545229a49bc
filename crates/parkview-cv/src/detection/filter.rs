//! Validity filtering and canonical reading order

use super::candidate::SpaceCandidate;
use super::config::{OrderingConfig, ValidityConfig};
use parkview_core::{ParkingSpace, RotatedRect};
use std::cmp::Ordering;

/// Area and aspect-ratio window check; zero-width rectangles are never valid.
pub fn is_valid_space(rect: &RotatedRect, config: &ValidityConfig) -> bool {
    let (short, long) = rect.sides();
    // also rejects NaN sides
    if !(short > 0.0) {
        return false;
    }

    let area = short * long;
    let ratio = long / short;

    (config.min_area..=config.max_area).contains(&area)
        && (config.min_aspect..=config.max_aspect).contains(&ratio)
}

/// Row-then-column comparison of two rectangle centers.
///
/// Centers more than `row_tolerance` apart vertically order by y, otherwise by x.
/// This approximates rows without segmenting them, so it is not transitive
/// across rows.
pub fn reading_order(a: &RotatedRect, b: &RotatedRect, row_tolerance: f64) -> Ordering {
    if (a.center.y - b.center.y).abs() > row_tolerance {
        a.center.y.total_cmp(&b.center.y)
    } else {
        a.center.x.total_cmp(&b.center.x)
    }
}

/// Stable insertion sort by [`reading_order`].
///
/// Elements only move past strictly greater neighbours, so the result never
/// depends on the comparator being a total order and re-sorting is a no-op.
pub fn sort_reading_order(candidates: &mut [SpaceCandidate], row_tolerance: f64) {
    for i in 1..candidates.len() {
        let mut j = i;
        while j > 0 && reading_order(&candidates[j].rect, &candidates[j - 1].rect, row_tolerance) == Ordering::Less {
            candidates.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Drop implausible candidates, order the rest and number them `1..=N`.
pub fn finalize_spaces(
    candidates: Vec<SpaceCandidate>,
    validity: &ValidityConfig,
    ordering: &OrderingConfig,
) -> Vec<ParkingSpace> {
    let mut kept: Vec<SpaceCandidate> = candidates
        .into_iter()
        .filter(|candidate| is_valid_space(&candidate.rect, validity))
        .collect();

    sort_reading_order(&mut kept, ordering.row_tolerance);

    kept.into_iter()
        .enumerate()
        .map(|(rank, candidate)| ParkingSpace::new(rank as u32 + 1, candidate.rect, candidate.contour))
        .collect()
}
