//! Oriented-rectangle candidates fitted around corner sets

use super::intersect::CornerSet;
use parkview_core::{PixelPoint, Point2, RotatedRect};

/// A provisional space before validity filtering.
///
/// `tag` is the candidate's position in this frame's synthesis order; it is
/// discarded when final ids are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceCandidate {
    pub tag: usize,
    pub rect: RotatedRect,
    pub contour: Vec<PixelPoint>,
}

impl SpaceCandidate {
    pub fn from_corners(tag: usize, corners: CornerSet) -> Self {
        let contour = corners.into_points();
        let points: Vec<Point2> = contour.iter().map(|p| p.to_point2()).collect();

        Self {
            tag,
            rect: RotatedRect::min_area(&points),
            contour,
        }
    }
}

/// Fit one candidate per corner set; the contour keeps the raw corner order.
pub fn synthesize_candidates(corner_sets: Vec<CornerSet>) -> Vec<SpaceCandidate> {
    corner_sets
        .into_iter()
        .enumerate()
        .map(|(tag, corners)| SpaceCandidate::from_corners(tag, corners))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_candidate_keeps_raw_contour() {
        let raw = vec![
            PixelPoint::new(50, 100),
            PixelPoint::new(0, 0),
            PixelPoint::new(50, 0),
            PixelPoint::new(0, 100),
        ];
        let corners = CornerSet::new(raw.clone()).unwrap();
        let candidates = synthesize_candidates(vec![corners]);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].tag, 0);
        assert_eq!(candidates[0].contour, raw);
        assert_relative_eq!(candidates[0].rect.area(), 5000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tags_are_positional() {
        let set = || {
            CornerSet::new(vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(10, 0),
                PixelPoint::new(10, 10),
                PixelPoint::new(0, 10),
            ])
            .unwrap()
        };
        let tags: Vec<usize> = synthesize_candidates(vec![set(), set(), set()])
            .iter()
            .map(|c| c.tag)
            .collect();
        assert_eq!(tags, vec![0, 1, 2]);
    }
}
