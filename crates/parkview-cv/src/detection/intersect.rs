//! Corner construction from perpendicular cluster pairs

use super::cluster::OrientationCluster;
use super::config::IntersectionConfig;
use parkview_core::PixelPoint;

/// Fewest corners a set needs to describe a space.
pub const MIN_CORNERS: usize = 4;

/// Intersection points produced by one perpendicular cluster pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    points: Vec<PixelPoint>,
}

impl CornerSet {
    /// Wrap `points`, or `None` when there are fewer than [`MIN_CORNERS`].
    pub fn new(points: Vec<PixelPoint>) -> Option<Self> {
        (points.len() >= MIN_CORNERS).then_some(Self { points })
    }

    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<PixelPoint> {
        self.points
    }
}

/// Whether two normalized angles are within `tolerance` degrees of a right angle.
pub fn is_perpendicular(angle_a: f64, angle_b: f64, tolerance: f64) -> bool {
    ((angle_a - angle_b).abs() - 90.0).abs() < tolerance
}

/// Intersect every perpendicular pair of clusters.
///
/// Members are treated as infinite lines. Near-parallel member pairs and
/// points with a negative coordinate are dropped.
pub fn build_corner_sets(clusters: &[OrientationCluster], config: &IntersectionConfig) -> Vec<CornerSet> {
    let mut corner_sets = Vec::new();

    for (i, first) in clusters.iter().enumerate() {
        for second in &clusters[i + 1..] {
            if !is_perpendicular(first.angle(), second.angle(), config.perpendicular_angle_tolerance) {
                continue;
            }

            let corners = corners_between(first, second, config.parallel_epsilon);
            match CornerSet::new(corners) {
                Some(set) => corner_sets.push(set),
                None => tracing::trace!(
                    first = first.angle(),
                    second = second.angle(),
                    "perpendicular pair produced too few corners"
                ),
            }
        }
    }

    corner_sets
}

fn corners_between(first: &OrientationCluster, second: &OrientationCluster, epsilon: f64) -> Vec<PixelPoint> {
    let mut corners = Vec::with_capacity(first.len() * second.len());

    for a in first.members() {
        for b in second.members() {
            let Some(point) = a.line_intersection(b, epsilon) else {
                continue;
            };
            if point.x >= 0.0 && point.y >= 0.0 && point.x.is_finite() && point.y.is_finite() {
                corners.push(point.round());
            }
        }
    }

    corners
}
