//! Orientation clustering of raw line segments
//!
//! A single greedy pass: each segment joins the first cluster whose representative
//! (its first member) is parallel to it, or seeds a new cluster. Membership depends
//! on input order and representatives never move.

use super::config::ClusteringConfig;
use parkview_core::LineSegment;

/// Near-parallel segments, seeded by their first member.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationCluster {
    angle: f64,
    members: Vec<LineSegment>,
}

impl OrientationCluster {
    fn seeded(segment: LineSegment) -> Self {
        Self {
            angle: segment.angle_deg(),
            members: vec![segment],
        }
    }

    /// The seed segment every member was compared against.
    pub fn representative(&self) -> &LineSegment {
        &self.members[0]
    }

    /// Normalized angle of the representative.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn members(&self) -> &[LineSegment] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Whether two normalized angles differ by less than `tolerance` degrees.
pub fn is_parallel(angle_a: f64, angle_b: f64, tolerance: f64) -> bool {
    (angle_a - angle_b).abs() < tolerance
}

/// Partition `segments` into orientation clusters, preserving source order.
pub fn cluster_segments(segments: &[LineSegment], config: &ClusteringConfig) -> Vec<OrientationCluster> {
    let tolerance = config.parallel_angle_tolerance;

    segments.iter().fold(Vec::new(), |mut clusters, segment| {
        let angle = segment.angle_deg();
        match clusters
            .iter_mut()
            .find(|cluster: &&mut OrientationCluster| is_parallel(cluster.angle, angle, tolerance))
        {
            Some(cluster) => cluster.members.push(*segment),
            None => clusters.push(OrientationCluster::seeded(*segment)),
        }
        clusters
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClusteringConfig {
        ClusteringConfig::default()
    }

    #[test]
    fn test_clusters_partition_input() {
        let segments = vec![
            LineSegment::new(0.0, 0.0, 100.0, 2.0),
            LineSegment::new(0.0, 0.0, 3.0, 100.0),
            LineSegment::new(0.0, 50.0, 100.0, 52.0),
            LineSegment::new(0.0, 0.0, 100.0, 100.0),
            LineSegment::new(50.0, 0.0, 52.0, 100.0),
        ];
        let clusters = cluster_segments(&segments, &config());

        assert_eq!(clusters.len(), 3);
        let total: usize = clusters.iter().map(OrientationCluster::len).sum();
        assert_eq!(total, segments.len());
        for segment in &segments {
            let owners = clusters.iter().filter(|c| c.members().contains(segment)).count();
            assert_eq!(owners, 1);
        }
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        // 0 seeds a cluster, 9 joins it, 15 is too far from the representative
        // even though it is within tolerance of 9
        let segments = vec![
            LineSegment::new(0.0, 0.0, 100.0, 0.0),
            LineSegment::new(0.0, 0.0, 100.0, 100.0 * 9f64.to_radians().tan()),
            LineSegment::new(0.0, 0.0, 100.0, 100.0 * 15f64.to_radians().tan()),
        ];
        let clusters = cluster_segments(&segments, &config());

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0].representative(), &segments[0]);
        assert_eq!(clusters[1].representative(), &segments[2]);
    }

    #[test]
    fn test_order_dependence() {
        let a = LineSegment::new(0.0, 0.0, 100.0, 100.0 * 6f64.to_radians().tan());
        let b = LineSegment::new(0.0, 0.0, 100.0, 0.0);
        let c = LineSegment::new(0.0, 0.0, 100.0, 100.0 * 12f64.to_radians().tan());

        assert_eq!(cluster_segments(&[a, b, c], &config()).len(), 1);
        assert_eq!(cluster_segments(&[b, a, c], &config()).len(), 2);
    }

    #[test]
    fn test_parallel_is_symmetric() {
        let angles = [0.0, 5.0, 9.99, 10.0, 45.0, 179.0];
        for &a in &angles {
            for &b in &angles {
                assert_eq!(is_parallel(a, b, 10.0), is_parallel(b, a, 10.0));
            }
        }
    }

    #[test]
    fn test_zero_length_segment_is_clustered() {
        let segments = vec![LineSegment::new(5.0, 5.0, 5.0, 5.0), LineSegment::new(0.0, 0.0, 10.0, 0.0)];
        let clusters = cluster_segments(&segments, &config());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_segments(&[], &config()).is_empty());
    }
}
