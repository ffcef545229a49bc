// tests/core_tests.rs
use approx::assert_relative_eq;
use parkview_core::{LineSegment, ParkingSpace, PixelPoint, Point2, RotatedRect, Size2, SpaceSet};
use parkview_cv::detection::cluster::{cluster_segments, is_parallel};
use parkview_cv::detection::config::ClusteringConfig;
use parkview_cv::detection::intersect::is_perpendicular;

fn fan(count: usize) -> Vec<LineSegment> {
    (0..count)
        .map(|i| {
            let angle = (i as f64 * 23.0).to_radians();
            let (x, y) = (100.0 + 60.0 * angle.cos(), 100.0 + 60.0 * angle.sin());
            LineSegment::new(100.0, 100.0, x, y)
        })
        .collect()
}

#[test]
fn test_clusters_partition_segments() {
    let segments = fan(40);
    let clusters = cluster_segments(&segments, &ClusteringConfig::default());

    let total: usize = clusters.iter().map(|c| c.len()).sum();
    assert_eq!(total, segments.len());
    assert!(clusters.iter().all(|c| !c.is_empty()));

    let mut seen: Vec<LineSegment> = clusters.iter().flat_map(|c| c.members().to_vec()).collect();
    seen.sort_by(|a, b| a.x2.total_cmp(&b.x2).then(a.y2.total_cmp(&b.y2)));
    let mut expected = segments.clone();
    expected.sort_by(|a, b| a.x2.total_cmp(&b.x2).then(a.y2.total_cmp(&b.y2)));
    assert_eq!(seen, expected);
}

#[test]
fn test_angle_predicates_symmetric() {
    let angles = [0.0, 5.0, 9.99, 45.0, 89.0, 95.0, 110.0, 179.0];
    for &a in &angles {
        for &b in &angles {
            assert_eq!(is_parallel(a, b, 10.0), is_parallel(b, a, 10.0));
            assert_eq!(is_perpendicular(a, b, 20.0), is_perpendicular(b, a, 20.0));
        }
    }
}

#[test]
fn test_reversed_segments_share_angle() {
    for segment in fan(16) {
        let angle = segment.angle_deg();
        assert!((0.0..180.0).contains(&angle));
        assert_relative_eq!(angle, segment.reversed().angle_deg(), epsilon = 1e-9);
    }
}

#[test]
fn test_space_contour_round_trip() -> anyhow::Result<()> {
    let rect = RotatedRect::new(Point2::new(120.0, 80.0), Size2::new(40.0, 90.0), 15.0);
    let mut space = ParkingSpace::from_rect(4, rect);
    space.contour.push(PixelPoint::new(120, 80));

    let json = serde_json::to_string(&SpaceSet::new(vec![space.clone()]))?;
    let back: SpaceSet = serde_json::from_str(&json)?;

    assert_eq!(back.spaces[0], space);
    // interior contour points do not change the outline
    assert_eq!(back.spaces[0].polygon().len(), 4);
    Ok(())
}
