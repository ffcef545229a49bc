// tests/pipeline_tests.rs
use approx::assert_relative_eq;
use image::{GrayImage, Luma};
use parkview_core::{LineSegment, ParkingSpace, RotatedRect};
use parkview_cv::detection::{detect_spaces, DetectionConfig};
use parkview_cv::evaluation::{score_masks, EvaluationConfig, PerformanceEvaluator};

fn rectangle_outline(x: f64, y: f64, w: f64, h: f64) -> Vec<LineSegment> {
    vec![
        LineSegment::new(x, y, x + w, y),
        LineSegment::new(x, y + h, x + w, y + h),
        LineSegment::new(x, y, x, y + h),
        LineSegment::new(x + w, y, x + w, y + h),
    ]
}

fn row_of_spaces(offset_x: f64) -> Vec<ParkingSpace> {
    (0..3)
        .map(|i| {
            let rect = RotatedRect::axis_aligned(100.0 + i as f64 * 80.0 + offset_x, 200.0, 50.0, 100.0);
            ParkingSpace::from_rect(i + 1, rect)
        })
        .collect()
}

#[test]
fn test_single_rectangle_becomes_one_space() {
    let result = detect_spaces(&rectangle_outline(0.0, 0.0, 50.0, 100.0), &DetectionConfig::default());

    assert_eq!(result.spaces.len(), 1);
    let space = &result.spaces[0];
    assert_eq!(space.id, 1);
    assert!(!space.occupied);
    assert_relative_eq!(space.rect.area(), 5000.0, epsilon = 1e-6);
    assert_relative_eq!(space.rect.center.x, 25.0, epsilon = 1e-9);
    assert_relative_eq!(space.rect.center.y, 50.0, epsilon = 1e-9);
    assert_eq!(space.contour.len(), 4);
}

#[test]
fn test_segment_order_does_not_change_single_space() {
    let mut segments = rectangle_outline(10.0, 20.0, 40.0, 90.0);
    segments.reverse();
    let result = detect_spaces(&segments, &DetectionConfig::default());
    assert_eq!(result.spaces.len(), 1);
}

#[test]
fn test_out_of_frame_rectangle_is_dropped() {
    // two corners land at negative x, leaving too few for a candidate
    let result = detect_spaces(&rectangle_outline(-20.0, 0.0, 50.0, 100.0), &DetectionConfig::default());
    assert!(result.spaces.is_empty());
    assert_eq!(result.stats.corner_sets, 0);
}

#[test]
fn test_shifted_detections_all_match() {
    let evaluator = PerformanceEvaluator::new(EvaluationConfig::default());
    let result = evaluator.evaluate_space_detection(&row_of_spaces(1.0), &row_of_spaces(0.0));

    assert_eq!(result.correct_detections, 3);
    assert_eq!(result.false_positives, 0);
    assert_eq!(result.false_negatives, 0);
    assert_relative_eq!(result.map, 1.0);
    assert!(result.pairs.iter().all(|&(_, _, iou)| iou > 0.9));
}

#[test]
fn test_no_detections() {
    let evaluator = PerformanceEvaluator::default();
    let truth = row_of_spaces(0.0);
    let result = evaluator.evaluate_space_detection(&[], &truth);

    assert_eq!(result.map, 0.0);
    assert_eq!(result.correct_detections, 0);
    assert_eq!(result.false_negatives, truth.len());
}

#[test]
fn test_mask_iou_identical_and_disjoint() -> anyhow::Result<()> {
    let mut a = GrayImage::new(50, 50);
    let mut b = GrayImage::new(50, 50);
    for y in 10..20 {
        for x in 5..15 {
            a.put_pixel(x, y, Luma([1]));
        }
        for x in 30..40 {
            b.put_pixel(x, y, Luma([1]));
        }
    }

    let same = score_masks(&a, &a)?;
    assert_relative_eq!(same.class_ious[0].1, 1.0);
    assert_relative_eq!(same.class_ious[1].1, 1.0);

    let disjoint = score_masks(&a, &b)?;
    assert!(disjoint.class_ious[0].1 > 0.0);
    assert_eq!(disjoint.class_ious[1].1, 0.0);
    assert_eq!(disjoint.class_ious[2].1, 0.0);
    assert_relative_eq!(disjoint.mean_iou, disjoint.class_ious[0].1 / 3.0);
    Ok(())
}

#[test]
fn test_report_over_sequence() -> anyhow::Result<()> {
    let mut evaluator = PerformanceEvaluator::default();
    evaluator.evaluate_frame(&row_of_spaces(1.0), &row_of_spaces(0.0), None)?;
    evaluator.evaluate_frame(&[], &row_of_spaces(0.0), None)?;

    let path = std::env::temp_dir().join(format!("parkview-report-{}.txt", std::process::id()));
    evaluator.generate_report(&path)?;
    let text = std::fs::read_to_string(&path)?;
    std::fs::remove_file(&path)?;

    assert!(text.contains("Frame 2:"));
    assert!(text.contains("Average mAP: 0.5\n"));
    assert!(text.contains("Total Correct Detections: 3\n"));
    assert!(text.contains("Total False Negatives: 3\n"));
    Ok(())
}
