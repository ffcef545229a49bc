//! Greedy detection-to-ground-truth assignment

use super::overlap::rect_iou;
use super::EvaluationConfig;
use parkview_core::ParkingSpace;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of matching one frame's detections against ground truth
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpaceMatchResult {
    pub total_spaces: usize,
    pub detected: usize,
    pub correct_detections: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub map: f64,
    /// `(detection index, ground-truth index, iou)` per accepted match
    pub pairs: Vec<(usize, usize, f64)>,
}

/// Match detections to ground truth greedily, in detection order.
///
/// Each detection takes the unmatched ground-truth space with the highest IoU (the
/// first one on ties) when that IoU reaches the threshold. Earlier detections can
/// claim a space a later one would have matched better; this is not an optimal
/// assignment.
pub fn match_spaces(
    detected: &[ParkingSpace],
    ground_truth: &[ParkingSpace],
    config: &EvaluationConfig,
) -> SpaceMatchResult {
    let mut matched = vec![false; ground_truth.len()];
    let mut pairs = Vec::new();

    for (det_idx, detection) in detected.iter().enumerate() {
        let ious = iou_row(detection, ground_truth, &matched, config);

        let mut best: Option<(usize, f64)> = None;
        for (gt_idx, iou) in ious.into_iter().enumerate() {
            let Some(iou) = iou else { continue };
            if iou > best.map_or(0.0, |(_, b)| b) {
                best = Some((gt_idx, iou));
            }
        }

        if let Some((gt_idx, iou)) = best {
            if iou >= config.iou_threshold {
                matched[gt_idx] = true;
                pairs.push((det_idx, gt_idx, iou));
            }
        }
    }

    let correct = pairs.len();
    let false_positives = detected.len() - correct;
    let map = if detected.is_empty() {
        0.0
    } else {
        correct as f64 / (correct + false_positives) as f64
    };

    tracing::debug!(
        detected = detected.len(),
        ground_truth = ground_truth.len(),
        correct,
        "matched spaces"
    );

    SpaceMatchResult {
        total_spaces: ground_truth.len(),
        detected: detected.len(),
        correct_detections: correct,
        false_positives,
        false_negatives: ground_truth.len() - correct,
        map,
        pairs,
    }
}

/// IoU against every ground-truth space, `None` for those already matched
fn iou_row(
    detection: &ParkingSpace,
    ground_truth: &[ParkingSpace],
    matched: &[bool],
    config: &EvaluationConfig,
) -> Vec<Option<f64>> {
    let score = |(gt, &taken): (&ParkingSpace, &bool)| {
        (!taken).then(|| rect_iou(&detection.rect, &gt.rect, config.canvas_width, config.canvas_height))
    };

    #[cfg(feature = "parallel")]
    {
        ground_truth.par_iter().zip(matched.par_iter()).map(score).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        ground_truth.iter().zip(matched.iter()).map(score).collect()
    }
}
