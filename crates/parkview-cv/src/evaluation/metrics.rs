//! Per-frame metrics and their aggregate

use super::mask::SegmentationScore;
use super::matcher::SpaceMatchResult;
use serde::Serialize;

/// Metrics of one evaluated frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameMetrics {
    pub map: f64,
    pub miou: f64,
    pub total_spaces: usize,
    pub correct_detections: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl FrameMetrics {
    /// Combine space matching with an optional mask score (mIoU 0 without one)
    pub fn from_parts(spaces: &SpaceMatchResult, segmentation: Option<&SegmentationScore>) -> Self {
        Self {
            map: spaces.map,
            miou: segmentation.map_or(0.0, |s| s.mean_iou),
            total_spaces: spaces.total_spaces,
            correct_detections: spaces.correct_detections,
            false_positives: spaces.false_positives,
            false_negatives: spaces.false_negatives,
        }
    }
}

/// Averages and totals across frames
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub frames: usize,
    pub average_map: f64,
    pub average_miou: f64,
    pub total_correct_detections: usize,
    pub total_false_positives: usize,
    pub total_false_negatives: usize,
}

impl MetricsSummary {
    pub fn from_frames(frames: &[FrameMetrics]) -> Self {
        let mut summary = frames.iter().fold(Self::default(), |mut acc, m| {
            acc.frames += 1;
            acc.average_map += m.map;
            acc.average_miou += m.miou;
            acc.total_correct_detections += m.correct_detections;
            acc.total_false_positives += m.false_positives;
            acc.total_false_negatives += m.false_negatives;
            acc
        });

        if summary.frames > 0 {
            summary.average_map /= summary.frames as f64;
            summary.average_miou /= summary.frames as f64;
        }
        summary
    }
}
