//! Scoring of detections and segmentations against ground truth

pub mod mask;
pub mod matcher;
pub mod metrics;
pub mod overlap;
pub mod report;

pub use mask::{score_masks, MaskClass, SegmentationScore};
pub use matcher::{match_spaces, SpaceMatchResult};
pub use metrics::{FrameMetrics, MetricsSummary};
pub use overlap::{binary_iou, fill_polygon, rect_iou};
pub use report::{format_report, write_report};

use crate::Result;
use image::GrayImage;
use parkview_core::ParkingSpace;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Minimum IoU (inclusive) for a detection to count as correct
    pub iou_threshold: f64,
    /// Raster canvas used for rectangle IoU
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            canvas_width: 1000,
            canvas_height: 1000,
        }
    }
}

/// Frame-level evaluator accumulating metrics across a sequence
pub struct PerformanceEvaluator {
    config: EvaluationConfig,
    frames: Vec<FrameMetrics>,
}

impl PerformanceEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluate_space_detection(
        &self,
        detected: &[ParkingSpace],
        ground_truth: &[ParkingSpace],
    ) -> SpaceMatchResult {
        match_spaces(detected, ground_truth, &self.config)
    }

    pub fn evaluate_segmentation(
        &self,
        predicted: &GrayImage,
        ground_truth: &GrayImage,
    ) -> Result<SegmentationScore> {
        score_masks(predicted, ground_truth)
    }

    /// Score one frame and record it for the final report
    pub fn evaluate_frame(
        &mut self,
        detected: &[ParkingSpace],
        ground_truth: &[ParkingSpace],
        masks: Option<(&GrayImage, &GrayImage)>,
    ) -> Result<FrameMetrics> {
        let spaces = self.evaluate_space_detection(detected, ground_truth);
        let segmentation = masks
            .map(|(predicted, truth)| self.evaluate_segmentation(predicted, truth))
            .transpose()?;

        let metrics = FrameMetrics::from_parts(&spaces, segmentation.as_ref());
        tracing::info!(
            frame = self.frames.len() + 1,
            map = metrics.map,
            miou = metrics.miou,
            "frame evaluated"
        );

        self.frames.push(metrics.clone());
        Ok(metrics)
    }

    pub fn frames(&self) -> &[FrameMetrics] {
        &self.frames
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from_frames(&self.frames)
    }

    pub fn generate_report<P: AsRef<Path>>(&self, output_path: P) -> Result<()> {
        write_report(output_path, &self.frames)
    }
}

impl Default for PerformanceEvaluator {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use parkview_core::RotatedRect;

    #[test]
    fn test_evaluate_frame_records_metrics() -> Result<()> {
        let mut evaluator = PerformanceEvaluator::default();
        let truth = vec![ParkingSpace::from_rect(1, RotatedRect::axis_aligned(0.0, 0.0, 40.0, 90.0))];
        let mask = GrayImage::from_pixel(20, 20, Luma([0]));

        let metrics = evaluator.evaluate_frame(&truth, &truth, Some((&mask, &mask)))?;
        evaluator.evaluate_frame(&[], &truth, None)?;

        assert_eq!(metrics.map, 1.0);
        // background only: one class at 1.0, two with empty unions
        assert!((metrics.miou - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(evaluator.frames().len(), 2);
        assert_eq!(evaluator.summary().total_false_negatives, 1);
        Ok(())
    }
}
