//! Per-class IoU of label masks

use super::overlap::binary_iou;
use crate::error::ParkviewError;
use crate::Result;
use image::{GrayImage, Luma};
use serde::Serialize;

/// Pixel classes of a segmentation label mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaskClass {
    Background = 0,
    Parked = 1,
    Misparked = 2,
}

impl MaskClass {
    /// Classes averaged into mIoU
    pub const ALL: [MaskClass; 3] = [MaskClass::Background, MaskClass::Parked, MaskClass::Misparked];

    pub fn label(self) -> u8 {
        self as u8
    }
}

/// Binary mask of the pixels carrying `class`
pub fn class_mask(labels: &GrayImage, class: MaskClass) -> GrayImage {
    let label = class.label();
    GrayImage::from_fn(labels.width(), labels.height(), |x, y| {
        if labels.get_pixel(x, y)[0] == label {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

pub fn class_iou(predicted: &GrayImage, ground_truth: &GrayImage, class: MaskClass) -> f64 {
    binary_iou(&class_mask(predicted, class), &class_mask(ground_truth, class))
}

/// IoU per class and their mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationScore {
    pub class_ious: Vec<(MaskClass, f64)>,
    pub mean_iou: f64,
}

/// Score a predicted label mask against ground truth.
///
/// Both masks must have the same dimensions.
pub fn score_masks(predicted: &GrayImage, ground_truth: &GrayImage) -> Result<SegmentationScore> {
    if predicted.dimensions() != ground_truth.dimensions() {
        return Err(ParkviewError::MaskShapeMismatch {
            predicted: predicted.dimensions(),
            ground_truth: ground_truth.dimensions(),
        }
        .into());
    }

    let class_ious: Vec<(MaskClass, f64)> = MaskClass::ALL
        .iter()
        .map(|&class| (class, class_iou(predicted, ground_truth, class)))
        .collect();
    let mean_iou = class_ious.iter().map(|(_, iou)| iou).sum::<f64>() / class_ious.len() as f64;

    tracing::debug!(mean_iou, "scored segmentation mask");
    Ok(SegmentationScore { class_ious, mean_iou })
}
