//! Parkview Computer Vision Library
//!
//! Parking-space detection from line evidence, occupancy and vehicle analysis,
//! and scoring of detections against ground truth.

pub mod detection;
pub mod error;
pub mod evaluation;
pub mod lines;
pub mod occupancy;
pub mod render;
pub mod segmentation;
pub mod utils;

// Re-export commonly used types
pub use detection::{DetectionConfig, DetectionResult, SpaceDetector};
pub use error::ParkviewError;
pub use evaluation::{EvaluationConfig, FrameMetrics, PerformanceEvaluator};
pub use lines::{ImageprocLineSource, LineBackend, LineExtractionConfig};
pub use occupancy::{OccupancyClassifier, OccupancyConfig};
pub use render::Visualizer;
pub use segmentation::{CarSegmenter, SegmentationConfig, SegmentationResult};

pub use parkview_core::{LineSegment, ParkingSpace, PixelPoint, Point2, RotatedRect, SpaceSet};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the CV system
pub mod traits {
    use super::*;
    use image::GrayImage;

    /// Source of raw line evidence for one image
    pub trait LineSource {
        fn extract_lines(&self, image: &GrayImage) -> Result<Vec<LineSegment>>;
    }

    /// Shapes that can be filled into a binary canvas
    pub trait Rasterize {
        fn rasterize(&self, canvas: &mut GrayImage);
    }

    impl LineSource for Vec<LineSegment> {
        fn extract_lines(&self, _image: &GrayImage) -> Result<Vec<LineSegment>> {
            Ok(self.clone())
        }
    }
}
