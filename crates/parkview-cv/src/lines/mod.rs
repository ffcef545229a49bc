//! Line evidence extraction
//!
//! Turns a grayscale frame into raw line segments. The filter chain (adaptive
//! threshold, blur, edge detection, dilation, Hough voting) is delegated to
//! library primitives; only the parameters live here.

pub mod extractor;
#[cfg(feature = "opencv")]
pub mod opencv_source;

pub use extractor::ImageprocLineSource;
#[cfg(feature = "opencv")]
pub use opencv_source::OpenCvLineSource;

use crate::traits::LineSource;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Implementation backing line extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineBackend {
    /// Pure-Rust chain built on `imageproc` (default)
    Imageproc,
    /// OpenCV chain with probabilistic Hough; needs the `opencv` feature
    OpenCv,
}

/// Line extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineExtractionConfig {
    pub backend: LineBackend,
    /// Gaussian kernel size (odd); sigma is derived from it
    pub blur_kernel_size: u32,
    /// Adaptive threshold neighbourhood radius (block size is `2r + 1`)
    pub threshold_block_radius: u32,
    /// Constant subtracted from the local mean (OpenCV backend only)
    pub threshold_offset: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Dilation radius applied to the edge map
    pub dilate_radius: u8,
    pub hough_vote_threshold: u32,
    /// Non-maximum suppression radius in Hough space (imageproc backend)
    pub hough_suppression_radius: u32,
    pub min_line_length: f64,
    /// Largest gap bridged inside a segment (OpenCV backend)
    pub max_line_gap: f64,
}

impl Default for LineExtractionConfig {
    fn default() -> Self {
        Self {
            backend: LineBackend::Imageproc,
            blur_kernel_size: 5,
            threshold_block_radius: 5,
            threshold_offset: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
            dilate_radius: 1,
            hough_vote_threshold: 50,
            hough_suppression_radius: 8,
            min_line_length: 50.0,
            max_line_gap: 10.0,
        }
    }
}

impl LineExtractionConfig {
    /// Lower edge and vote thresholds for faint or worn markings
    pub fn sensitive() -> Self {
        Self {
            canny_low: 25.0,
            canny_high: 90.0,
            hough_vote_threshold: 30,
            min_line_length: 30.0,
            ..Default::default()
        }
    }

    /// Gaussian sigma equivalent to the configured kernel size
    pub fn blur_sigma(&self) -> f32 {
        kernel_sigma(self.blur_kernel_size)
    }

    /// Instantiate the configured backend
    pub fn build_source(&self) -> Result<Box<dyn LineSource>> {
        match self.backend {
            LineBackend::Imageproc => Ok(Box::new(ImageprocLineSource::new(self.clone()))),
            #[cfg(feature = "opencv")]
            LineBackend::OpenCv => Ok(Box::new(OpenCvLineSource::new(self.clone()))),
            #[cfg(not(feature = "opencv"))]
            LineBackend::OpenCv => Err(crate::ParkviewError::BackendUnavailable("opencv").into()),
        }
    }
}

/// Sigma OpenCV derives for a Gaussian kernel of `size` when sigma is 0
pub fn kernel_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_sigma() {
        assert_relative_eq!(kernel_sigma(5), 1.1, epsilon = 1e-6);
        assert_relative_eq!(kernel_sigma(3), 0.8, epsilon = 1e-6);
    }

    #[cfg(not(feature = "opencv"))]
    #[test]
    fn test_opencv_backend_unavailable() {
        let config = LineExtractionConfig {
            backend: LineBackend::OpenCv,
            ..Default::default()
        };
        let err = config.build_source().err().unwrap();
        assert!(matches!(
            err.downcast_ref::<crate::ParkviewError>(),
            Some(crate::ParkviewError::BackendUnavailable("opencv"))
        ));
    }
}
