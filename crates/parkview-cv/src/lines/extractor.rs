//! Line extraction built on `imageproc`

use super::LineExtractionConfig;
use crate::traits::LineSource;
use crate::Result;
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};
use parkview_core::{LineSegment, Point2};

/// Threshold, blur, Canny, dilate, Hough; lines clipped to the frame
pub struct ImageprocLineSource {
    config: LineExtractionConfig,
}

impl ImageprocLineSource {
    pub fn new(config: LineExtractionConfig) -> Self {
        Self { config }
    }

    /// Binarize against the local mean, then soften
    pub fn preprocess(&self, image: &GrayImage) -> GrayImage {
        let binary = imageproc::contrast::adaptive_threshold(image, self.config.threshold_block_radius);
        let sigma = self.config.blur_sigma();
        if sigma > 0.0 {
            imageproc::filter::gaussian_blur_f32(&binary, sigma)
        } else {
            binary
        }
    }

    /// Edge map with short breaks closed by dilation
    pub fn enhance(&self, image: &GrayImage) -> GrayImage {
        let edges = imageproc::edges::canny(image, self.config.canny_low, self.config.canny_high);
        if self.config.dilate_radius == 0 {
            return edges;
        }
        imageproc::morphology::dilate(&edges, Norm::LInf, self.config.dilate_radius)
    }

    fn detect(&self, edges: &GrayImage) -> Vec<LineSegment> {
        let options = LineDetectionOptions {
            vote_threshold: self.config.hough_vote_threshold,
            suppression_radius: self.config.hough_suppression_radius,
        };
        let (width, height) = (edges.width() as f64, edges.height() as f64);

        detect_lines(edges, options)
            .iter()
            .filter_map(|line| clip_polar_line(line, width, height))
            .filter(|segment| segment.length() >= self.config.min_line_length)
            .collect()
    }
}

impl LineSource for ImageprocLineSource {
    fn extract_lines(&self, image: &GrayImage) -> Result<Vec<LineSegment>> {
        let processed = self.preprocess(image);
        let edges = self.enhance(&processed);
        let segments = self.detect(&edges);

        tracing::debug!(segments = segments.len(), "extracted line segments");
        Ok(segments)
    }
}

/// Segment where `x cos(t) + y sin(t) = r` crosses the `width x height` frame.
fn clip_polar_line(line: &PolarLine, width: f64, height: f64) -> Option<LineSegment> {
    let (sin, cos) = (line.angle_in_degrees as f64).to_radians().sin_cos();
    let r = line.r as f64;

    let mut hits: Vec<Point2> = Vec::with_capacity(4);
    if cos.abs() > 1e-9 {
        for y in [0.0, height] {
            let x = (r - y * sin) / cos;
            if (0.0..=width).contains(&x) {
                hits.push(Point2::new(x, y));
            }
        }
    }
    if sin.abs() > 1e-9 {
        for x in [0.0, width] {
            let y = (r - x * cos) / sin;
            if (0.0..=height).contains(&y) {
                hits.push(Point2::new(x, y));
            }
        }
    }

    let mut best: Option<(Point2, Point2, f64)> = None;
    for (i, a) in hits.iter().enumerate() {
        for b in &hits[i + 1..] {
            let length = a.distance_to(b);
            if length > best.map_or(0.0, |(_, _, l)| l) {
                best = Some((*a, *b, length));
            }
        }
    }

    best.map(|(a, b, _)| LineSegment::from_points(a, b))
}
