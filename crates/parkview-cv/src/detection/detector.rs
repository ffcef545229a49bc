//! High-level parking-space detector

use super::candidate::synthesize_candidates;
use super::cluster::cluster_segments;
use super::config::DetectionConfig;
use super::filter::finalize_spaces;
use super::intersect::build_corner_sets;
use crate::render::Visualizer;
use crate::traits::LineSource;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::{GrayImage, RgbImage};
use parkview_core::{LineSegment, ParkingSpace, SpaceSet};
use serde::Serialize;
use std::path::Path;

/// Ordered spaces for one frame plus per-stage counts
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub spaces: Vec<ParkingSpace>,
    pub stats: DetectionStats,
}

/// Detection statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionStats {
    pub segments: usize,
    pub clusters: usize,
    pub corner_sets: usize,
    pub candidates: usize,
    pub spaces: usize,
    pub processing_time_ms: u64,
}

/// Run clustering, corner building, fitting and filtering over `segments`.
///
/// Every call starts from scratch; nothing carries over between frames.
pub fn detect_spaces(segments: &[LineSegment], config: &DetectionConfig) -> DetectionResult {
    let start_time = std::time::Instant::now();

    let clusters = cluster_segments(segments, &config.clustering);
    let corner_sets = build_corner_sets(&clusters, &config.intersections);
    let corner_set_count = corner_sets.len();

    let candidates = synthesize_candidates(corner_sets);
    let candidate_count = candidates.len();

    let spaces = finalize_spaces(candidates, &config.validity, &config.ordering);

    let stats = DetectionStats {
        segments: segments.len(),
        clusters: clusters.len(),
        corner_sets: corner_set_count,
        candidates: candidate_count,
        spaces: spaces.len(),
        processing_time_ms: start_time.elapsed().as_millis() as u64,
    };

    tracing::debug!(
        segments = stats.segments,
        clusters = stats.clusters,
        corner_sets = stats.corner_sets,
        candidates = stats.candidates,
        spaces = stats.spaces,
        "space detection finished"
    );

    DetectionResult { spaces, stats }
}

/// Parking-space detector: a line source feeding the geometric pipeline
pub struct SpaceDetector {
    config: DetectionConfig,
    line_source: Box<dyn LineSource>,
}

impl SpaceDetector {
    /// Create a detector using the line backend named in the configuration
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let line_source = config.lines.build_source()?;
        Ok(Self { config, line_source })
    }

    /// Create a detector with a caller-supplied line source
    pub fn with_line_source(config: DetectionConfig, line_source: Box<dyn LineSource>) -> Self {
        Self { config, line_source }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect spaces in an image file
    pub fn detect_from_file<P: AsRef<Path>>(&self, image_path: P) -> Result<DetectionResult> {
        let image = ImageUtils::load_grayscale(&image_path)
            .with_context(|| format!("Failed to load image: {:?}", image_path.as_ref()))?;

        let result = self.detect_from_image(&image)?;

        if self.config.visualization.save_overlays {
            let color_image = ImageUtils::load_color(&image_path)?;
            self.create_visualization(&color_image, &result.spaces)?;
        }

        Ok(result)
    }

    /// Detect from an RGB frame
    pub fn detect_from_rgb_image(&self, rgb_image: &RgbImage) -> Result<DetectionResult> {
        let gray = ImageUtils::rgb_to_gray(rgb_image);
        self.detect_from_image(&gray)
    }

    /// Core detection from a grayscale frame
    pub fn detect_from_image(&self, image: &GrayImage) -> Result<DetectionResult> {
        let segments = self.line_source.extract_lines(image)?;
        let result = self.detect_from_segments(&segments);

        tracing::info!(
            width = image.width(),
            height = image.height(),
            spaces = result.spaces.len(),
            "detected parking spaces"
        );
        Ok(result)
    }

    /// Detection from already extracted line evidence
    pub fn detect_from_segments(&self, segments: &[LineSegment]) -> DetectionResult {
        detect_spaces(segments, &self.config)
    }

    fn create_visualization(&self, image: &RgbImage, spaces: &[ParkingSpace]) -> Result<()> {
        let visualizer = Visualizer::new(image.dimensions(), &self.config.visualization);
        let mut output = image.clone();
        visualizer.draw_spaces(&mut output, spaces);

        std::fs::create_dir_all(&self.config.output_dir)
            .with_context(|| format!("Failed to create output dir: {:?}", self.config.output_dir))?;
        let output_path = self.config.output_dir.join("space_detection.png");
        ImageUtils::save_rgb(&output, &output_path)?;

        tracing::info!(path = ?output_path, "visualization saved");
        Ok(())
    }

    /// Export detected spaces as a JSON space-definition file
    pub fn export_json(&self, result: &DetectionResult, output_path: &Path) -> Result<()> {
        SpaceSet::new(result.spaces.clone())
            .save(output_path)
            .with_context(|| format!("Failed to export detections to: {:?}", output_path))
    }
}
