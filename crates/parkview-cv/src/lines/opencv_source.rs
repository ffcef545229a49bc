//! Line extraction through OpenCV with probabilistic Hough

use super::LineExtractionConfig;
use crate::traits::LineSource;
use crate::Result;
use anyhow::Context;
use image::GrayImage;
use opencv::{
    core::{self, Mat, Point, Size, Vec4i, Vector},
    imgproc,
    prelude::*,
};
use parkview_core::LineSegment;

/// OpenCV line extractor: adaptive threshold, blur, Canny, dilate, `HoughLinesP`
pub struct OpenCvLineSource {
    config: LineExtractionConfig,
}

impl OpenCvLineSource {
    pub fn new(config: LineExtractionConfig) -> Self {
        Self { config }
    }

    fn to_mat(image: &GrayImage) -> Result<Mat> {
        let mat = Mat::new_rows_cols_with_data(image.height() as i32, image.width() as i32, image.as_raw())
            .context("Failed to wrap grayscale buffer")?;
        mat.try_clone().context("Failed to copy grayscale buffer")
    }

    fn preprocess(&self, image: &Mat) -> Result<Mat> {
        let mut binary = Mat::default();
        imgproc::adaptive_threshold(
            image,
            &mut binary,
            255.0,
            imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
            imgproc::THRESH_BINARY,
            2 * self.config.threshold_block_radius as i32 + 1,
            self.config.threshold_offset,
        )?;

        let kernel = self.config.blur_kernel_size as i32;
        if kernel <= 1 {
            return Ok(binary);
        }

        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            &binary,
            &mut blurred,
            Size::new(kernel, kernel),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;
        Ok(blurred)
    }

    fn enhance(&self, image: &Mat) -> Result<Mat> {
        let mut edges = Mat::default();
        imgproc::canny(
            image,
            &mut edges,
            self.config.canny_low as f64,
            self.config.canny_high as f64,
            3,
            false,
        )?;

        if self.config.dilate_radius == 0 {
            return Ok(edges);
        }

        let side = 2 * self.config.dilate_radius as i32 + 1;
        let element = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(side, side),
            Point::new(-1, -1),
        )?;
        let mut dilated = Mat::default();
        imgproc::dilate(
            &edges,
            &mut dilated,
            &element,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;
        Ok(dilated)
    }
}

impl LineSource for OpenCvLineSource {
    fn extract_lines(&self, image: &GrayImage) -> Result<Vec<LineSegment>> {
        let mat = Self::to_mat(image)?;
        let processed = self.preprocess(&mat)?;
        let edges = self.enhance(&processed)?;

        let mut lines: Vector<Vec4i> = Vector::new();
        imgproc::hough_lines_p(
            &edges,
            &mut lines,
            1.0,
            std::f64::consts::PI / 180.0,
            self.config.hough_vote_threshold as i32,
            self.config.min_line_length,
            self.config.max_line_gap,
        )
        .context("Probabilistic Hough transform failed")?;

        let segments: Vec<LineSegment> = lines
            .iter()
            .map(|l| LineSegment::new(l[0] as f64, l[1] as f64, l[2] as f64, l[3] as f64))
            .collect();

        tracing::debug!(segments = segments.len(), "extracted line segments (opencv)");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_blank_image_has_no_lines() -> Result<()> {
        let source = OpenCvLineSource::new(LineExtractionConfig::default());
        let segments = source.extract_lines(&GrayImage::from_pixel(64, 64, Luma([90])))?;
        assert!(segments.is_empty());
        Ok(())
    }

    #[test]
    fn test_mat_dimensions() -> Result<()> {
        let mat = OpenCvLineSource::to_mat(&GrayImage::new(30, 20))?;
        assert_eq!((mat.cols(), mat.rows()), (30, 20));
        Ok(())
    }
}
