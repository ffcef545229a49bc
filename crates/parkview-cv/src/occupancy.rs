//! Reference-frame differencing per parking space

use crate::evaluation::overlap::fill_polygon;
use crate::lines::kernel_sigma;
use crate::Result;
use image::GrayImage;
use parkview_core::{ParkingSpace, Point2};
use serde::{Deserialize, Serialize};

/// Occupancy classification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    /// Blur applied to both reference and frame; 0 disables it
    pub blur_sigma: f32,
    /// A pixel differs when `|frame - reference|` exceeds this
    pub pixel_difference_threshold: u8,
    /// A space is occupied when the differing share of its box exceeds this
    pub occupied_ratio: f64,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            blur_sigma: kernel_sigma(5),
            pixel_difference_threshold: 30,
            occupied_ratio: 0.3,
        }
    }
}

/// Compares frames against an empty-lot reference
pub struct OccupancyClassifier {
    config: OccupancyConfig,
    reference: GrayImage,
}

impl OccupancyClassifier {
    pub fn new(config: OccupancyConfig, empty_lot: &GrayImage) -> Self {
        let reference = preprocess(empty_lot, config.blur_sigma);
        Self { config, reference }
    }

    pub fn config(&self) -> &OccupancyConfig {
        &self.config
    }

    /// Share of the space's bounding box whose pixels changed against the reference.
    ///
    /// Only pixels inside the rotated rectangle can count as changed, but the
    /// denominator is the whole (frame-clipped) bounding box.
    pub fn difference_ratio(&self, processed: &GrayImage, space: &ParkingSpace) -> f64 {
        let (width, height) = processed.dimensions();
        let bbox = space.rect.bounding_box();

        let x0 = bbox.x.max(0);
        let y0 = bbox.y.max(0);
        let x1 = bbox.x.saturating_add(bbox.width).min(width as i32);
        let y1 = bbox.y.saturating_add(bbox.height).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return 0.0;
        }

        let (box_w, box_h) = ((x1 - x0) as u32, (y1 - y0) as u32);
        let mut mask = GrayImage::new(box_w, box_h);
        let local: Vec<Point2> = space
            .rect
            .corners()
            .iter()
            .map(|c| {
                let p = c.round();
                Point2::new((p.x - x0) as f64, (p.y - y0) as f64)
            })
            .collect();
        fill_polygon(&mut mask, &local);

        let threshold = self.config.pixel_difference_threshold;
        let changed = mask
            .enumerate_pixels()
            .filter(|(_, _, m)| m[0] != 0)
            .filter(|&(x, y, _)| {
                let (gx, gy) = (x + x0 as u32, y + y0 as u32);
                let a = processed.get_pixel(gx, gy)[0];
                let b = self.reference.get_pixel(gx, gy)[0];
                a.abs_diff(b) > threshold
            })
            .count();

        changed as f64 / (box_w as u64 * box_h as u64) as f64
    }

    pub fn is_occupied(&self, processed: &GrayImage, space: &ParkingSpace) -> bool {
        self.difference_ratio(processed, space) > self.config.occupied_ratio
    }

    /// Set `occupied` on every space; returns the occupied count.
    ///
    /// The frame must have the reference's dimensions.
    pub fn process_frame(&self, frame: &GrayImage, spaces: &mut [ParkingSpace]) -> Result<usize> {
        if frame.dimensions() != self.reference.dimensions() {
            anyhow::bail!(
                "Frame size {:?} differs from reference size {:?}",
                frame.dimensions(),
                self.reference.dimensions()
            );
        }

        let processed = preprocess(frame, self.config.blur_sigma);
        for space in spaces.iter_mut() {
            space.occupied = self.is_occupied(&processed, space);
        }

        let occupied = spaces.iter().filter(|s| s.occupied).count();
        tracing::debug!(spaces = spaces.len(), occupied, "classified occupancy");
        Ok(occupied)
    }
}

fn preprocess(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(image, sigma)
    } else {
        image.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use parkview_core::RotatedRect;

    fn lot() -> (GrayImage, Vec<ParkingSpace>) {
        let empty = GrayImage::from_pixel(200, 120, Luma([60]));
        let spaces = vec![
            ParkingSpace::from_rect(1, RotatedRect::axis_aligned(10.0, 10.0, 40.0, 90.0)),
            ParkingSpace::from_rect(2, RotatedRect::axis_aligned(100.0, 10.0, 40.0, 90.0)),
        ];
        (empty, spaces)
    }

    #[test]
    fn test_car_in_first_space() -> Result<()> {
        let (empty, mut spaces) = lot();
        let classifier = OccupancyClassifier::new(OccupancyConfig::default(), &empty);

        let mut frame = empty.clone();
        for y in 20..90 {
            for x in 15..45 {
                frame.put_pixel(x, y, Luma([220]));
            }
        }

        let occupied = classifier.process_frame(&frame, &mut spaces)?;
        assert_eq!(occupied, 1);
        assert!(spaces[0].occupied);
        assert!(!spaces[1].occupied);
        Ok(())
    }

    #[test]
    fn test_unchanged_frame_is_empty() -> Result<()> {
        let (empty, mut spaces) = lot();
        spaces[1].occupied = true;
        let classifier = OccupancyClassifier::new(OccupancyConfig::default(), &empty);

        assert_eq!(classifier.process_frame(&empty, &mut spaces)?, 0);
        assert!(!spaces[1].occupied);
        Ok(())
    }

    #[test]
    fn test_space_outside_frame() {
        let (empty, _) = lot();
        let classifier = OccupancyClassifier::new(OccupancyConfig::default(), &empty);
        let far = ParkingSpace::from_rect(9, RotatedRect::axis_aligned(500.0, 500.0, 40.0, 90.0));
        assert_eq!(classifier.difference_ratio(&empty, &far), 0.0);
    }

    #[test]
    fn test_huge_coordinates_do_not_overflow() {
        let (empty, _) = lot();
        let classifier = OccupancyClassifier::new(OccupancyConfig::default(), &empty);
        let huge = ParkingSpace::from_rect(
            9,
            RotatedRect::axis_aligned(f64::from(i32::MAX) - 10.0, 0.0, 1.0e12, 1.0e12),
        );
        assert_eq!(classifier.difference_ratio(&empty, &huge), 0.0);

        let covering = ParkingSpace::from_rect(10, RotatedRect::axis_aligned(-1.0e12, -1.0e12, 4.0e12, 4.0e12));
        assert_eq!(classifier.difference_ratio(&empty, &covering), 0.0);
    }

    #[test]
    fn test_size_mismatch_is_error() {
        let (empty, mut spaces) = lot();
        let classifier = OccupancyClassifier::new(OccupancyConfig::default(), &empty);
        assert!(classifier.process_frame(&GrayImage::new(10, 10), &mut spaces).is_err());
    }
}
