//! Overlays and top-view occupancy map

use crate::detection::config::VisualizationConfig;
use crate::segmentation::SegmentationResult;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use parkview_core::ParkingSpace;

pub const EMPTY_SPACE: Rgb<u8> = Rgb([0, 0, 255]);
pub const OCCUPIED_SPACE: Rgb<u8> = Rgb([255, 0, 0]);
pub const CAR_PARKED: Rgb<u8> = Rgb([0, 255, 0]);
pub const CAR_MISPARKED: Rgb<u8> = Rgb([255, 255, 0]);

const VEHICLE_ALPHA: f32 = 0.3;
const MAP_MARKER_HALF: i32 = 10;

/// Draws detection results for frames of a fixed size
pub struct Visualizer {
    frame_size: (u32, u32),
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new(frame_size: (u32, u32), config: &VisualizationConfig) -> Self {
        Self {
            frame_size,
            config: config.clone(),
        }
    }

    /// Outline each space: blue when empty, red when occupied
    pub fn draw_spaces(&self, frame: &mut RgbImage, spaces: &[ParkingSpace]) {
        if !self.config.draw_spaces {
            return;
        }

        for space in spaces {
            let color = if space.occupied { OCCUPIED_SPACE } else { EMPTY_SPACE };
            let corners = space.rect.corners();
            for i in 0..4 {
                let (a, b) = (corners[i], corners[(i + 1) % 4]);
                // two passes give a 2px stroke
                for offset in [0.0, 1.0] {
                    draw_line_segment_mut(
                        frame,
                        (a.x as f32 + offset, a.y as f32),
                        (b.x as f32 + offset, b.y as f32),
                        color,
                    );
                }
            }
        }
    }

    /// Tint vehicle pixels: green when parked, yellow when misparked
    pub fn draw_vehicles(&self, frame: &mut RgbImage, segmentation: &SegmentationResult) {
        if !self.config.draw_vehicles {
            return;
        }

        for vehicle in &segmentation.vehicles {
            let color = if vehicle.misparked { CAR_MISPARKED } else { CAR_PARKED };
            for (x, y) in vehicle.frame_pixels() {
                if x >= frame.width() || y >= frame.height() {
                    continue;
                }
                let pixel = frame.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended = VEHICLE_ALPHA * color[c] as f32 + (1.0 - VEHICLE_ALPHA) * pixel[c] as f32;
                    pixel[c] = blended.round() as u8;
                }
            }
        }
    }

    /// Top-view map with one square per space, positioned by its scaled center
    pub fn create_map(&self, spaces: &[ParkingSpace]) -> RgbImage {
        let (map_w, map_h) = self.config.map_size;
        let mut map = RgbImage::new(map_w, map_h);
        let (frame_w, frame_h) = self.frame_size;
        if frame_w == 0 || frame_h == 0 {
            return map;
        }

        for space in spaces {
            let cx = (space.rect.center.x / frame_w as f64 * map_w as f64) as i32;
            let cy = (space.rect.center.y / frame_h as f64 * map_h as f64) as i32;
            let color = if space.occupied { OCCUPIED_SPACE } else { EMPTY_SPACE };
            let side = (2 * MAP_MARKER_HALF + 1) as u32;
            draw_filled_rect_mut(
                &mut map,
                Rect::at(cx - MAP_MARKER_HALF, cy - MAP_MARKER_HALF).of_size(side, side),
                color,
            );
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::VehicleDetection;
    use image::{GrayImage, Luma};
    use parkview_core::{PixelBox, RotatedRect};

    fn spaces() -> Vec<ParkingSpace> {
        let mut occupied = ParkingSpace::from_rect(2, RotatedRect::axis_aligned(100.0, 40.0, 40.0, 80.0));
        occupied.occupied = true;
        vec![
            ParkingSpace::from_rect(1, RotatedRect::axis_aligned(20.0, 40.0, 40.0, 80.0)),
            occupied,
        ]
    }

    #[test]
    fn test_space_outline_colors() {
        let visualizer = Visualizer::new((200, 150), &VisualizationConfig::default());
        let mut frame = RgbImage::new(200, 150);
        visualizer.draw_spaces(&mut frame, &spaces());

        assert_eq!(*frame.get_pixel(20, 80), EMPTY_SPACE);
        assert_eq!(*frame.get_pixel(100, 80), OCCUPIED_SPACE);
        assert_eq!(*frame.get_pixel(40, 80), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_map_markers() {
        let visualizer = Visualizer::new((200, 150), &VisualizationConfig::default());
        let map = visualizer.create_map(&spaces());

        assert_eq!(map.dimensions(), (400, 300));
        // space 1 center (40, 80) scales to (80, 160)
        assert_eq!(*map.get_pixel(80, 160), EMPTY_SPACE);
        assert_eq!(*map.get_pixel(240, 160), OCCUPIED_SPACE);
        assert_eq!(*map.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_vehicle_blend() {
        let visualizer = Visualizer::new((10, 10), &VisualizationConfig::default());
        let mask = GrayImage::from_pixel(1, 1, Luma([255]));
        let segmentation = SegmentationResult {
            vehicles: vec![VehicleDetection {
                pixels: 1,
                bounds: PixelBox { x: 2, y: 2, width: 1, height: 1 },
                misparked: true,
                mask,
            }],
            vehicle_mask: GrayImage::new(10, 10),
        };

        let mut frame = RgbImage::new(10, 10);
        visualizer.draw_vehicles(&mut frame, &segmentation);
        assert_eq!(*frame.get_pixel(2, 2), Rgb([77, 77, 0]));
        assert_eq!(*frame.get_pixel(3, 3), Rgb([0, 0, 0]));
    }
}
