//! Vehicle segmentation and misparking detection

use crate::evaluation::mask::MaskClass;
use crate::lines::kernel_sigma;
use crate::traits::Rasterize;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{connected_components, Connectivity};
use parkview_core::{ParkingSpace, PixelBox};
use serde::{Deserialize, Serialize};

/// Vehicle segmentation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub blur_sigma: f32,
    /// Adaptive threshold neighbourhood radius
    pub threshold_block_radius: u32,
    /// Radius of the open/close structuring element
    pub morph_radius: u8,
    /// Components must be strictly larger than this many pixels
    pub min_vehicle_area: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            blur_sigma: kernel_sigma(5),
            threshold_block_radius: 5,
            morph_radius: 1,
            min_vehicle_area: 1000,
        }
    }
}

/// One filled vehicle blob
#[derive(Debug, Clone, Serialize)]
pub struct VehicleDetection {
    /// Filled area in pixels
    pub pixels: usize,
    pub bounds: PixelBox,
    /// True when the blob touches no parking space
    pub misparked: bool,
    /// Blob pixels, local to `bounds`
    #[serde(skip)]
    pub mask: GrayImage,
}

impl VehicleDetection {
    /// Frame coordinates of every blob pixel
    pub fn frame_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (ox, oy) = (self.bounds.x as u32, self.bounds.y as u32);
        self.mask
            .enumerate_pixels()
            .filter(|(_, _, m)| m[0] != 0)
            .map(move |(x, y, _)| (x + ox, y + oy))
    }
}

/// Vehicles found in one frame
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    pub vehicles: Vec<VehicleDetection>,
    /// Union of all kept vehicle blobs
    pub vehicle_mask: GrayImage,
}

impl SegmentationResult {
    pub fn misparked_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.misparked).count()
    }

    /// Label mask: 0 background, 1 parked vehicle, 2 misparked vehicle
    pub fn label_mask(&self) -> GrayImage {
        let (width, height) = self.vehicle_mask.dimensions();
        let mut labels = GrayImage::new(width, height);

        for vehicle in &self.vehicles {
            let class = if vehicle.misparked {
                MaskClass::Misparked
            } else {
                MaskClass::Parked
            };
            for (x, y) in vehicle.frame_pixels() {
                if x < width && y < height {
                    labels.put_pixel(x, y, Luma([class.label()]));
                }
            }
        }
        labels
    }
}

/// Threshold-based vehicle segmenter
pub struct CarSegmenter {
    config: SegmentationConfig,
}

impl CarSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Pixels darker than their neighbourhood, cleaned by open then close
    pub fn foreground(&self, frame: &GrayImage) -> GrayImage {
        let blurred = if self.config.blur_sigma > 0.0 {
            imageproc::filter::gaussian_blur_f32(frame, self.config.blur_sigma)
        } else {
            frame.clone()
        };

        let mut binary = imageproc::contrast::adaptive_threshold(&blurred, self.config.threshold_block_radius);
        image::imageops::invert(&mut binary);

        let radius = self.config.morph_radius;
        if radius == 0 {
            return binary;
        }
        let opened = imageproc::morphology::open(&binary, Norm::LInf, radius);
        imageproc::morphology::close(&opened, Norm::LInf, radius)
    }

    /// Segment vehicles and flag those outside every space.
    ///
    /// Each blob is the filled outer outline of a foreground component, so a
    /// solid car whose threshold response is only its rim still counts with
    /// its whole body.
    pub fn segment(&self, frame: &GrayImage, spaces: &[ParkingSpace]) -> SegmentationResult {
        let (width, height) = frame.dimensions();
        let filled = fill_holes(&self.foreground(frame));
        let space_mask = space_mask(width, height, spaces);

        let labels = connected_components(&filled, Connectivity::Eight, Luma([0u8]));
        let vehicles = extract_vehicles(&labels, &space_mask, self.config.min_vehicle_area);

        let mut vehicle_mask = GrayImage::new(width, height);
        for vehicle in &vehicles {
            for (x, y) in vehicle.frame_pixels() {
                vehicle_mask.put_pixel(x, y, Luma([255]));
            }
        }

        let result = SegmentationResult { vehicles, vehicle_mask };
        tracing::debug!(
            vehicles = result.vehicles.len(),
            misparked = result.misparked_count(),
            "segmented vehicles"
        );
        result
    }
}

impl Default for CarSegmenter {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

/// Union of all space polygons
fn space_mask(width: u32, height: u32, spaces: &[ParkingSpace]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for space in spaces {
        space.rasterize(&mut mask);
    }
    mask
}

/// Set every background pixel that is not reachable from the frame border.
///
/// Background is labelled with 4-connectivity, the dual of the 8-connected
/// foreground, so a diagonal gap in an outline does not leak.
fn fill_holes(foreground: &GrayImage) -> GrayImage {
    let (width, height) = foreground.dimensions();
    let background = connected_components(foreground, Connectivity::Four, Luma([255u8]));
    let regions = background.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut outside = vec![false; regions + 1];
    for (x, y, label) in background.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            outside[label[0] as usize] = true;
        }
    }

    let mut filled = foreground.clone();
    for (x, y, label) in background.enumerate_pixels() {
        let label = label[0] as usize;
        if label != 0 && !outside[label] {
            filled.put_pixel(x, y, Luma([255]));
        }
    }
    filled
}

#[derive(Clone, Copy)]
struct BlobStats {
    pixels: usize,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    touches_space: bool,
}

impl Default for BlobStats {
    fn default() -> Self {
        Self {
            pixels: 0,
            min_x: u32::MAX,
            min_y: u32::MAX,
            max_x: 0,
            max_y: 0,
            touches_space: false,
        }
    }
}

/// Vehicles for all labelled blobs strictly larger than `min_area`, in label order
fn extract_vehicles(
    labels: &image::ImageBuffer<Luma<u32>, Vec<u32>>,
    space_mask: &GrayImage,
    min_area: usize,
) -> Vec<VehicleDetection> {
    let count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
    let mut stats = vec![BlobStats::default(); count + 1];

    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        let blob = &mut stats[label];
        blob.pixels += 1;
        blob.touches_space |= space_mask.get_pixel(x, y)[0] != 0;
        blob.min_x = blob.min_x.min(x);
        blob.min_y = blob.min_y.min(y);
        blob.max_x = blob.max_x.max(x);
        blob.max_y = blob.max_y.max(y);
    }

    // slot per label; `None` for blobs too small to keep
    let mut slots: Vec<Option<usize>> = vec![None; count + 1];
    let mut vehicles = Vec::new();
    for (label, blob) in stats.iter().enumerate().skip(1) {
        if blob.pixels <= min_area {
            continue;
        }
        let (w, h) = (blob.max_x - blob.min_x + 1, blob.max_y - blob.min_y + 1);
        slots[label] = Some(vehicles.len());
        vehicles.push(VehicleDetection {
            pixels: blob.pixels,
            bounds: PixelBox {
                x: blob.min_x as i32,
                y: blob.min_y as i32,
                width: w as i32,
                height: h as i32,
            },
            misparked: !blob.touches_space,
            mask: GrayImage::new(w, h),
        });
    }

    for (x, y, label) in labels.enumerate_pixels() {
        if let Some(index) = slots[label[0] as usize] {
            let blob = &stats[label[0] as usize];
            vehicles[index]
                .mask
                .put_pixel(x - blob.min_x, y - blob.min_y, Luma([255]));
        }
    }

    vehicles
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_core::RotatedRect;

    fn blob(image: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, Luma([value]));
            }
        }
    }

    fn left_space() -> Vec<ParkingSpace> {
        vec![ParkingSpace::from_rect(1, RotatedRect::axis_aligned(0.0, 0.0, 60.0, 100.0))]
    }

    fn two_blob_labels() -> image::ImageBuffer<Luma<u32>, Vec<u32>> {
        let mut fg = GrayImage::new(200, 100);
        blob(&mut fg, 10, 10, 40, 40, 255);
        blob(&mut fg, 120, 10, 40, 40, 255);
        connected_components(&fg, Connectivity::Eight, Luma([0u8]))
    }

    /// 300x200 lot at gray 180 with a solid dark 120x80 car at (60, 50)
    fn lot_with_car() -> GrayImage {
        let mut frame = GrayImage::from_pixel(300, 200, Luma([180]));
        blob(&mut frame, 60, 50, 120, 80, 40);
        frame
    }

    #[test]
    fn test_misparked_when_outside_all_spaces() {
        let mask = space_mask(200, 100, &left_space());
        let vehicles = extract_vehicles(&two_blob_labels(), &mask, 1000);

        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].pixels, 1600);
        assert!(!vehicles[0].misparked);
        assert!(vehicles[1].misparked);
        assert_eq!((vehicles[1].bounds.x, vehicles[1].bounds.width), (120, 40));
        assert_eq!(vehicles[1].mask.dimensions(), (40, 40));
    }

    #[test]
    fn test_small_blobs_dropped() {
        let mask = space_mask(200, 100, &[]);
        assert!(extract_vehicles(&two_blob_labels(), &mask, 1600).is_empty());
    }

    #[test]
    fn test_label_mask_classes() {
        let mask = space_mask(200, 100, &left_space());
        let result = SegmentationResult {
            vehicles: extract_vehicles(&two_blob_labels(), &mask, 1000),
            vehicle_mask: GrayImage::new(200, 100),
        };

        let label_mask = result.label_mask();
        assert_eq!(label_mask.get_pixel(20, 20)[0], 1);
        assert_eq!(label_mask.get_pixel(130, 20)[0], 2);
        assert_eq!(label_mask.get_pixel(90, 90)[0], 0);
        assert_eq!(result.misparked_count(), 1);
    }

    #[test]
    fn test_fill_holes_closes_ring() {
        let mut ring = GrayImage::new(60, 60);
        blob(&mut ring, 10, 10, 40, 40, 255);
        blob(&mut ring, 14, 14, 32, 32, 0);

        let filled = fill_holes(&ring);
        assert_eq!(filled.get_pixel(30, 30)[0], 255);
        assert_eq!(filled.get_pixel(5, 5)[0], 0);
        assert_eq!(filled.pixels().filter(|p| p[0] != 0).count(), 1600);
    }

    #[test]
    fn test_uniform_frame_has_no_vehicles() {
        let frame = GrayImage::from_pixel(120, 80, Luma([128]));
        let result = CarSegmenter::default().segment(&frame, &[]);
        assert!(result.vehicles.is_empty());
        assert_eq!(result.vehicle_mask.dimensions(), (120, 80));
        assert!(result.vehicle_mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_solid_car_is_filled() {
        let frame = lot_with_car();
        let under_car = vec![ParkingSpace::from_rect(1, RotatedRect::axis_aligned(100.0, 60.0, 40.0, 60.0))];
        let result = CarSegmenter::default().segment(&frame, &under_car);

        assert_eq!(result.vehicles.len(), 1);
        let car = &result.vehicles[0];
        assert!(car.pixels > 8000 && car.pixels < 11000, "filled area {}", car.pixels);
        assert!(!car.misparked);
        assert_eq!(result.vehicle_mask.get_pixel(120, 90)[0], 255);
        assert_eq!(result.vehicle_mask.get_pixel(10, 10)[0], 0);
        assert_eq!(result.label_mask().get_pixel(120, 90)[0], MaskClass::Parked.label());
    }

    #[test]
    fn test_solid_car_outside_spaces_is_misparked() {
        let frame = lot_with_car();
        let away = vec![ParkingSpace::from_rect(1, RotatedRect::axis_aligned(220.0, 20.0, 60.0, 100.0))];
        let result = CarSegmenter::default().segment(&frame, &away);

        assert_eq!(result.vehicles.len(), 1);
        assert!(result.vehicles[0].misparked);
        assert_eq!(result.label_mask().get_pixel(120, 90)[0], MaskClass::Misparked.label());
    }
}
