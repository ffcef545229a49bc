//! Overlap primitives shared by space matching and mask scoring
//!
//! Shapes are compared by filling them into binary canvases and counting pixels,
//! so any polygon (rotated or not, convex or not) goes through one code path.

use crate::traits::Rasterize;
use image::{GrayImage, Luma};
use parkview_core::{ParkingSpace, Point2, RotatedRect};

const FILL: Luma<u8> = Luma([255]);

/// Fill `polygon` into `canvas` with the even-odd rule.
///
/// Rows are sampled at integer y with half-open edges, so shared edges between
/// adjacent polygons are not counted twice. Parts outside the canvas are clipped;
/// fewer than three vertices fill nothing.
pub fn fill_polygon(canvas: &mut GrayImage, polygon: &[Point2]) {
    if polygon.len() < 3 || canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let max_x = canvas.width() as f64 - 1.0;
    let max_y = canvas.height() as f64 - 1.0;
    let top = polygon.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).ceil().max(0.0);
    let bottom = polygon.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).floor().min(max_y);
    if !(top <= bottom) {
        return;
    }

    let mut crossings: Vec<f64> = Vec::with_capacity(polygon.len());
    let n = polygon.len();
    for row in top as u32..=bottom as u32 {
        let y = row as f64;
        crossings.clear();

        for i in 0..n {
            let (p1, p2) = (polygon[i], polygon[(i + 1) % n]);
            if (p1.y <= y && y < p2.y) || (p2.y <= y && y < p1.y) {
                crossings.push(p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let x0 = span[0].ceil().max(0.0);
            let x1 = span[1].floor().min(max_x);
            if x0 > x1 {
                continue;
            }
            for x in x0 as u32..=x1 as u32 {
                canvas.put_pixel(x, row, FILL);
            }
        }
    }
}

/// Intersection over union of the nonzero pixels of two equally sized masks.
///
/// An empty union yields 0.
pub fn binary_iou(a: &GrayImage, b: &GrayImage) -> f64 {
    let mut intersection = 0u64;
    let mut union = 0u64;

    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let (in_a, in_b) = (pa[0] != 0, pb[0] != 0);
        if in_a && in_b {
            intersection += 1;
        }
        if in_a || in_b {
            union += 1;
        }
    }

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Rasterized IoU of two shapes on a `width x height` canvas
pub fn shape_iou<A: Rasterize + ?Sized, B: Rasterize + ?Sized>(a: &A, b: &B, width: u32, height: u32) -> f64 {
    let mut mask_a = GrayImage::new(width, height);
    let mut mask_b = GrayImage::new(width, height);
    a.rasterize(&mut mask_a);
    b.rasterize(&mut mask_b);
    binary_iou(&mask_a, &mask_b)
}

/// Rasterized IoU of two oriented rectangles; zero-area rectangles score 0.
pub fn rect_iou(a: &RotatedRect, b: &RotatedRect, width: u32, height: u32) -> f64 {
    if !(a.area() > 0.0) || !(b.area() > 0.0) {
        return 0.0;
    }
    shape_iou(a, b, width, height)
}

impl Rasterize for RotatedRect {
    /// Corners are snapped to whole pixels before filling.
    fn rasterize(&self, canvas: &mut GrayImage) {
        let corners: Vec<Point2> = self.corners().iter().map(|c| c.round().to_point2()).collect();
        fill_polygon(canvas, &corners);
    }
}

impl Rasterize for ParkingSpace {
    fn rasterize(&self, canvas: &mut GrayImage) {
        fill_polygon(canvas, &self.polygon());
    }
}
