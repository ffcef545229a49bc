//! Planar geometry in image pixel coordinates
//!
//! Everything here is plain value types: line segments as produced by a line
//! detector, oriented rectangles as fitted around corner sets, and the convex hull
//! helpers the fitting relies on. Degenerate inputs (zero-length segments, collinear
//! point sets) are valid and yield degenerate values, never errors.

use serde::{Deserialize, Serialize};

/// A point with sub-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Nearest integer pixel.
    pub fn round(&self) -> PixelPoint {
        PixelPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// An integer pixel location, as stored in space contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_point2(self) -> Point2 {
        Point2::new(self.x as f64, self.y as f64)
    }
}

/// A line segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_points(start: Point2, end: Point2) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    pub fn start(&self) -> Point2 {
        Point2::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point2 {
        Point2::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        self.start().distance_to(&self.end())
    }

    /// Same segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.x2, self.y2, self.x1, self.y1)
    }

    /// Orientation in degrees, normalized to `[0, 180)`.
    ///
    /// Direction is ignored: a segment and its reverse report the same angle.
    pub fn angle_deg(&self) -> f64 {
        let raw = (self.y2 - self.y1).atan2(self.x2 - self.x1).to_degrees();
        let normalized = raw.rem_euclid(180.0);
        // tiny negative angles round up to exactly 180 under rem_euclid
        if normalized >= 180.0 { 0.0 } else { normalized }
    }

    /// Intersection of the infinite lines through both segments.
    ///
    /// Returns `None` when the determinant magnitude is below `epsilon`
    /// (parallel or nearly parallel lines).
    pub fn line_intersection(&self, other: &LineSegment, epsilon: f64) -> Option<Point2> {
        let (x1, y1, x2, y2) = (self.x1, self.y1, self.x2, self.y2);
        let (x3, y3, x4, y4) = (other.x1, other.y1, other.x2, other.y2);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < epsilon {
            return None;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        Some(Point2::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f64,
    pub height: f64,
}

impl Size2 {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned integer box, inclusive of both edge pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A rectangle given by center, size and rotation.
///
/// `size.width` runs along the direction `angle` (degrees, counted from the
/// x axis towards the y axis), `size.height` along its perpendicular.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2,
    pub size: Size2,
    pub angle: f64,
}

impl RotatedRect {
    pub fn new(center: Point2, size: Size2, angle: f64) -> Self {
        Self {
            center,
            size,
            angle,
        }
    }

    /// Unrotated rectangle with its top-left corner at `(x, y)`.
    pub fn axis_aligned(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Point2::new(x + width / 2.0, y + height / 2.0),
            Size2::new(width, height),
            0.0,
        )
    }

    pub fn area(&self) -> f64 {
        self.size.width * self.size.height
    }

    /// Side lengths as `(short, long)`.
    pub fn sides(&self) -> (f64, f64) {
        let (w, h) = (self.size.width, self.size.height);
        if w > h { (h, w) } else { (w, h) }
    }

    /// Corner points in polygon order.
    pub fn corners(&self) -> [Point2; 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (hw, hh) = (self.size.width / 2.0, self.size.height / 2.0);
        let (ux, uy) = (cos * hw, sin * hw);
        let (vx, vy) = (-sin * hh, cos * hh);
        let c = self.center;

        [
            Point2::new(c.x - ux - vx, c.y - uy - vy),
            Point2::new(c.x + ux - vx, c.y + uy - vy),
            Point2::new(c.x + ux + vx, c.y + uy + vy),
            Point2::new(c.x - ux + vx, c.y - uy + vy),
        ]
    }

    /// Smallest pixel box containing every corner.
    pub fn bounding_box(&self) -> PixelBox {
        let corners = self.corners();
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let x = min_x.floor() as i32;
        let y = min_y.floor() as i32;
        PixelBox {
            x,
            y,
            width: (max_x.ceil() as i32).saturating_sub(x).saturating_add(1),
            height: (max_y.ceil() as i32).saturating_sub(y).saturating_add(1),
        }
    }

    /// Minimum-area rectangle enclosing `points`.
    ///
    /// Rotating calipers over the convex hull. Collinear input gives a
    /// zero-height rectangle along the line, a single point a zero-size one.
    pub fn min_area(points: &[Point2]) -> Self {
        let hull = convex_hull(points);

        match hull.len() {
            0 => Self::default(),
            1 => Self::new(hull[0], Size2::default(), 0.0),
            2 => {
                let (a, b) = (hull[0], hull[1]);
                Self::new(
                    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
                    Size2::new(a.distance_to(&b), 0.0),
                    (b.y - a.y).atan2(b.x - a.x).to_degrees(),
                )
            }
            _ => min_area_from_hull(&hull),
        }
    }
}

fn min_area_from_hull(hull: &[Point2]) -> RotatedRect {
    let mut best_area = f64::INFINITY;
    let mut best = RotatedRect::default();

    let n = hull.len();
    for i in 0..n {
        let origin = hull[i];
        let next = hull[(i + 1) % n];
        let (ex, ey) = (next.x - origin.x, next.y - origin.y);
        let edge_len = (ex * ex + ey * ey).sqrt();
        if edge_len < f64::EPSILON {
            continue;
        }

        let (nx, ny) = (ex / edge_len, ey / edge_len);
        let (px, py) = (-ny, nx);

        let mut min_n = f64::INFINITY;
        let mut max_n = f64::NEG_INFINITY;
        let mut min_p = f64::INFINITY;
        let mut max_p = f64::NEG_INFINITY;
        for point in hull {
            let (dx, dy) = (point.x - origin.x, point.y - origin.y);
            let proj_n = nx * dx + ny * dy;
            let proj_p = px * dx + py * dy;
            min_n = min_n.min(proj_n);
            max_n = max_n.max(proj_n);
            min_p = min_p.min(proj_p);
            max_p = max_p.max(proj_p);
        }

        let width = max_n - min_n;
        let height = max_p - min_p;
        let area = width * height;
        if area < best_area {
            best_area = area;
            let mid_n = (min_n + max_n) / 2.0;
            let mid_p = (min_p + max_p) / 2.0;
            best = RotatedRect::new(
                Point2::new(
                    origin.x + mid_n * nx + mid_p * px,
                    origin.y + mid_n * ny + mid_p * py,
                ),
                Size2::new(width, height),
                ny.atan2(nx).to_degrees(),
            );
        }
    }

    best
}

/// Convex hull by Andrew's monotone chain, counter-clockwise in a y-up frame.
///
/// Duplicates are removed; collinear input collapses to its two extremes.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}
