//! Data model for parking-lot analysis: image-plane geometry and parking spaces.

pub mod geometry;
pub mod space;

pub use geometry::{LineSegment, PixelBox, PixelPoint, Point2, RotatedRect, Size2};
pub use space::{ParkingSpace, SpaceSet};
