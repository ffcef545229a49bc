//! Utility modules

pub mod frames;
pub mod image;

pub use frames::FrameLoader;
pub use image::ImageUtils;
