//! Image loading and saving helpers on top of the `image` crate

use crate::error::ParkviewError;
use crate::Result;
use anyhow::Context;
use image::{GrayImage, RgbImage};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as single-channel grayscale
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?;
        Ok(img.to_luma8())
    }

    /// Load image as 8-bit RGB
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?;
        Ok(img.to_rgb8())
    }

    /// Load a per-pixel label mask (0 background, 1 parked, 2 misparked)
    pub fn load_label_mask<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParkviewError::MissingMask(path.to_path_buf()).into());
        }
        Self::load_grayscale(path)
    }

    pub fn rgb_to_gray(rgb_image: &RgbImage) -> GrayImage {
        image::imageops::grayscale(rgb_image)
    }

    pub fn save_rgb<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))
    }

    pub fn save_gray<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))
    }
}
