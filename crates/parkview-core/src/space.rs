use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::geometry::{convex_hull, PixelPoint, Point2, RotatedRect};

/// A parking space: oriented rectangle, source contour and occupancy flag.
///
/// `id` is the 1-based reading-order rank assigned by the detector, or the
/// id carried by a persisted space definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpace {
    pub id: u32,
    #[serde(default)]
    pub occupied: bool,
    pub rect: RotatedRect,
    #[serde(default)]
    pub contour: Vec<PixelPoint>,
}

impl ParkingSpace {
    pub fn new(id: u32, rect: RotatedRect, contour: Vec<PixelPoint>) -> Self {
        Self {
            id,
            occupied: false,
            rect,
            contour,
        }
    }

    /// Space whose contour is the rectangle's own corners.
    pub fn from_rect(id: u32, rect: RotatedRect) -> Self {
        let contour = rect.corners().iter().map(Point2::round).collect();
        Self::new(id, rect, contour)
    }

    /// Fillable outline of the space.
    ///
    /// Detected contours are unordered corner sets, so the convex hull is used;
    /// fewer than three distinct contour points fall back to the rectangle.
    pub fn polygon(&self) -> Vec<Point2> {
        let points: Vec<Point2> = self.contour.iter().map(|p| p.to_point2()).collect();
        let hull = convex_hull(&points);
        if hull.len() >= 3 {
            hull
        } else {
            self.rect.corners().to_vec()
        }
    }
}

/// Space definitions of one frame, as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceSet {
    pub spaces: Vec<ParkingSpace>,
}

impl SpaceSet {
    pub fn new(spaces: Vec<ParkingSpace>) -> Self {
        Self { spaces }
    }

    /// Load a JSON space-definition file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to open space definitions: {}", path.display()))?;

        let set: SpaceSet = serde_json::from_str(&text)
            .with_context(|| format!("Invalid space definitions in {}", path.display()))?;

        tracing::debug!(
            spaces = set.spaces.len(),
            path = %path.display(),
            "loaded space definitions"
        );
        Ok(set)
    }

    /// Write the set as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize spaces")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write space definitions: {}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn occupied_count(&self) -> usize {
        self.spaces.iter().filter(|s| s.occupied).count()
    }

    pub fn as_slice(&self) -> &[ParkingSpace] {
        &self.spaces
    }

    pub fn into_inner(self) -> Vec<ParkingSpace> {
        self.spaces
    }
}

impl From<Vec<ParkingSpace>> for SpaceSet {
    fn from(spaces: Vec<ParkingSpace>) -> Self {
        Self::new(spaces)
    }
}
