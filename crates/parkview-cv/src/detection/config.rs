//! Detection configuration

use crate::lines::LineExtractionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub lines: LineExtractionConfig,
    pub clustering: ClusteringConfig,
    pub intersections: IntersectionConfig,
    pub validity: ValidityConfig,
    pub ordering: OrderingConfig,
    pub output_dir: PathBuf,
    pub visualization: VisualizationConfig,
}

/// Orientation clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Largest angle difference (degrees, exclusive) still counted as parallel
    pub parallel_angle_tolerance: f64,
}

/// Corner construction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    /// Allowed deviation from 90 degrees (exclusive)
    pub perpendicular_angle_tolerance: f64,
    /// Determinant magnitude below which two lines count as parallel
    pub parallel_epsilon: f64,
}

/// Shape plausibility window, all bounds inclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityConfig {
    pub min_area: f64,
    pub max_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

/// Reading-order configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Centers closer than this vertically are compared by x
    pub row_tolerance: f64,
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub draw_spaces: bool,
    pub draw_vehicles: bool,
    pub save_overlays: bool,
    pub map_size: (u32, u32),
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lines: LineExtractionConfig::default(),
            clustering: ClusteringConfig::default(),
            intersections: IntersectionConfig::default(),
            validity: ValidityConfig::default(),
            ordering: OrderingConfig::default(),
            output_dir: "output".into(),
            visualization: VisualizationConfig::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            parallel_angle_tolerance: 10.0,
        }
    }
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            perpendicular_angle_tolerance: 20.0,
            parallel_epsilon: 1e-6,
        }
    }
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            max_area: 20000.0,
            min_aspect: 1.5,
            max_aspect: 4.0,
        }
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 50.0,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            draw_spaces: true,
            draw_vehicles: true,
            save_overlays: false,
            map_size: (400, 300),
        }
    }
}

impl DetectionConfig {
    /// Same configuration with a more permissive line detector, for faint markings.
    ///
    /// The line backend is kept.
    pub fn for_faint_markings(&self) -> Self {
        Self {
            lines: LineExtractionConfig {
                backend: self.lines.backend,
                ..LineExtractionConfig::sensitive()
            },
            ..self.clone()
        }
    }
}
