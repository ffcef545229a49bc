//! Application configuration file

use parkview_cv::detection::DetectionConfig;
use parkview_cv::{EvaluationConfig, OccupancyConfig, Result, SegmentationConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All tunables of a run; every section falls back to its defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub evaluation: EvaluationConfig,
    pub occupancy: OccupancyConfig,
    pub segmentation: SegmentationConfig,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Config from `path`, or defaults when no file is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
