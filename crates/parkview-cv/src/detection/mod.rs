//! Parking-space detection from line evidence
//!
//! Stages run strictly forward: clustering, corner building, rectangle fitting,
//! then filtering and reading-order numbering.

pub mod candidate;
pub mod cluster;
pub mod config;
pub mod detector;
pub mod filter;
pub mod intersect;

pub use candidate::SpaceCandidate;
pub use cluster::OrientationCluster;
pub use config::DetectionConfig;
pub use detector::{detect_spaces, DetectionResult, DetectionStats, SpaceDetector};
pub use intersect::CornerSet;
