//! Hard failures surfaced to callers
//!
//! Geometry never fails; these cover I/O and input-shape problems only. They travel
//! inside `anyhow::Error` and can be recovered with `downcast_ref`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParkviewError {
    #[error("failed to write report to {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ground-truth mask not found: {}", .0.display())]
    MissingMask(PathBuf),

    #[error("mask shapes differ: predicted {predicted:?}, ground truth {ground_truth:?}")]
    MaskShapeMismatch {
        predicted: (u32, u32),
        ground_truth: (u32, u32),
    },

    #[error("line backend `{0}` is not compiled into this build")]
    BackendUnavailable(&'static str),
}
