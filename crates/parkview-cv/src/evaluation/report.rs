//! Plain-text evaluation report

use super::metrics::{FrameMetrics, MetricsSummary};
use crate::error::ParkviewError;
use crate::Result;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Per-frame breakdown followed by summary statistics
pub fn format_report(frames: &[FrameMetrics]) -> String {
    let mut out = String::new();
    out.push_str("Parking Lot Analysis Report\n");
    out.push_str("==========================\n\n");

    for (i, m) in frames.iter().enumerate() {
        let _ = writeln!(out, "Frame {}:", i + 1);
        out.push_str("  Space Detection:\n");
        let _ = writeln!(out, "    mAP: {}", m.map);
        let _ = writeln!(out, "    Correct Detections: {}", m.correct_detections);
        let _ = writeln!(out, "    False Positives: {}", m.false_positives);
        let _ = writeln!(out, "    False Negatives: {}", m.false_negatives);
        out.push_str("  Segmentation:\n");
        let _ = writeln!(out, "    mIoU: {}\n", m.miou);
    }

    let summary = MetricsSummary::from_frames(frames);
    out.push_str("\nSummary Statistics\n");
    out.push_str("=================\n");
    let _ = writeln!(out, "Average mAP: {}", summary.average_map);
    let _ = writeln!(out, "Average mIoU: {}", summary.average_miou);
    let _ = writeln!(out, "Total Correct Detections: {}", summary.total_correct_detections);
    let _ = writeln!(out, "Total False Positives: {}", summary.total_false_positives);
    let _ = writeln!(out, "Total False Negatives: {}", summary.total_false_negatives);
    out
}

/// Write [`format_report`] to `path`.
///
/// Failing to create or write the file is reported as [`ParkviewError::ReportWrite`].
pub fn write_report<P: AsRef<Path>>(path: P, frames: &[FrameMetrics]) -> Result<()> {
    let path = path.as_ref();
    let report_err = |source| ParkviewError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(report_err)?;
    file.write_all(format_report(frames).as_bytes()).map_err(report_err)?;

    tracing::info!(path = %path.display(), frames = frames.len(), "report written");
    Ok(())
}
