//! Detection, evaluation and frame-sequence analysis flows

use crate::config::AppConfig;
use anyhow::Context;
use parkview_cv::{
    detection::{DetectionConfig, DetectionResult, SpaceDetector},
    evaluation::FrameMetrics,
    render::Visualizer,
    utils::{FrameLoader, ImageUtils},
    CarSegmenter, OccupancyClassifier, ParkingSpace, PerformanceEvaluator, Result, SpaceSet,
};
use std::path::{Path, PathBuf};

/// Detect spaces on one image, retrying with a sensitive line detector when the
/// configured one finds nothing
pub fn detect_with_fallback(image_path: &Path, config: &DetectionConfig) -> Result<DetectionResult> {
    let detector = SpaceDetector::new(config.clone())?;
    let result = detector.detect_from_file(image_path)?;
    if !result.spaces.is_empty() {
        return Ok(result);
    }

    tracing::warn!(image = %image_path.display(), "no spaces found, retrying for faint markings");
    SpaceDetector::new(config.for_faint_markings())?.detect_from_file(image_path)
}

pub fn print_spaces(spaces: &[ParkingSpace]) {
    for space in spaces {
        let (short, long) = space.rect.sides();
        println!(
            "  #{:<3} center=({:.1}, {:.1}) size={:.1}x{:.1} angle={:.1} {}",
            space.id,
            space.rect.center.x,
            space.rect.center.y,
            short,
            long,
            space.rect.angle,
            if space.occupied { "occupied" } else { "empty" }
        );
    }
}

fn print_metrics(metrics: &FrameMetrics) {
    println!("  mAP: {:.3}", metrics.map);
    println!("  mIoU: {:.3}", metrics.miou);
    println!(
        "  correct: {}  false positives: {}  false negatives: {}  (ground truth: {})",
        metrics.correct_detections, metrics.false_positives, metrics.false_negatives, metrics.total_spaces
    );
}

/// `detect` command
pub fn run_detect(
    image: &Path,
    config: &AppConfig,
    output: Option<&Path>,
    overlay: Option<&Path>,
) -> Result<()> {
    let detector = SpaceDetector::new(config.detection.clone())?;
    let result = detect_with_fallback(image, &config.detection)?;

    println!("Detected {} parking spaces:", result.spaces.len());
    print_spaces(&result.spaces);
    println!("  - Time: {}ms", result.stats.processing_time_ms);

    if let Some(output) = output {
        detector.export_json(&result, output)?;
        println!("Spaces written to {}", output.display());
    }

    if let Some(overlay) = overlay {
        let mut frame = ImageUtils::load_color(image)?;
        let visualizer = Visualizer::new(frame.dimensions(), &config.detection.visualization);
        visualizer.draw_spaces(&mut frame, &result.spaces);
        ImageUtils::save_rgb(&frame, overlay)?;
        println!("Overlay written to {}", overlay.display());
    }

    Ok(())
}

/// Inputs of the `evaluate` command
pub struct EvaluateArgs<'a> {
    pub detected: &'a Path,
    pub ground_truth: &'a Path,
    pub predicted_mask: Option<&'a Path>,
    pub ground_truth_mask: Option<&'a Path>,
    pub report: Option<&'a Path>,
}

/// `evaluate` command
pub fn run_evaluate(args: &EvaluateArgs<'_>, config: &AppConfig) -> Result<()> {
    let detected = SpaceSet::load(args.detected)?;
    let ground_truth = SpaceSet::load(args.ground_truth)?;

    let masks = match (args.predicted_mask, args.ground_truth_mask) {
        (Some(predicted), Some(truth)) => Some((
            ImageUtils::load_label_mask(predicted)?,
            ImageUtils::load_label_mask(truth)?,
        )),
        (None, None) => None,
        _ => anyhow::bail!("--predicted-mask and --ground-truth-mask must be given together"),
    };

    let mut evaluator = PerformanceEvaluator::new(config.evaluation.clone());
    let metrics = evaluator.evaluate_frame(
        detected.as_slice(),
        ground_truth.as_slice(),
        masks.as_ref().map(|(p, g)| (p, g)),
    )?;

    println!("Evaluation:");
    print_metrics(&metrics);

    if let Some(report) = args.report {
        evaluator.generate_report(report)?;
        println!("Report written to {}", report.display());
    }
    Ok(())
}

/// Inputs of the `analyze` command
pub struct AnalyzeArgs<'a> {
    pub reference: &'a Path,
    pub frames: &'a Path,
    pub spaces: Option<&'a Path>,
    pub ground_truth_dir: Option<&'a Path>,
    pub output_dir: &'a Path,
    pub report: Option<&'a Path>,
}

/// Ground-truth files belonging to a frame: `<stem>.json` and `<stem>_mask.png`
fn ground_truth_paths(dir: &Path, frame: &Path) -> (PathBuf, PathBuf) {
    let stem = frame
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    (dir.join(format!("{stem}.json")), dir.join(format!("{stem}_mask.png")))
}

/// `analyze` command: occupancy, vehicles and optional scoring over a frame sequence
pub fn run_analyze(args: &AnalyzeArgs<'_>, config: &AppConfig) -> Result<()> {
    let reference = ImageUtils::load_grayscale(args.reference)?;

    let spaces = match args.spaces {
        Some(path) => SpaceSet::load(path)?.into_inner(),
        None => detect_with_fallback(args.reference, &config.detection)?.spaces,
    };
    if spaces.is_empty() {
        tracing::warn!("no parking spaces available, occupancy will be empty");
    }
    println!("Using {} parking spaces", spaces.len());

    let classifier = OccupancyClassifier::new(config.occupancy.clone(), &reference);
    let segmenter = CarSegmenter::new(config.segmentation.clone());
    let visualizer = Visualizer::new(reference.dimensions(), &config.detection.visualization);
    let mut evaluator = PerformanceEvaluator::new(config.evaluation.clone());

    std::fs::create_dir_all(args.output_dir)
        .with_context(|| format!("Failed to create output dir: {}", args.output_dir.display()))?;

    let frames = FrameLoader::new().add_frame_dir(args.frames).list_frames()?;
    println!("Processing {} frames", frames.len());

    for frame_path in &frames {
        let color = ImageUtils::load_color(frame_path)?;
        let gray = ImageUtils::rgb_to_gray(&color);
        if gray.dimensions() != reference.dimensions() {
            tracing::warn!(frame = %frame_path.display(), "frame size differs from reference, skipping");
            continue;
        }

        let mut frame_spaces = spaces.clone();
        let occupied = classifier.process_frame(&gray, &mut frame_spaces)?;
        let segmentation = segmenter.segment(&gray, &frame_spaces);

        let stem = frame_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut overlay = color;
        visualizer.draw_spaces(&mut overlay, &frame_spaces);
        visualizer.draw_vehicles(&mut overlay, &segmentation);
        ImageUtils::save_rgb(&overlay, args.output_dir.join(format!("{stem}_overlay.png")))?;
        ImageUtils::save_rgb(
            &visualizer.create_map(&frame_spaces),
            args.output_dir.join(format!("{stem}_map.png")),
        )?;

        println!(
            "{stem}: {occupied}/{} occupied, {} vehicles, {} misparked",
            frame_spaces.len(),
            segmentation.vehicles.len(),
            segmentation.misparked_count()
        );

        let Some(gt_dir) = args.ground_truth_dir else { continue };
        let (gt_spaces_path, gt_mask_path) = ground_truth_paths(gt_dir, frame_path);
        if !gt_spaces_path.exists() {
            tracing::warn!(frame = %stem, "no ground-truth spaces, frame not scored");
            continue;
        }
        let gt_mask = match ImageUtils::load_label_mask(&gt_mask_path) {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!(frame = %stem, error = %e, "frame not scored");
                continue;
            }
        };
        let gt_spaces = SpaceSet::load(&gt_spaces_path)?;

        let predicted_mask = segmentation.label_mask();
        let metrics = evaluator.evaluate_frame(
            &frame_spaces,
            gt_spaces.as_slice(),
            Some((&predicted_mask, &gt_mask)),
        )?;
        print_metrics(&metrics);
    }

    if !evaluator.frames().is_empty() {
        let summary = evaluator.summary();
        println!("Summary over {} scored frames:", summary.frames);
        println!("  Average mAP: {:.3}", summary.average_map);
        println!("  Average mIoU: {:.3}", summary.average_miou);

        if let Some(report) = args.report {
            evaluator.generate_report(report)?;
            println!("Report written to {}", report.display());
        }
    }

    Ok(())
}
