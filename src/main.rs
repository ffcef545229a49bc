use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod analyzer;
mod config;

use analyzer::{AnalyzeArgs, EvaluateArgs};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "parkview", version, about = "Parking-lot space detection and occupancy analysis")]
struct Args {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Detect parking spaces in a single image
    Detect {
        image: PathBuf,
        /// Write the ordered spaces as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the image with space outlines drawn on it
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Score detected spaces (and optionally a label mask) against ground truth
    Evaluate {
        #[arg(long)]
        detected: PathBuf,
        #[arg(long)]
        ground_truth: PathBuf,
        #[arg(long, requires = "ground_truth_mask")]
        predicted_mask: Option<PathBuf>,
        #[arg(long, requires = "predicted_mask")]
        ground_truth_mask: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run occupancy and vehicle analysis over a directory of frames
    Analyze {
        /// Image of the empty lot
        #[arg(long)]
        reference: PathBuf,
        #[arg(long)]
        frames: PathBuf,
        /// Fixed space definitions; detected on the reference image when omitted
        #[arg(long)]
        spaces: Option<PathBuf>,
        /// Directory holding `<frame>.json` and `<frame>_mask.png`
        #[arg(long)]
        ground_truth_dir: Option<PathBuf>,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> parkview_cv::Result<()> {
    let config = AppConfig::load_or_default(args.config.as_deref())?;

    match args.cmd {
        Cmd::Detect { image, output, overlay } => {
            analyzer::run_detect(&image, &config, output.as_deref(), overlay.as_deref())
        }
        Cmd::Evaluate {
            detected,
            ground_truth,
            predicted_mask,
            ground_truth_mask,
            report,
        } => analyzer::run_evaluate(
            &EvaluateArgs {
                detected: &detected,
                ground_truth: &ground_truth,
                predicted_mask: predicted_mask.as_deref(),
                ground_truth_mask: ground_truth_mask.as_deref(),
                report: report.as_deref(),
            },
            &config,
        ),
        Cmd::Analyze {
            reference,
            frames,
            spaces,
            ground_truth_dir,
            output_dir,
            report,
        } => analyzer::run_analyze(
            &AnalyzeArgs {
                reference: &reference,
                frames: &frames,
                spaces: spaces.as_deref(),
                ground_truth_dir: ground_truth_dir.as_deref(),
                output_dir: &output_dir,
                report: report.as_deref(),
            },
            &config,
        ),
    }
}
