//! FitMirror CLI — Live try-on preview, garment matting, and calibration.
//!
//! Usage:
//!   fitmirror run [OPTIONS]          Start a live try-on session
//!   fitmirror matte <IMAGE>          Preprocess a garment image to RGBA
//!   fitmirror anchor <LANDMARKS>     Compute an anchor rect from landmark JSON
//!   fitmirror check                  Check camera, model cache, and config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod window;

#[derive(Parser)]
#[command(
    name = "fitmirror",
    about = "Real-time AR garment try-on preview",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a live try-on session
    Run {
        /// Garment image path or URL
        #[arg(short, long)]
        garment: Option<String>,

        /// Camera device index
        #[arg(long, default_value = "0")]
        camera: u32,

        /// Requested capture width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Requested capture height
        #[arg(long, default_value = "480")]
        height: u32,

        /// Render loop tick rate (Hz)
        #[arg(long, default_value = "60")]
        refresh_hz: u32,

        /// Use a deterministic synthetic video source instead of a camera
        #[arg(long)]
        synthetic: bool,

        /// Run without a preview window
        #[arg(long)]
        headless: bool,

        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Write a PNG still of the last composited frame on exit
        #[arg(long)]
        still: Option<PathBuf>,

        /// Garment compositing opacity [0.0, 1.0]
        #[arg(long)]
        opacity: Option<f32>,

        /// Garment width as a multiple of shoulder width
        #[arg(long)]
        width_factor: Option<f32>,

        /// Garment height as a multiple of torso height
        #[arg(long)]
        height_factor: Option<f32>,

        /// Missing-pose policy: skip|freeze
        #[arg(long)]
        missing_pose: Option<String>,

        /// Local MoveNet ONNX file (skips the download cache)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Preprocess a garment image (near-white background made transparent)
    Matte {
        /// Source image path
        input: PathBuf,

        /// Output PNG path (defaults to `<input>.matted.png`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute an anchor rect from a landmarks JSON file
    Anchor {
        /// JSON file: array of 17 `[x, y, confidence]` entries
        landmarks: PathBuf,

        /// Frame width in pixels
        #[arg(long, default_value = "640")]
        width: u32,

        /// Frame height in pixels
        #[arg(long, default_value = "480")]
        height: u32,

        /// Garment width as a multiple of shoulder width
        #[arg(long, default_value = "1.7")]
        width_factor: f32,

        /// Garment height as a multiple of torso height
        #[arg(long, default_value = "1.35")]
        height_factor: f32,

        /// Minimum garment height as a multiple of garment width
        #[arg(long, default_value = "1.2")]
        aspect_floor: f32,

        /// Fraction of garment height lifted above the shoulder line
        #[arg(long, default_value = "0.06")]
        vertical_bias: f32,

        /// Minimum keypoint confidence
        #[arg(long, default_value = "0.5")]
        min_confidence: f32,
    },

    /// Check system capabilities
    Check {
        /// Skip the camera probe
        #[arg(long)]
        no_camera: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    fitmirror_common::logging::init_logging(&fitmirror_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Run {
            garment,
            camera,
            width,
            height,
            refresh_hz,
            synthetic,
            headless,
            duration,
            still,
            opacity,
            width_factor,
            height_factor,
            missing_pose,
            model,
        } => {
            commands::run::run(
                garment,
                camera,
                width,
                height,
                refresh_hz,
                synthetic,
                headless,
                duration,
                still,
                opacity,
                width_factor,
                height_factor,
                missing_pose,
                model,
            )
            .await
        }
        Commands::Matte { input, output } => commands::matte::run(input, output),
        Commands::Anchor {
            landmarks,
            width,
            height,
            width_factor,
            height_factor,
            aspect_floor,
            vertical_bias,
            min_confidence,
        } => commands::anchor::run(
            landmarks,
            width,
            height,
            width_factor,
            height_factor,
            aspect_floor,
            vertical_bias,
            min_confidence,
        ),
        Commands::Check { no_camera } => commands::check::run(!no_camera),
    }
}
