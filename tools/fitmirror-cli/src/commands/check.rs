//! Check system capabilities.

use fitmirror_capture_engine::{CameraSource, VideoSource};
use fitmirror_common::config::{config_file_path, AppConfig};
use fitmirror_pose_estimator::fetch::model_cache_path;

pub fn run(probe_camera: bool) -> anyhow::Result<()> {
    println!("FitMirror System Check");
    println!("{}", "=".repeat(50));

    let app = AppConfig::load();

    // Config file
    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[--] Config: using defaults ({} absent)", config_path.display());
    }

    // Pose model cache
    let model_path = app
        .pose
        .model_path
        .clone()
        .unwrap_or_else(|| model_cache_path(app.pose.cache_dir.as_deref(), &app.pose.model_url));
    if model_path.exists() {
        println!("[OK] Pose model: {}", model_path.display());
    } else {
        println!(
            "[WARN] Pose model not cached yet; first run downloads from {}",
            app.pose.model_url
        );
    }

    // Camera
    if probe_camera {
        match CameraSource::new(0, 640, 480, 30) {
            Ok(source) => {
                let (w, h) = source.dimensions();
                println!("[OK] Camera 0: {w}x{h}");
            }
            Err(e) => println!("[WARN] Camera 0 unavailable: {e}"),
        }
    } else {
        println!("[--] Camera probe skipped");
    }

    println!();
    println!(
        "Calibration: width x{}, height x{}, aspect floor x{}, vertical bias {}",
        app.overlay.width_factor,
        app.overlay.height_factor,
        app.overlay.aspect_floor,
        app.overlay.vertical_bias
    );
    println!(
        "Overlay: {} Hz, opacity {}, missing-pose policy '{}'",
        app.overlay.refresh_hz, app.overlay.opacity, app.overlay.missing_pose
    );

    Ok(())
}
