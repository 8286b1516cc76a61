//! Start a live try-on session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fitmirror_capture_engine::{CameraSource, SyntheticSource, VideoSource};
use fitmirror_common::config::AppConfig;
use fitmirror_overlay_core::anchor::AnchorCalibration;
use fitmirror_overlay_core::garment::decode_garment;
use fitmirror_pose_estimator::{PoseLoader, PoseLoaderConfig};
use fitmirror_render_engine::{BufferSink, OverlaySession, SessionConfig, SessionState};
use image::RgbaImage;

use crate::window::{self, ChannelSink};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    garment: Option<String>,
    camera: u32,
    width: u32,
    height: u32,
    refresh_hz: u32,
    synthetic: bool,
    headless: bool,
    duration: Option<f64>,
    still: Option<PathBuf>,
    opacity: Option<f32>,
    width_factor: Option<f32>,
    height_factor: Option<f32>,
    missing_pose: Option<String>,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    let app = AppConfig::load();

    let calibration = AnchorCalibration {
        width_factor: width_factor.unwrap_or(app.overlay.width_factor),
        height_factor: height_factor.unwrap_or(app.overlay.height_factor),
        aspect_floor: app.overlay.aspect_floor,
        vertical_bias: app.overlay.vertical_bias,
        min_confidence: app.pose.min_confidence,
    };
    let config = SessionConfig {
        refresh_hz,
        opacity: opacity.unwrap_or(app.overlay.opacity),
        calibration,
        missing_pose: missing_pose
            .unwrap_or_else(|| app.overlay.missing_pose.clone())
            .parse()?,
    };

    let loader = Arc::new(PoseLoader::new(PoseLoaderConfig {
        model_path: model.or_else(|| app.pose.model_path.clone()),
        model_url: app.pose.model_url.clone(),
        cache_dir: app.pose.cache_dir.clone(),
        min_confidence: app.pose.min_confidence,
    }));

    let mut session = OverlaySession::new(config, loader);

    if let Some(ref reference) = garment {
        let image = load_garment(reference).await?;
        session.set_garment(reference, &image);
        println!("Garment loaded: {reference}");
    } else {
        println!("No garment selected; running base preview only.");
    }

    let source: Box<dyn VideoSource> = if synthetic {
        Box::new(SyntheticSource::new(width, height, refresh_hz))
    } else {
        Box::new(CameraSource::new(camera, width, height, 30)?)
    };

    if headless {
        session.start(source, Box::new(BufferSink::new())).await?;
        println!("Overlay session running (headless). Press Ctrl+C to stop.");
        wait_for_exit(&session, duration).await;
    } else {
        let (sink, frames) = ChannelSink::new();
        session.start(source, Box::new(sink)).await?;
        println!("Overlay session running. Close the window or press ESC to stop.");
        tokio::task::block_in_place(|| window::run_preview(&frames, duration))?;
    }

    if let Some(ref path) = still {
        match session.capture_current_frame() {
            Ok(bytes) => {
                std::fs::write(path, bytes)?;
                println!("Still saved to: {}", path.display());
            }
            Err(e) => tracing::warn!(error = %e, "No frame available for still capture"),
        }
    }

    let stats = session.stop().await?;
    println!(
        "Session stopped: {} frames presented, {} composited, {} detections.",
        stats.frames_presented, stats.frames_composited, stats.detect_calls
    );

    Ok(())
}

/// Fetch and decode a garment image from a local path or an HTTP(S) URL.
async fn load_garment(reference: &str) -> anyhow::Result<RgbaImage> {
    let bytes = if reference.starts_with("http://") || reference.starts_with("https://") {
        reqwest::get(reference)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    } else {
        std::fs::read(reference)?
    };
    Ok(decode_garment(&bytes)?)
}

/// Block until Ctrl+C, the optional duration elapses, or the session stops
/// on its own.
async fn wait_for_exit(session: &OverlaySession, duration: Option<f64>) {
    let watch = async {
        let deadline = duration.map(Duration::from_secs_f64);
        let started = tokio::time::Instant::now();
        loop {
            if session.state() == SessionState::Stopped {
                break;
            }
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = watch => {}
    }
}
