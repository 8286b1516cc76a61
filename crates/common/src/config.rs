//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overlay rendering defaults.
    pub overlay: OverlayDefaults,

    /// Pose estimator defaults.
    pub pose: PoseDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default overlay rendering parameters.
///
/// The four anchor factors size and position the garment relative to the
/// detected shoulders and hips. Two calibration variants have been used in
/// the field (a wider 1.7/1.35 fit and a slimmer 1.3/1.2 fit); these
/// defaults carry the wider one, and every value can be overridden here or
/// per-run on the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayDefaults {
    /// Render loop tick rate (Hz).
    pub refresh_hz: u32,

    /// Garment compositing opacity, `0.0..=1.0`.
    pub opacity: f32,

    /// Garment width as a multiple of shoulder width.
    pub width_factor: f32,

    /// Garment height as a multiple of torso height.
    pub height_factor: f32,

    /// Minimum garment height as a multiple of garment width.
    pub aspect_floor: f32,

    /// Fraction of garment height the sprite is lifted above the shoulder line.
    pub vertical_bias: f32,

    /// What to do on a tick with no usable pose: "skip" or "freeze".
    pub missing_pose: String,
}

/// Default pose estimator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseDefaults {
    /// Where to fetch the pose model from on first use.
    pub model_url: String,

    /// Local model file to use instead of the download cache.
    pub model_path: Option<PathBuf>,

    /// Directory for cached model assets. Defaults to the XDG cache dir.
    pub cache_dir: Option<PathBuf>,

    /// Minimum keypoint confidence for detection and anchoring.
    pub min_confidence: f32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "fitmirror=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayDefaults::default(),
            pose: PoseDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            opacity: 0.88,
            width_factor: 1.7,
            height_factor: 1.35,
            aspect_floor: 1.2,
            vertical_bias: 0.06,
            missing_pose: "skip".to_string(),
        }
    }
}

impl Default for PoseDefaults {
    fn default() -> Self {
        Self {
            model_url: default_model_url(),
            model_path: None,
            cache_dir: None,
            min_confidence: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// URL of the single-subject MoveNet Lightning ONNX export.
pub fn default_model_url() -> String {
    "https://github.com/Kazuhito00/MoveNet-Python-Example/raw/main/onnx/movenet_singlepose_lightning_4.onnx"
        .to_string()
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("fitmirror").join("config.json")
}

/// Default directory for cached model assets.
pub fn default_cache_dir() -> PathBuf {
    let base = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".cache")
        });
    base.join("fitmirror").join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_production_calibration() {
        let overlay = OverlayDefaults::default();
        assert!((overlay.width_factor - 1.7).abs() < 1e-6);
        assert!((overlay.height_factor - 1.35).abs() < 1e-6);
        assert!((overlay.aspect_floor - 1.2).abs() < 1e-6);
        assert!((overlay.vertical_bias - 0.06).abs() < 1e-6);
        assert!((overlay.opacity - 0.88).abs() < 1e-6);
        assert_eq!(overlay.missing_pose, "skip");
    }

    #[test]
    fn pose_defaults_use_half_confidence() {
        let pose = PoseDefaults::default();
        assert!((pose.min_confidence - 0.5).abs() < 1e-6);
        assert!(pose.model_url.ends_with(".onnx"));
    }
}
