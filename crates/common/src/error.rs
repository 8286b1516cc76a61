//! Error types shared across FitMirror crates.

use std::path::PathBuf;

/// Top-level error type for FitMirror operations.
#[derive(Debug, thiserror::Error)]
pub enum FitmirrorError {
    #[error("Pose estimation error: {message}")]
    Pose { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Garment error: {message}")]
    Garment { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FitmirrorError.
pub type FitmirrorResult<T> = Result<T, FitmirrorError>;

impl FitmirrorError {
    pub fn pose(msg: impl Into<String>) -> Self {
        Self::Pose {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn garment(msg: impl Into<String>) -> Self {
        Self::Garment {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
