//! The pose estimation boundary and the memoized loader behind it.

use std::sync::Arc;

use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_model::{Frame, LandmarkSet};
use tokio::sync::OnceCell;

use crate::movenet::MoveNetEstimator;

/// A streaming pose estimator for a single tracked subject.
///
/// `detect` is synchronous from the caller's perspective; its latency may
/// exceed a display frame interval. Callers are responsible for feeding
/// frames in capture order with monotonic timestamps and for never
/// overlapping calls on the same handle.
pub trait PoseEstimator: Send + Sync {
    /// Estimate landmarks for one frame. `Ok(None)` means no subject was
    /// detected with sufficient confidence this frame.
    fn detect(&self, frame: &Frame, timestamp_ms: f64) -> FitmirrorResult<Option<LandmarkSet>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Configuration for building the MoveNet backend.
#[derive(Debug, Clone)]
pub struct PoseLoaderConfig {
    /// Explicit model file; skips the download cache when set.
    pub model_path: Option<std::path::PathBuf>,

    /// Where to fetch the model from when it is not cached.
    pub model_url: String,

    /// Model cache directory; defaults to the XDG cache dir.
    pub cache_dir: Option<std::path::PathBuf>,

    /// Minimum average keypoint confidence for a detection to count.
    pub min_confidence: f32,
}

impl Default for PoseLoaderConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            model_url: fitmirror_common::config::default_model_url(),
            cache_dir: None,
            min_confidence: 0.5,
        }
    }
}

/// Initialization outcome, memoized for the life of the loader. The error
/// arm keeps only the message: the failure is terminal either way, and a
/// message clones cheaply into every later `initialize` call.
type InitOutcome = Result<Arc<dyn PoseEstimator>, String>;

/// Process-scoped, lazily initialized pose estimator handle.
///
/// The first `initialize` call downloads the model (if needed) and builds
/// the inference session on a blocking thread; every later or concurrent
/// call, success or failure, resolves to the same outcome without
/// touching the network again.
pub struct PoseLoader {
    config: PoseLoaderConfig,
    cell: OnceCell<InitOutcome>,
}

impl PoseLoader {
    pub fn new(config: PoseLoaderConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// A loader that is already resolved to the given estimator.
    ///
    /// The substitution point for tests and embedders with their own
    /// backend: `initialize` returns this handle immediately.
    pub fn with_estimator(estimator: Arc<dyn PoseEstimator>) -> Self {
        Self {
            config: PoseLoaderConfig::default(),
            cell: OnceCell::new_with(Some(Ok(estimator))),
        }
    }

    /// A loader that is already resolved to a terminal failure.
    pub fn with_failure(message: impl Into<String>) -> Self {
        Self {
            config: PoseLoaderConfig::default(),
            cell: OnceCell::new_with(Some(Err(message.into()))),
        }
    }

    /// Get the shared estimator handle, initializing it on first use.
    pub async fn initialize(&self) -> FitmirrorResult<Arc<dyn PoseEstimator>> {
        let outcome = self
            .cell
            .get_or_init(|| async {
                let config = self.config.clone();
                match tokio::task::spawn_blocking(move || MoveNetEstimator::from_config(&config))
                    .await
                {
                    Ok(Ok(estimator)) => {
                        tracing::info!(backend = estimator.name(), "Pose estimator initialized");
                        Ok(Arc::new(estimator) as Arc<dyn PoseEstimator>)
                    }
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) => Err(format!("Pose initialization task failed: {e}")),
                }
            })
            .await;

        outcome.clone().map_err(FitmirrorError::pose)
    }

    /// Whether initialization has completed (successfully or not).
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}
