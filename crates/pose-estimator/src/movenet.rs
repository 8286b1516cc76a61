//! MoveNet SinglePose inference backend.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_model::{Frame, Landmark, LandmarkIndex, LandmarkSet};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::estimator::{PoseEstimator, PoseLoaderConfig};
use crate::fetch::ensure_model;
use crate::preprocess::to_input_tensor;

/// Input/output tensor names of the tf2onnx MoveNet export.
const INPUT_NAME: &str = "serving_default_input_0";
const OUTPUT_NAME: &str = "StatefulPartitionedCall_0";

/// Pose estimator backed by a MoveNet SinglePose ONNX session.
///
/// MoveNet is single-subject by construction, which is exactly the overlay
/// contract: one person in front of the mirror. The session is retained for
/// the life of the handle and fed consecutive frames.
pub struct MoveNetEstimator {
    // ort sessions need &mut to run; the trait hands out &self because the
    // render loop owns the handle behind an Arc. Calls never actually
    // contend; one detect in flight is a caller obligation.
    session: Mutex<Session>,
    min_confidence: f32,
}

impl MoveNetEstimator {
    /// Load the model from an explicit path.
    pub fn from_model_file(path: impl AsRef<Path>, min_confidence: f32) -> FitmirrorResult<Self> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(path.as_ref()))
            .context("Failed to load MoveNet ONNX model")?;

        Ok(Self {
            session: Mutex::new(session),
            min_confidence,
        })
    }

    /// Resolve the model (explicit path or download cache) and build the
    /// session. Called once per process by the loader.
    pub fn from_config(config: &PoseLoaderConfig) -> FitmirrorResult<Self> {
        let model_path: PathBuf = match &config.model_path {
            Some(path) => {
                if !path.exists() {
                    return Err(FitmirrorError::FileNotFound { path: path.clone() });
                }
                path.clone()
            }
            None => ensure_model(config.cache_dir.as_deref(), &config.model_url)?,
        };

        tracing::info!(model = %model_path.display(), "Building MoveNet session");
        Self::from_model_file(model_path, config.min_confidence)
    }

    fn run_inference(&self, frame: &Frame) -> FitmirrorResult<LandmarkSet> {
        let input = to_input_tensor(frame)?;
        let input_tensor = Tensor::from_array(input).context("Failed to build input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| FitmirrorError::pose("MoveNet session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .context("MoveNet inference failed")?;

        let output: ndarray::ArrayViewD<f32> = outputs[OUTPUT_NAME]
            .try_extract_array()
            .context("Failed to extract MoveNet output tensor")?;

        let flat: Vec<f32> = output.iter().copied().collect();
        parse_movenet_output(&flat)
            .ok_or_else(|| FitmirrorError::pose("MoveNet output has unexpected shape"))
    }
}

impl PoseEstimator for MoveNetEstimator {
    fn detect(&self, frame: &Frame, timestamp_ms: f64) -> FitmirrorResult<Option<LandmarkSet>> {
        let landmarks = self.run_inference(frame)?;
        tracing::trace!(
            timestamp_ms,
            confidence = landmarks.average_confidence(),
            "MoveNet frame processed"
        );

        if landmarks.average_confidence() < self.min_confidence {
            return Ok(None);
        }
        Ok(Some(landmarks))
    }

    fn name(&self) -> &str {
        "movenet-singlepose"
    }
}

/// Parse the raw `[1, 1, 17, 3]` MoveNet output, `(y, x, confidence)`
/// triplets in keypoint order, into a landmark set.
///
/// Returns `None` when the buffer is not exactly 51 values.
pub fn parse_movenet_output(values: &[f32]) -> Option<LandmarkSet> {
    if values.len() != LandmarkIndex::COUNT * 3 {
        return None;
    }

    let mut keypoints = [Landmark::default(); LandmarkIndex::COUNT];
    for (i, triplet) in values.chunks_exact(3).enumerate() {
        let [y, x, confidence] = [triplet[0], triplet[1], triplet[2]];
        keypoints[i] = Landmark::new(x, y, confidence);
    }
    Some(LandmarkSet::new(keypoints))
}
