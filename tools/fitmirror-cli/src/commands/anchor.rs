//! Compute an anchor rect from a landmarks JSON file.
//!
//! Intended for calibration: dump landmarks from a test subject, then
//! sweep the factors until the rect sits right.

use std::path::PathBuf;

use anyhow::{ensure, Context};
use fitmirror_overlay_core::anchor::{compute_anchor, AnchorCalibration};
use fitmirror_overlay_model::{Landmark, LandmarkIndex, LandmarkSet};

#[allow(clippy::too_many_arguments)]
pub fn run(
    landmarks: PathBuf,
    width: u32,
    height: u32,
    width_factor: f32,
    height_factor: f32,
    aspect_floor: f32,
    vertical_bias: f32,
    min_confidence: f32,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&landmarks)
        .with_context(|| format!("Failed to read {}", landmarks.display()))?;
    let raw: Vec<[f32; 3]> =
        serde_json::from_str(&content).context("Landmarks file must be an array of [x, y, confidence]")?;
    ensure!(
        raw.len() == LandmarkIndex::COUNT,
        "Expected {} landmarks, got {}",
        LandmarkIndex::COUNT,
        raw.len()
    );

    let mut keypoints = [Landmark::default(); LandmarkIndex::COUNT];
    for (i, [x, y, confidence]) in raw.into_iter().enumerate() {
        keypoints[i] = Landmark::new(x, y, confidence);
    }
    let set = LandmarkSet::new(keypoints);

    let calibration = AnchorCalibration {
        width_factor,
        height_factor,
        aspect_floor,
        vertical_bias,
        min_confidence,
    };

    match compute_anchor(&set, width, height, &calibration) {
        Some(anchor) => println!("{}", serde_json::to_string_pretty(&anchor)?),
        None => println!("undetermined (missing torso keypoints or degenerate detection)"),
    }
    Ok(())
}
