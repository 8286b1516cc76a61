//! Anchor calculation: from torso landmarks to a garment rectangle.
//!
//! # Algorithm
//!
//! 1. Convert the normalized shoulder/hip coordinates to pixel space,
//!    mirroring horizontally (`pixel_x = (1 − x) · w`) so overlay geometry
//!    matches the looking-glass presentation of the live feed.
//! 2. Width follows shoulder width; height follows torso height with a
//!    floor proportional to width, so a subject close to the camera (with
//!    a foreshortened torso) still gets a plausibly tall garment.
//! 3. The rect is centered on the shoulders and lifted slightly above the
//!    shoulder line.
//!
//! The whole module is pure: same landmarks, same dimensions, and same
//! calibration yield bit-identical output.

use fitmirror_overlay_model::{AnchorRect, LandmarkIndex, LandmarkSet};
use serde::{Deserialize, Serialize};

/// Calibration constants for garment placement.
///
/// Two calibrations have shipped: a wide fit (1.7 / 1.35) and a slim fit
/// (1.3 / 1.2). The defaults carry the wide fit; neither value is baked
/// into the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorCalibration {
    /// Garment width as a multiple of shoulder width.
    pub width_factor: f32,

    /// Garment height as a multiple of torso height.
    pub height_factor: f32,

    /// Minimum garment height as a multiple of garment width.
    pub aspect_floor: f32,

    /// Fraction of garment height the rect sits above the shoulder center.
    pub vertical_bias: f32,

    /// Minimum keypoint confidence for a landmark to count as present.
    pub min_confidence: f32,
}

impl Default for AnchorCalibration {
    fn default() -> Self {
        Self {
            width_factor: 1.7,
            height_factor: 1.35,
            aspect_floor: 1.2,
            vertical_bias: 0.06,
            min_confidence: 0.5,
        }
    }
}

impl AnchorCalibration {
    /// The slimmer of the two shipped calibrations.
    pub fn slim() -> Self {
        Self {
            width_factor: 1.3,
            height_factor: 1.2,
            ..Self::default()
        }
    }
}

/// Mirror a normalized X coordinate into pixel space.
///
/// The displayed feed is flipped like a mirror, so all overlay geometry
/// mirrors with it: `pixel_x = (1 − x) · w`.
pub fn to_pixel_x(normalized_x: f32, frame_width: u32) -> f32 {
    (1.0 - normalized_x) * frame_width as f32
}

/// Scale a normalized Y coordinate into pixel space (no mirroring).
pub fn to_pixel_y(normalized_y: f32, frame_height: u32) -> f32 {
    normalized_y * frame_height as f32
}

/// Compute the garment anchor rect for one frame.
///
/// Returns `None` ("undetermined") when any of the four torso keypoints is
/// missing or below the confidence threshold, or when the detection is
/// degenerate (zero shoulder width, non-positive garment height). Callers
/// skip or freeze per their policy; this function never guesses.
pub fn compute_anchor(
    landmarks: &LandmarkSet,
    frame_width: u32,
    frame_height: u32,
    calibration: &AnchorCalibration,
) -> Option<AnchorRect> {
    let min = calibration.min_confidence;
    let left_shoulder = landmarks.usable(LandmarkIndex::LeftShoulder, min)?;
    let right_shoulder = landmarks.usable(LandmarkIndex::RightShoulder, min)?;
    let left_hip = landmarks.usable(LandmarkIndex::LeftHip, min)?;
    let right_hip = landmarks.usable(LandmarkIndex::RightHip, min)?;

    let left_x = to_pixel_x(left_shoulder.x, frame_width);
    let right_x = to_pixel_x(right_shoulder.x, frame_width);
    let left_y = to_pixel_y(left_shoulder.y, frame_height);
    let right_y = to_pixel_y(right_shoulder.y, frame_height);

    let shoulder_width = (left_x - right_x).abs();
    if shoulder_width <= 0.0 {
        return None;
    }

    let shoulder_center_x = (left_x + right_x) / 2.0;
    let shoulder_center_y = (left_y + right_y) / 2.0;
    let hip_y = to_pixel_y((left_hip.y + right_hip.y) / 2.0, frame_height);

    let garment_width = shoulder_width * calibration.width_factor;
    let torso_height = hip_y - shoulder_center_y;
    let garment_height =
        (torso_height * calibration.height_factor).max(garment_width * calibration.aspect_floor);
    if garment_height <= 0.0 {
        return None;
    }

    Some(AnchorRect::new(
        shoulder_center_x - garment_width / 2.0,
        shoulder_center_y - garment_height * calibration.vertical_bias,
        garment_width,
        garment_height,
    ))
}
