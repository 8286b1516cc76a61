//! Pose landmark types.
//!
//! Landmarks follow the MoveNet 17-keypoint layout. Coordinates are
//! normalized to `[0.0, 1.0]` in the **unmirrored** source frame; the
//! mirroring convention for display is applied downstream by the anchor
//! calculator, never here.

use serde::{Deserialize, Serialize};

/// The 17 MoveNet keypoint indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl LandmarkIndex {
    pub const COUNT: usize = 17;

    /// The four keypoints the garment anchor is computed from.
    pub const TORSO: [LandmarkIndex; 4] = [
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::LeftHip,
        LandmarkIndex::RightHip,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::LeftEar),
            4 => Some(Self::RightEar),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::RightShoulder),
            7 => Some(Self::LeftElbow),
            8 => Some(Self::RightElbow),
            9 => Some(Self::LeftWrist),
            10 => Some(Self::RightWrist),
            11 => Some(Self::LeftHip),
            12 => Some(Self::RightHip),
            13 => Some(Self::LeftKnee),
            14 => Some(Self::RightKnee),
            15 => Some(Self::LeftAnkle),
            16 => Some(Self::RightAnkle),
            _ => None,
        }
    }
}

/// A single estimated body keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate (0.0 to 1.0).
    pub x: f32,
    /// Normalized Y coordinate (0.0 to 1.0).
    pub y: f32,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the confidence clears the usability threshold.
    pub fn is_usable(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// The full set of keypoints returned for one detected subject in one frame.
///
/// Immutable once produced; superseded every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub keypoints: [Landmark; LandmarkIndex::COUNT],
}

impl LandmarkSet {
    pub fn new(keypoints: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// Get the keypoint at an index.
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.keypoints[index as usize]
    }

    /// Get the keypoint at an index iff it clears the confidence threshold.
    pub fn usable(&self, index: LandmarkIndex, threshold: f32) -> Option<&Landmark> {
        let landmark = self.get(index);
        landmark.is_usable(threshold).then_some(landmark)
    }

    /// Whether all four torso keypoints clear the confidence threshold.
    pub fn has_torso(&self, threshold: f32) -> bool {
        LandmarkIndex::TORSO
            .iter()
            .all(|&i| self.get(i).is_usable(threshold))
    }

    /// Mean confidence across all keypoints.
    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / LandmarkIndex::COUNT as f32
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            keypoints: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 17);
    }

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(
            LandmarkIndex::from_index(16),
            Some(LandmarkIndex::RightAnkle)
        );
        assert_eq!(LandmarkIndex::from_index(17), None);
    }

    #[test]
    fn test_landmark_usability() {
        let lm = Landmark::new(0.5, 0.5, 0.7);
        assert!(lm.is_usable(0.5));
        assert!(!lm.is_usable(0.8));
    }

    #[test]
    fn test_set_usable_filters_low_confidence() {
        let mut keypoints = [Landmark::default(); LandmarkIndex::COUNT];
        keypoints[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.3, 0.4, 0.9);
        keypoints[LandmarkIndex::RightShoulder as usize] = Landmark::new(0.7, 0.4, 0.2);

        let set = LandmarkSet::new(keypoints);
        assert!(set.usable(LandmarkIndex::LeftShoulder, 0.5).is_some());
        assert!(set.usable(LandmarkIndex::RightShoulder, 0.5).is_none());
    }

    #[test]
    fn test_has_torso_requires_all_four() {
        let mut keypoints = [Landmark::new(0.5, 0.5, 0.9); LandmarkIndex::COUNT];
        let set = LandmarkSet::new(keypoints);
        assert!(set.has_torso(0.5));

        keypoints[LandmarkIndex::RightHip as usize].confidence = 0.1;
        let set = LandmarkSet::new(keypoints);
        assert!(!set.has_torso(0.5));
    }

    #[test]
    fn test_average_confidence() {
        let keypoints = [Landmark::new(0.0, 0.0, 0.5); LandmarkIndex::COUNT];
        let set = LandmarkSet::new(keypoints);
        assert!((set.average_confidence() - 0.5).abs() < 0.001);
    }
}
