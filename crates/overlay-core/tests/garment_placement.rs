//! End-to-end placement checks: matte a garment, anchor it to a subject,
//! and verify the numbers a fitting-room session would actually see.

use fitmirror_overlay_core::anchor::{compute_anchor, AnchorCalibration};
use fitmirror_overlay_core::garment::SpriteCache;
use fitmirror_overlay_core::matte::matte_sprite;
use fitmirror_overlay_model::{Landmark, LandmarkIndex, LandmarkSet};
use image::{Rgba, RgbaImage};

fn subject_facing_camera() -> LandmarkSet {
    let mut keypoints = [Landmark::default(); LandmarkIndex::COUNT];
    keypoints[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.3, 0.4, 0.95);
    keypoints[LandmarkIndex::RightShoulder as usize] = Landmark::new(0.7, 0.4, 0.95);
    keypoints[LandmarkIndex::LeftHip as usize] = Landmark::new(0.35, 0.75, 0.9);
    keypoints[LandmarkIndex::RightHip as usize] = Landmark::new(0.65, 0.75, 0.9);
    LandmarkSet::new(keypoints)
}

/// A product photo: dark shirt centered on a near-white backdrop.
fn product_photo() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(40, 40, Rgba([244, 244, 244, 255]));
    for y in 8..32 {
        for x in 10..30 {
            img.put_pixel(x, y, Rgba([30, 40, 90, 255]));
        }
    }
    img
}

#[test]
fn matted_sprite_keeps_fabric_opaque_and_fades_backdrop() {
    let sprite = matte_sprite(&product_photo(), "navy-shirt");

    // Backdrop corner: brightness 244 -> alpha 11.
    assert_eq!(sprite.pixel(0, 0)[3], 11);
    // Fabric center untouched.
    assert_eq!(sprite.pixel(20, 20), [30, 40, 90, 255]);
}

#[test]
fn anchor_places_garment_over_torso_mirrored() {
    let calibration = AnchorCalibration {
        width_factor: 1.5,
        height_factor: 1.25,
        aspect_floor: 1.2,
        vertical_bias: 0.06,
        min_confidence: 0.5,
    };
    let anchor = compute_anchor(&subject_facing_camera(), 640, 480, &calibration).unwrap();

    assert!((anchor.x - 128.0).abs() < 1e-3);
    assert!((anchor.width - 384.0).abs() < 1e-3);
    assert!((anchor.height - 460.8).abs() < 1e-3);
    // Lifted slightly above the shoulder line at y = 192.
    assert!(anchor.y < 192.0);
    assert!((anchor.y - (192.0 - 460.8 * 0.06)).abs() < 1e-3);
}

#[test]
fn switching_garments_processes_each_source_once() {
    let mut cache = SpriteCache::new();
    let photo = product_photo();

    let navy_a = cache.get_or_process("navy-shirt", &photo);
    let denim = cache.get_or_process("denim-jacket", &photo);
    let navy_b = cache.get_or_process("navy-shirt", &photo);

    assert!(std::sync::Arc::ptr_eq(&navy_a, &navy_b));
    assert_eq!(navy_a.key, "navy-shirt");
    assert_eq!(denim.key, "denim-jacket");
    assert_eq!(cache.len(), 2);
}

#[test]
fn anchor_is_stable_across_identical_frames() {
    let set = subject_facing_camera();
    let calibration = AnchorCalibration::default();

    let anchors: Vec<_> = (0..5)
        .map(|_| compute_anchor(&set, 1920, 1080, &calibration).unwrap())
        .collect();
    assert!(anchors.windows(2).all(|pair| pair[0] == pair[1]));
}
