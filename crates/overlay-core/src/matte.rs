//! Garment matting: near-white background removal.
//!
//! Product photos almost always sit on a white or near-white backdrop. A
//! hard color key would leave a visible fringe around light fabric, so the
//! matte is soft: the brighter a near-white pixel, the more transparent it
//! becomes, and everything else keeps its original alpha.

use fitmirror_overlay_model::GarmentSprite;
use image::RgbaImage;

/// Per-channel floor for a pixel to count as near-white.
pub const NEAR_WHITE_CHANNEL_MIN: u8 = 210;

/// Brightness above which a pixel is matted regardless of channel balance.
pub const BRIGHTNESS_CUTOFF: f32 = 230.0;

/// Compute the matte alpha for one pixel, or `None` to leave it opaque.
///
/// Brightness is the plain channel mean `(r + g + b) / 3`. A pixel is
/// matted when all three channels exceed [`NEAR_WHITE_CHANNEL_MIN`] or its
/// brightness exceeds [`BRIGHTNESS_CUTOFF`]; the matted alpha is
/// `max(0, 255 − brightness)`, so pure white vanishes and off-white fades.
pub fn matte_alpha(r: u8, g: u8, b: u8) -> Option<u8> {
    let brightness = (r as f32 + g as f32 + b as f32) / 3.0;
    let near_white =
        r > NEAR_WHITE_CHANNEL_MIN && g > NEAR_WHITE_CHANNEL_MIN && b > NEAR_WHITE_CHANNEL_MIN;
    if near_white || brightness > BRIGHTNESS_CUTOFF {
        Some((255.0 - brightness).max(0.0).round() as u8)
    } else {
        None
    }
}

/// Apply the matte to an image in place.
pub fn matte_image(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if let Some(alpha) = matte_alpha(r, g, b) {
            pixel.0[3] = alpha;
        }
    }
}

/// Matte a decoded garment image into a sprite.
///
/// Pure and deterministic: the same source image yields a bit-identical
/// sprite on every call.
pub fn matte_sprite(source: &RgbaImage, key: impl Into<String>) -> GarmentSprite {
    let mut matted = source.clone();
    matte_image(&mut matted);
    GarmentSprite::new(key, matted.width(), matted.height(), matted.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_off_white_fades() {
        // Brightness 240 -> alpha 255 - 240 = 15.
        assert_eq!(matte_alpha(240, 240, 240), Some(15));
    }

    #[test]
    fn test_dark_pixel_stays_opaque() {
        assert_eq!(matte_alpha(100, 100, 100), None);
    }

    #[test]
    fn test_pure_white_vanishes() {
        assert_eq!(matte_alpha(255, 255, 255), Some(0));
    }

    #[test]
    fn test_channel_floor_is_exclusive() {
        // All channels exactly at the floor: not near-white, and brightness
        // 210 is under the cutoff, so the pixel is untouched.
        assert_eq!(matte_alpha(210, 210, 210), None);
        // One step above the floor on every channel mattes.
        assert_eq!(matte_alpha(211, 211, 211), Some(44));
    }

    #[test]
    fn test_bright_but_unbalanced_pixel_mattes_via_cutoff() {
        // A washed-out highlight with one channel under the floor still
        // clears the brightness cutoff: (255 + 255 + 190) / 3 ≈ 233.3.
        assert_eq!(matte_alpha(255, 255, 190), Some(22));
    }

    #[test]
    fn test_saturated_color_never_mattes() {
        assert_eq!(matte_alpha(250, 30, 30), None);
    }

    #[test]
    fn test_matte_preserves_garment_pixels() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([40, 60, 120, 255]));
        img.put_pixel(1, 0, Rgba([245, 245, 245, 255]));

        matte_image(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [40, 60, 120, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [245, 245, 245, 10]);
    }

    #[test]
    fn test_matting_is_idempotent_on_output_colors() {
        // The matte only rewrites alpha, so running it twice cannot change
        // the result further.
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([240, 238, 242, 255]));
        matte_image(&mut img);
        let once = img.clone();
        matte_image(&mut img);
        assert_eq!(once, img);
    }

    #[test]
    fn test_reprocessing_yields_bit_identical_sprites() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([230, 230, 230, 255]));
        img.put_pixel(2, 2, Rgba([10, 20, 30, 255]));

        let first = matte_sprite(&img, "garment-1");
        let second = matte_sprite(&img, "garment-1");
        assert_eq!(first, second);
    }
}
