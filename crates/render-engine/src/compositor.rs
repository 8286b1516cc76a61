//! Frame compositor: draws the garment sprite into a video frame.

use fitmirror_overlay_model::{AnchorRect, Frame, GarmentSprite};

/// Composite `sprite` into `frame` at `anchor` with a global opacity.
///
/// The sprite is scaled to the anchor rect with nearest-neighbour sampling
/// and alpha-blended per pixel: effective alpha is the sprite pixel's matte
/// alpha times `opacity`. Parts of the anchor outside the frame are
/// clipped; frame pixels outside the anchor are untouched. The frame is
/// only ever written through fully-blended values, so a caller that hands
/// the result to a sink never shows a half-composited image.
pub fn composite_sprite(frame: &mut Frame, sprite: &GarmentSprite, anchor: &AnchorRect, opacity: f32) {
    if anchor.is_degenerate() || sprite.width == 0 || sprite.height == 0 {
        return;
    }
    let opacity = opacity.clamp(0.0, 1.0);

    let x_start = anchor.x.floor().max(0.0) as u32;
    let y_start = anchor.y.floor().max(0.0) as u32;
    let x_end = (anchor.right().ceil().min(frame.width as f32)).max(0.0) as u32;
    let y_end = (anchor.bottom().ceil().min(frame.height as f32)).max(0.0) as u32;

    for y in y_start..y_end {
        // Map the destination row back into sprite space.
        let v = (y as f32 - anchor.y) / anchor.height;
        if !(0.0..1.0).contains(&v) {
            continue;
        }
        let sy = ((v * sprite.height as f32) as u32).min(sprite.height - 1);

        for x in x_start..x_end {
            let u = (x as f32 - anchor.x) / anchor.width;
            if !(0.0..1.0).contains(&u) {
                continue;
            }
            let sx = ((u * sprite.width as f32) as u32).min(sprite.width - 1);

            let src = sprite.pixel(sx, sy);
            let alpha = (src[3] as f32 / 255.0) * opacity;
            if alpha <= 0.0 {
                continue;
            }

            let dst = frame.pixel(x, y);
            let blend = |s: u8, d: u8| -> u8 {
                (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8
            };
            frame.put_pixel(
                x,
                y,
                [
                    blend(src[0], dst[0]),
                    blend(src[1], dst[1]),
                    blend(src[2], dst[2]),
                    255,
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_sprite(rgba: [u8; 4], width: u32, height: u32) -> GarmentSprite {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        GarmentSprite::new("test", width, height, pixels)
    }

    #[test]
    fn test_opaque_sprite_at_full_opacity_replaces_pixels() {
        let mut frame = Frame::solid(10, 10, [0, 0, 0, 255], 0.0);
        let sprite = solid_sprite([200, 100, 50, 255], 2, 2);
        let anchor = AnchorRect::new(2.0, 2.0, 4.0, 4.0);

        composite_sprite(&mut frame, &sprite, &anchor, 1.0);
        assert_eq!(frame.pixel(3, 3), [200, 100, 50, 255]);
        // Outside the anchor: untouched.
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(frame.pixel(8, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn test_global_opacity_scales_blend() {
        let mut frame = Frame::solid(4, 4, [0, 0, 0, 255], 0.0);
        let sprite = solid_sprite([255, 255, 255, 255], 2, 2);
        let anchor = AnchorRect::new(0.0, 0.0, 4.0, 4.0);

        composite_sprite(&mut frame, &sprite, &anchor, 0.88);
        // 255 * 0.88 = 224.4 -> 224.
        assert_eq!(frame.pixel(1, 1), [224, 224, 224, 255]);
    }

    #[test]
    fn test_matted_alpha_compounds_with_opacity() {
        let mut frame = Frame::solid(4, 4, [0, 0, 0, 255], 0.0);
        // A mostly-matted backdrop pixel (alpha 51 = 20%).
        let sprite = solid_sprite([255, 255, 255, 51], 2, 2);
        let anchor = AnchorRect::new(0.0, 0.0, 4.0, 4.0);

        composite_sprite(&mut frame, &sprite, &anchor, 0.5);
        // 255 * 0.2 * 0.5 = 25.5 -> 26.
        assert_eq!(frame.pixel(0, 0), [26, 26, 26, 255]);
    }

    #[test]
    fn test_fully_transparent_sprite_is_a_noop() {
        let mut frame = Frame::solid(4, 4, [9, 9, 9, 255], 0.0);
        let before = frame.clone();
        let sprite = solid_sprite([255, 255, 255, 0], 2, 2);

        composite_sprite(&mut frame, &sprite, &AnchorRect::new(0.0, 0.0, 4.0, 4.0), 1.0);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_offscreen_anchor_clips_without_panicking() {
        let mut frame = Frame::solid(8, 8, [0, 0, 0, 255], 0.0);
        let sprite = solid_sprite([10, 20, 30, 255], 4, 4);

        // Half off the left edge and half off the bottom.
        let anchor = AnchorRect::new(-4.0, 4.0, 8.0, 8.0);
        composite_sprite(&mut frame, &sprite, &anchor, 1.0);

        assert_eq!(frame.pixel(0, 5), [10, 20, 30, 255]);
        assert_eq!(frame.pixel(5, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_degenerate_anchor_is_ignored() {
        let mut frame = Frame::solid(4, 4, [1, 2, 3, 255], 0.0);
        let before = frame.clone();
        let sprite = solid_sprite([255, 0, 0, 255], 2, 2);

        composite_sprite(&mut frame, &sprite, &AnchorRect::new(1.0, 1.0, 0.0, 2.0), 1.0);
        assert_eq!(frame, before);
    }
}
