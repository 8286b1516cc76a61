//! Frame preprocessing for MoveNet.

use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_model::Frame;
use image::imageops::FilterType;
use image::RgbaImage;
use ndarray::Array4;

/// MoveNet input edge length.
pub const MOVENET_INPUT_SIZE: u32 = 192;

/// Convert a captured frame into the MoveNet input tensor.
///
/// The frame is resized to 192×192 (aspect is not preserved; MoveNet
/// returns coordinates normalized to the original frame axes) and laid
/// out as `[1, 192, 192, 3]` RGB f32 in the 0.0 to 255.0 range.
pub fn to_input_tensor(frame: &Frame) -> FitmirrorResult<Array4<f32>> {
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| FitmirrorError::pose("Frame buffer does not match its dimensions"))?;

    let resized = image::imageops::resize(
        &image,
        MOVENET_INPUT_SIZE,
        MOVENET_INPUT_SIZE,
        FilterType::Triangle,
    );

    let size = MOVENET_INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, y, x, 0]] = pixel.0[0] as f32;
        tensor[[0, y, x, 1]] = pixel.0[1] as f32;
        tensor[[0, y, x, 2]] = pixel.0[2] as f32;
    }

    Ok(tensor)
}
