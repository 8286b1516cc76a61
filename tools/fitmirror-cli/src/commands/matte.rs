//! Preprocess a garment image into an alpha-matted PNG.

use std::path::PathBuf;

use anyhow::Context;
use fitmirror_overlay_core::garment::decode_garment;
use fitmirror_overlay_core::matte::matte_sprite;
use image::RgbaImage;

pub fn run(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let bytes = std::fs::read(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let source = decode_garment(&bytes)?;
    let sprite = matte_sprite(&source, input.display().to_string());

    let output = output.unwrap_or_else(|| input.with_extension("matted.png"));
    let matted = RgbaImage::from_raw(sprite.width, sprite.height, sprite.pixels)
        .context("Matted sprite buffer size mismatch")?;
    matted
        .save_with_format(&output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Matted {}x{} garment -> {}",
        sprite.width,
        sprite.height,
        output.display()
    );
    Ok(())
}
