//! Garment decoding and sprite caching.

use std::collections::HashMap;
use std::sync::Arc;

use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_model::GarmentSprite;
use image::RgbaImage;

use crate::matte::matte_sprite;

/// Decode raw garment image bytes into an RGBA buffer.
///
/// Any raster format the `image` crate understands is accepted. A decode
/// failure affects only that garment; callers keep the session running.
pub fn decode_garment(bytes: &[u8]) -> FitmirrorResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| FitmirrorError::garment(format!("Failed to decode garment image: {e}")))?;
    Ok(decoded.to_rgba8())
}

/// Cache of matted sprites, keyed by garment identity.
///
/// The matte runs once per distinct source image; switching back to a
/// previously seen garment reuses its sprite. Entries are shared as `Arc`s
/// so the render loop can hold one across frames while the cache moves on.
#[derive(Debug, Default)]
pub struct SpriteCache {
    sprites: HashMap<String, Arc<GarmentSprite>>,
}

impl SpriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached sprite without processing anything.
    pub fn get(&self, key: &str) -> Option<Arc<GarmentSprite>> {
        self.sprites.get(key).cloned()
    }

    /// Return the sprite for `key`, matting `source` only on a cache miss.
    pub fn get_or_process(&mut self, key: &str, source: &RgbaImage) -> Arc<GarmentSprite> {
        if let Some(sprite) = self.sprites.get(key) {
            return sprite.clone();
        }
        tracing::debug!(key, width = source.width(), height = source.height(), "Matting garment");
        let sprite = Arc::new(matte_sprite(source, key));
        self.sprites.insert(key.to_string(), sprite.clone());
        sprite
    }

    /// Drop one garment's cached sprite.
    pub fn invalidate(&mut self, key: &str) {
        self.sprites.remove(key);
    }

    /// Drop everything (session teardown).
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_cache_hit_returns_same_sprite() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([240, 240, 240, 255]));
        let mut cache = SpriteCache::new();

        let first = cache.get_or_process("shirt", &img);
        let second = cache.get_or_process("shirt", &img);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_get_distinct_sprites() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([20, 20, 20, 255]));
        let mut cache = SpriteCache::new();

        let shirt = cache.get_or_process("shirt", &img);
        let jacket = cache.get_or_process("jacket", &img);
        assert!(!Arc::ptr_eq(&shirt, &jacket));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_reprocess() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([240, 240, 240, 255]));
        let mut cache = SpriteCache::new();

        let first = cache.get_or_process("shirt", &img);
        cache.invalidate("shirt");
        let second = cache.get_or_process("shirt", &img);
        // New allocation, identical content.
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_garment(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn test_decode_roundtrips_png() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([10, 200, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let decoded = decode_garment(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (3, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 200, 30, 255]);
    }
}
