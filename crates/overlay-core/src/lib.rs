//! FitMirror Overlay Core
//!
//! The computational heart of the overlay engine:
//! - **Anchor calculation:** shoulders and hips in, garment rectangle out
//! - **Garment matting:** near-white background removal via a soft
//!   brightness matte
//! - **Sprite caching:** one matte pass per distinct garment image
//!
//! This crate is pure computation — no I/O, no camera, no inference.
//! All inputs are data; all outputs are data.

pub mod anchor;
pub mod garment;
pub mod matte;

pub use anchor::{compute_anchor, AnchorCalibration};
pub use garment::SpriteCache;
