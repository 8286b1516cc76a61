//! FitMirror Overlay Model
//!
//! Data types shared across the overlay engine:
//! - **Landmarks:** pose keypoints in normalized coordinates
//! - **Frames:** RGBA pixel snapshots of the video source
//! - **Sprites:** alpha-matted garment bitmaps
//! - **Anchors:** the pixel-space rectangle a sprite is drawn into
//! - **Overlay state:** per-session bookkeeping
//!
//! This crate is data only — no I/O, no platform dependencies.

pub mod anchor;
pub mod frame;
pub mod landmark;
pub mod sprite;
pub mod state;

pub use anchor::*;
pub use frame::*;
pub use landmark::*;
pub use sprite::*;
pub use state::*;
