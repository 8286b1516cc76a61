//! FitMirror Capture Engine
//!
//! Video sources for the overlay session. The render loop only ever sees
//! the [`VideoSource`] trait: current dimensions, a readiness signal, and
//! `next_frame`. Implementations:
//!
//! - [`CameraSource`]: live webcam frames via nokhwa
//! - [`SyntheticSource`]: deterministic generated frames for tests and
//!   headless runs
//!
//! A source is acquired on session start and released on drop (the camera
//! stream is closed with it).

pub mod camera;
pub mod source;

pub use camera::CameraSource;
pub use source::{SyntheticSource, VideoSource};
