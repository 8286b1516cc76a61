//! FitMirror Render Engine
//!
//! The real-time overlay session: every tick pulls a frame from the video
//! source, runs pose detection, computes the garment anchor, composites
//! the sprite, and presents the result.
//!
//! # Tick Pipeline
//!
//! ```text
//! VideoSource ──▶ Frame ──▶ mirror ─────────────────────┐
//!                   │                                    │
//!                   ▼                                    ▼
//!            PoseEstimator ──▶ LandmarkSet ──▶ AnchorRect
//!                                                        │
//! GarmentSprite (atomic swap) ───────────────────────────┤
//!                                                        ▼
//!                                            composite @ opacity
//!                                                        │
//!                                                        ▼
//!                                                   FrameSink
//! ```
//!
//! One tick at a time; the next is paced against the configured refresh
//! rate. Stopping the session cancels the pending tick before it touches
//! the source or the pose handle.

pub mod compositor;
pub mod session;
pub mod sink;

pub use compositor::composite_sprite;
pub use session::{MissingPosePolicy, OverlaySession, SessionConfig, SessionState, TickStats};
pub use sink::{BufferSink, FrameSink};
