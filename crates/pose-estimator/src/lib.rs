//! FitMirror Pose Estimator
//!
//! Wraps a MoveNet SinglePose ONNX model behind the `PoseEstimator` trait
//! and a process-scoped, memoized loader:
//!
//! - One model download and one session build per process, no matter how
//!   many overlay sessions start: concurrent initializations share a
//!   single in-flight future, and a terminal failure is remembered rather
//!   than retried.
//! - `detect` consumes whole frames and returns a [`LandmarkSet`] or
//!   `None`; it is synchronous and may take longer than a frame interval,
//!   so callers pace themselves and never overlap calls on one handle.
//!
//! The loader is an ordinary value injected into the render engine, not an
//! ambient global, so tests substitute fakes freely.

pub mod estimator;
pub mod fetch;
pub mod movenet;
pub mod preprocess;

pub use estimator::{PoseEstimator, PoseLoader, PoseLoaderConfig};
pub use movenet::MoveNetEstimator;
