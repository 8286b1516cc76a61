//! FitMirror Common Utilities
//!
//! Shared infrastructure for all FitMirror crates:
//! - Error types and result aliases
//! - Clock and tick-pacing utilities for the render loop
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
