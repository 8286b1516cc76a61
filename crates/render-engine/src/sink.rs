//! Presentation boundary: where composited frames go.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use fitmirror_common::error::FitmirrorResult;
use fitmirror_overlay_model::Frame;

/// The rendering surface the session presents to.
///
/// Implementations receive fully-composited frames only. Returning an
/// error (e.g. the preview window was closed) ends the session loop.
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame) -> FitmirrorResult<()>;
}

/// Observable state of a [`BufferSink`].
#[derive(Debug, Default)]
pub struct SinkState {
    pub frames_presented: u64,
    pub last_frame: Option<Frame>,
}

/// Headless sink that keeps the most recent frame.
///
/// Used by tests and by `--headless` CLI runs; the shared state handle
/// stays valid after the sink itself moves into the session.
#[derive(Clone, Default)]
pub struct BufferSink {
    state: Arc<Mutex<SinkState>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for inspecting presented frames.
    pub fn state(&self) -> Arc<Mutex<SinkState>> {
        self.state.clone()
    }
}

impl FrameSink for BufferSink {
    fn present(&mut self, frame: &Frame) -> FitmirrorResult<()> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.frames_presented += 1;
        state.last_frame = Some(frame.clone());
        Ok(())
    }
}

/// PNG-encode a frame for the downstream try-on request.
pub fn encode_png(frame: &Frame) -> FitmirrorResult<Vec<u8>> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .context("Frame buffer does not match its dimensions")?;

    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("Failed to encode frame as PNG")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_keeps_latest_frame() {
        let mut sink = BufferSink::new();
        let state = sink.state();

        sink.present(&Frame::solid(2, 2, [1, 1, 1, 255], 0.0)).unwrap();
        sink.present(&Frame::solid(2, 2, [2, 2, 2, 255], 16.6)).unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.frames_presented, 2);
        let last = state.last_frame.as_ref().unwrap();
        assert_eq!(last.pixel(0, 0), [2, 2, 2, 255]);
    }

    #[test]
    fn test_encode_png_roundtrips() {
        let frame = Frame::solid(3, 2, [120, 40, 200, 255], 0.0);
        let bytes = encode_png(&frame).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [120, 40, 200, 255]);
    }
}
