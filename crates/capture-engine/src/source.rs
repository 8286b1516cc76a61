//! The video source boundary.

use fitmirror_common::error::FitmirrorResult;
use fitmirror_overlay_model::Frame;

/// A live video source the render loop pulls frames from.
///
/// The loop reads one frame per tick, strictly in capture order. `is_ready`
/// reports whether the stream has produced at least one decoded frame; the
/// loop skips ticks (drawing nothing) until it has.
pub trait VideoSource: Send {
    /// Current frame dimensions (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Whether at least one decoded frame is available.
    fn is_ready(&self) -> bool;

    /// Pull the next frame. Blocks until one is available.
    fn next_frame(&mut self) -> FitmirrorResult<Frame>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Deterministic generated video for tests and headless runs.
///
/// Produces a horizontal gradient with a vertical band that advances one
/// column per frame, so frame N is always the same pixels regardless of
/// wall-clock time. Timestamps advance by the nominal frame interval.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_index: u64,
    interval_ms: f64,
}

impl SyntheticSource {
    /// A source producing `width`×`height` frames at a nominal `fps`.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
            interval_ms: 1_000.0 / fps.max(1) as f64,
        }
    }

    /// Number of frames generated so far.
    pub fn frames_generated(&self) -> u64 {
        self.frame_index
    }
}

impl VideoSource for SyntheticSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn next_frame(&mut self) -> FitmirrorResult<Frame> {
        let band_x = (self.frame_index % self.width.max(1) as u64) as u32;
        let mut frame = Frame::solid(
            self.width,
            self.height,
            [0, 0, 0, 255],
            self.frame_index as f64 * self.interval_ms,
        );

        for y in 0..self.height {
            for x in 0..self.width {
                let shade = (x * 255 / self.width.max(1)) as u8;
                let rgba = if x == band_x {
                    [255, 255, 255, 255]
                } else {
                    [shade, shade / 2, 64, 255]
                };
                frame.put_pixel(x, y, rgba);
            }
        }

        self.frame_index += 1;
        Ok(frame)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frames_are_deterministic() {
        let mut a = SyntheticSource::new(32, 16, 60);
        let mut b = SyntheticSource::new(32, 16, 60);

        for _ in 0..5 {
            assert_eq!(a.next_frame().unwrap(), b.next_frame().unwrap());
        }
    }

    #[test]
    fn test_timestamps_advance_by_frame_interval() {
        let mut source = SyntheticSource::new(8, 8, 60);
        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();
        assert!((second.timestamp_ms - first.timestamp_ms - 1_000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_moves_between_frames() {
        let mut source = SyntheticSource::new(8, 4, 30);
        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();
        assert_ne!(first.pixels, second.pixels);
        assert_eq!(second.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_always_ready() {
        let source = SyntheticSource::new(8, 8, 30);
        assert!(source.is_ready());
        assert_eq!(source.dimensions(), (8, 8));
    }
}
