//! Webcam capture via nokhwa.

use std::time::Instant;

use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_model::Frame;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera,
};

use crate::source::VideoSource;

/// Live webcam source.
///
/// Opens the device eagerly in `new` (camera permission failures surface at
/// session start, not mid-loop) and converts every captured frame to the
/// engine's RGBA layout. Timestamps are milliseconds since the stream was
/// opened.
pub struct CameraSource {
    camera: Camera,
    width: u32,
    height: u32,
    opened_at: Instant,
    delivered_first: bool,
}

impl CameraSource {
    /// Open camera `index`, requesting a resolution near `width`×`height`.
    ///
    /// The driver may pick a nearby mode; `dimensions` reports what it
    /// actually delivers.
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> FitmirrorResult<Self> {
        let requested_format = CameraFormat::new(
            Resolution::new(width, height),
            // Uncompressed and cheap to convert to RGB.
            FrameFormat::YUYV,
            fps,
        );
        let request =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(requested_format));

        let mut camera = Camera::new(CameraIndex::Index(index), request)
            .map_err(|e| FitmirrorError::capture(format!("Failed to open camera {index}: {e}")))?;
        camera
            .open_stream()
            .map_err(|e| FitmirrorError::capture(format!("Failed to start camera stream: {e}")))?;

        let actual = camera.resolution();
        tracing::info!(
            index,
            width = actual.width(),
            height = actual.height(),
            "Camera stream opened"
        );

        Ok(Self {
            camera,
            width: actual.width(),
            height: actual.height(),
            opened_at: Instant::now(),
            delivered_first: false,
        })
    }
}

impl VideoSource for CameraSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_ready(&self) -> bool {
        self.delivered_first
    }

    fn next_frame(&mut self) -> FitmirrorResult<Frame> {
        let raw = self
            .camera
            .frame()
            .map_err(|e| FitmirrorError::capture(format!("Failed to fetch camera frame: {e}")))?;
        let rgb = raw
            .decode_image::<RgbFormat>()
            .map_err(|e| FitmirrorError::capture(format!("Failed to decode camera frame: {e}")))?;

        let (w, h) = rgb.dimensions();
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for pixel in rgb.pixels() {
            pixels.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
        }

        self.width = w;
        self.height = h;
        self.delivered_first = true;

        let timestamp_ms = self.opened_at.elapsed().as_secs_f64() * 1_000.0;
        Frame::from_rgba(w, h, pixels, timestamp_ms)
            .ok_or_else(|| FitmirrorError::capture("Camera frame buffer size mismatch"))
    }

    fn name(&self) -> &str {
        "camera"
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::debug!(error = %e, "Camera stream stop failed on drop");
        }
    }
}
