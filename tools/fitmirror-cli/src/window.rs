//! Preview window plumbing.
//!
//! The render loop lives on a blocking thread and must never block on the
//! window, so frames cross over a bounded channel: the sink drops frames
//! when the window falls behind, and the window thread always shows the
//! most recent frame it received.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail};
use fitmirror_common::error::FitmirrorResult;
use fitmirror_overlay_model::Frame;
use fitmirror_render_engine::FrameSink;
use minifb::{Key, Window, WindowOptions};

/// Sink half: hands composited frames to the preview window.
pub struct ChannelSink {
    tx: SyncSender<Frame>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<Frame>) {
        let (tx, rx) = sync_channel(2);
        (Self { tx }, rx)
    }
}

impl FrameSink for ChannelSink {
    fn present(&mut self, frame: &Frame) -> FitmirrorResult<()> {
        match self.tx.try_send(frame.clone()) {
            // A full channel means the window is behind; dropping the frame
            // keeps the render loop paced by the session, not the window.
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(
                fitmirror_common::error::FitmirrorError::render("Preview window closed"),
            ),
        }
    }
}

/// Drive the preview window until it is closed, ESC is pressed, or the
/// optional duration elapses. The receiver stays borrowed (not consumed)
/// so the caller can stop the session cleanly before dropping it.
pub fn run_preview(rx: &Receiver<Frame>, duration: Option<f64>) -> anyhow::Result<()> {
    let first = match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(frame) => frame,
        Err(_) => bail!("No frames arrived within 10 seconds"),
    };

    let mut window = Window::new(
        "FitMirror",
        first.width as usize,
        first.height as usize,
        WindowOptions::default(),
    )
    .map_err(|e| anyhow!("Failed to open preview window: {e}"))?;

    let started = Instant::now();
    let mut buffer = pack_0rgb(&first);
    let (mut buf_w, mut buf_h) = (first.width as usize, first.height as usize);
    window
        .update_with_buffer(&buffer, buf_w, buf_h)
        .map_err(|e| anyhow!("Preview window update failed: {e}"))?;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if let Some(secs) = duration {
            if started.elapsed().as_secs_f64() >= secs {
                break;
            }
        }

        match rx.recv_timeout(Duration::from_millis(16)) {
            Ok(frame) => {
                buffer = pack_0rgb(&frame);
                buf_w = frame.width as usize;
                buf_h = frame.height as usize;
                window
                    .update_with_buffer(&buffer, buf_w, buf_h)
                    .map_err(|e| anyhow!("Preview window update failed: {e}"))?;
            }
            Err(_) => {
                // No new frame; keep the window responsive.
                window
                    .update_with_buffer(&buffer, buf_w, buf_h)
                    .map_err(|e| anyhow!("Preview window update failed: {e}"))?;
            }
        }
    }

    Ok(())
}

/// Pack an RGBA frame into minifb's `0x00RRGGBB` layout.
fn pack_0rgb(frame: &Frame) -> Vec<u32> {
    frame
        .pixels
        .chunks_exact(4)
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}
